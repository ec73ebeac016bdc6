//! Agent structure and behavior.

use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::grid::{Terrain, TileGrid};
use crate::lineage::Family;
use crate::neural::Network;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique agent identifier
pub type AgentId = u64;

/// Length of the sensory vector
pub const SENSORY_INPUTS: usize = 8;

/// Length of the decision vector, one entry per activity
pub const DECISION_OUTPUTS: usize = 4;

/// Activity code fed back to the brain before the first decision
pub const NO_ACTIVITY: f32 = -1.0;

/// What an agent chose to do on its last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    MoveX,
    MoveY,
    Eat,
    Reproduce,
}

impl Activity {
    pub const ALL: [Activity; 4] = [
        Activity::MoveX,
        Activity::MoveY,
        Activity::Eat,
        Activity::Reproduce,
    ];

    /// Map a brain output index to an activity
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Output index of this activity
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Activity::MoveX => 0,
            Activity::MoveY => 1,
            Activity::Eat => 2,
            Activity::Reproduce => 3,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            Activity::MoveX | Activity::MoveY => "Moving",
            Activity::Eat => "Eating",
            Activity::Reproduce => "Attempting Reproduction",
        }
    }
}

/// An agent in the simulation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    // Identity
    pub id: AgentId,
    pub family: Family,
    pub day_born: u32,

    // Physical state
    pub x: f32,
    pub y: f32,
    pub energy: f32,
    pub diameter: f32,
    pub velocity: f32,

    // Brain
    pub brain: Network,

    // Behavior
    pub activity: Option<Activity>,
    /// Grows while the same activity is repeated. Tracked only.
    pub repetition: f32,
    pub last_decision: Option<Vec<f32>>,

    /// Terrain under the agent when it last sensed
    pub terrain: Terrain,

    alive: bool,
}

impl Agent {
    /// Create an agent around an existing brain
    pub fn new(
        id: AgentId,
        family: Family,
        brain: Network,
        x: f32,
        y: f32,
        day_born: u32,
        config: &Config,
    ) -> Self {
        Self {
            id,
            family,
            day_born,
            x,
            y,
            energy: config.energy.starting_energy,
            diameter: config.agents.base_diameter,
            velocity: 0.0,
            brain,
            activity: None,
            repetition: 0.0,
            last_decision: None,
            terrain: Terrain::Land,
            alive: true,
        }
    }

    /// Founder with a random brain layout, position and family
    pub fn founder<R: Rng + ?Sized>(
        id: AgentId,
        grid: &TileGrid,
        day: u32,
        config: &Config,
        rng: &mut R,
    ) -> Result<Self> {
        let shape = Network::random_shape(
            config.neural.n_inputs,
            config.neural.n_outputs,
            config.neural.max_layers,
            config.neural.max_width,
            rng,
        );
        let brain = Network::new(&shape, rng)?;
        let family = Family::random(config.agents.name_length, rng);

        let inset = config.agents.base_diameter;
        let x = rng.gen::<f32>() * (grid.pixel_width() - 2.0 * inset) + inset;
        let y = rng.gen::<f32>() * (grid.pixel_height() - 2.0 * inset) + inset;

        let mut agent = Self::new(id, family, brain, x, y, day, config);
        agent.terrain = grid.tile_at_pixel(x, y).terrain;
        Ok(agent)
    }

    /// Child at the parent's position, same family, mutated brain
    pub fn offspring<R: Rng + ?Sized>(
        id: AgentId,
        parent: &Agent,
        day: u32,
        config: &Config,
        rng: &mut R,
    ) -> Self {
        let brain = parent.brain.reproduce(config.evolution.mutation_rate, rng);
        let mut child = Self::new(
            id,
            parent.family.clone(),
            brain,
            parent.x,
            parent.y,
            day,
            config,
        );
        child.terrain = parent.terrain;
        child
    }

    /// Build the sensory vector and remember the terrain underfoot.
    ///
    /// Layout: energy surplus, velocity, terrain code, tile food, activity
    /// code, time of day, age in days, random jitter.
    pub fn sense<R: Rng + ?Sized>(
        &mut self,
        grid: &TileGrid,
        clock: &Clock,
        config: &Config,
        rng: &mut R,
    ) -> [f32; SENSORY_INPUTS] {
        let tile = grid.tile_at_pixel(self.x, self.y);
        self.terrain = tile.terrain;

        [
            self.energy - config.energy.starting_energy,
            self.velocity,
            tile.terrain.code(),
            tile.food,
            self.activity.map_or(NO_ACTIVITY, |a| a.index() as f32),
            clock.time_of_day(),
            self.age(clock) as f32,
            (rng.gen::<f32>() - 0.5) * config.neural.bias,
        ]
    }

    /// Pay the per-tick metabolic cost and resize
    pub fn update_energy(&mut self, clock: &Clock, config: &Config) {
        let e = &config.energy;
        let benefit = if self.activity == Some(Activity::Reproduce) {
            e.reproduction_benefit
        } else {
            0.0
        };

        self.energy -= e.energy_loss + self.age(clock) as f32 * e.age_penalty - benefit;
        self.diameter = config.agents.base_diameter + config.agents.size_scaling * self.energy;
    }

    /// Age in whole days
    #[inline]
    pub fn age(&self, clock: &Clock) -> u32 {
        clock.age_of(self.day_born)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }

    /// Does the agent's body square contain the point?
    pub fn covers(&self, px: f32, py: f32) -> bool {
        let r = self.diameter / 2.0;
        (px - self.x).abs() < r && (py - self.y).abs() < r
    }
}
