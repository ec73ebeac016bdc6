//! World simulation engine - main simulation loop.

use crate::agent::{Activity, Agent, AgentId};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::grid::{Terrain, TileGrid};
use crate::snapshot::{AgentView, TileView};
use crate::stats::{Stats, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// The simulation world
///
/// Agents are visited in population order and see each other's effects
/// immediately (food eaten earlier in the pass is gone for later agents).
/// Only the agents present when a tick starts act in it; children born
/// during the pass first act on the next tick. Dead agents are compacted
/// out once the pass is over.
pub struct World {
    // Population
    agents: Vec<Agent>,

    // Environment
    grid: TileGrid,
    clock: Clock,

    // Configuration
    pub config: Config,

    // Statistics
    stats: Stats,
    stats_history: StatsHistory,

    // ID generation
    next_agent_id: AgentId,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,

    births_this_tick: usize,
    deaths_this_tick: usize,
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = TileGrid::generate(&config.world, &mut rng);

        let agents = (0..config.agents.starting_population as AgentId)
            .map(|id| Agent::founder(id, &grid, 0, &config, &mut rng))
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "World created: {}x{} tiles, {} land, {} founders, seed {}",
            grid.width(),
            grid.height(),
            grid.land_count(),
            agents.len(),
            seed
        );

        Ok(Self::assemble(config, grid, agents, rng, seed))
    }

    /// Build a world around a prepared grid and population
    pub fn from_parts(config: Config, grid: TileGrid, agents: Vec<Agent>, seed: u64) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(seed);
        Self::assemble(config, grid, agents, rng, seed)
    }

    fn assemble(
        config: Config,
        grid: TileGrid,
        agents: Vec<Agent>,
        rng: ChaCha8Rng,
        seed: u64,
    ) -> Self {
        let clock = Clock::new(&config.world);
        let next_agent_id = agents.iter().map(|a| a.id + 1).max().unwrap_or(0);

        let mut stats = Stats::new();
        stats.update(&agents, clock.day(), grid.total_food());

        Self {
            agents,
            grid,
            clock,
            config,
            stats,
            stats_history: StatsHistory::new(),
            next_agent_id,
            rng,
            seed,
            births_this_tick: 0,
            deaths_this_tick: 0,
        }
    }

    /// Advance the simulation by one tick
    pub fn tick(&mut self) {
        self.births_this_tick = 0;
        self.deaths_this_tick = 0;

        // Children appended during the pass wait for the next tick
        let count = self.agents.len();
        for idx in 0..count {
            if self.agents[idx].is_alive() {
                self.step_agent(idx);
            }
        }

        self.remove_dead();

        let new_day = self.clock.advance();
        if new_day {
            self.grid.regrow(&self.config.world, &mut self.rng);
        }

        self.update_stats(new_day);
    }

    /// Run multiple ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Sense, think, act and pay for one agent
    fn step_agent(&mut self, idx: usize) {
        let decision = {
            let agent = &mut self.agents[idx];
            let inputs = agent.sense(&self.grid, &self.clock, &self.config, &mut self.rng);
            match agent.brain.predict(&inputs) {
                Ok(outputs) => {
                    agent.last_decision = Some(outputs.clone());
                    Some(outputs)
                }
                Err(e) => {
                    log::warn!("Agent {}: {}, reusing previous decision", agent.id, e);
                    agent.last_decision.clone()
                }
            }
        };

        if let Some(decision) = decision {
            if let Some(action) = choose_action(&decision) {
                let agent = &mut self.agents[idx];
                if agent.activity == Some(action) {
                    agent.repetition += self.config.evolution.repetition_cost;
                } else {
                    agent.repetition = 0.0;
                }
                agent.activity = Some(action);

                self.apply_decision(idx, &decision, action);
            }
        }

        let agent = &mut self.agents[idx];
        agent.update_energy(&self.clock, &self.config);
        if agent.terrain == Terrain::Water {
            agent.energy -= self.config.energy.swimming_cost;
        }

        if agent.energy < self.config.energy.min_energy {
            log::debug!(
                "Agent {} ({}) died at energy {:.2}, age {}",
                agent.id,
                agent.family.name,
                agent.energy,
                agent.age(&self.clock)
            );
            agent.kill();
            self.deaths_this_tick += 1;
        }
    }

    /// Carry out the chosen action
    fn apply_decision(&mut self, idx: usize, decision: &[f32], action: Activity) {
        let magnitude = decision.get(action.index()).copied().unwrap_or(0.0);
        let margin = self.config.agents.move_margin;

        match action {
            Activity::MoveX => {
                let extent = self.grid.pixel_width();
                let agent = &mut self.agents[idx];
                agent.x = step_axis(agent.x, magnitude, agent.diameter, extent, margin);
                agent.velocity += 1.0;
                agent.energy -= self.config.energy.moving_cost;
            }
            Activity::MoveY => {
                let extent = self.grid.pixel_height();
                let agent = &mut self.agents[idx];
                agent.y = step_axis(agent.y, magnitude, agent.diameter, extent, margin);
                agent.velocity += 1.0;
                agent.energy -= self.config.energy.moving_cost;
            }
            Activity::Eat => self.eat(idx),
            Activity::Reproduce => self.try_reproduce(idx),
        }
    }

    /// Eat from the tile underfoot, with diminishing returns
    fn eat(&mut self, idx: usize) {
        let agent = &mut self.agents[idx];
        let (cx, cy) = self.grid.cell_of(agent.x, agent.y);
        if self.grid.tile(cx, cy).food <= 0.0 {
            return;
        }

        agent.velocity = 0.0;
        let e = &self.config.energy;
        let gain = e.base_food_energy_gain / (e.diminishing_returns_factor * agent.energy);
        agent.energy += self.grid.consume(cx, cy, gain);
    }

    /// Spawn a child if the agent can afford it
    fn try_reproduce(&mut self, idx: usize) {
        self.agents[idx].velocity = 0.0;
        if self.agents[idx].energy < self.config.energy.reproduction_threshold {
            return;
        }

        let id = self.next_agent_id;
        self.next_agent_id += 1;

        let parent = &self.agents[idx];
        let child = Agent::offspring(id, parent, self.clock.day(), &self.config, &mut self.rng);
        log::debug!(
            "Agent {} ({}) gave birth to {} on day {}",
            parent.id,
            parent.family.name,
            id,
            self.clock.day()
        );

        self.agents[idx].energy -= self.config.energy.starting_energy;
        self.agents.push(child);
        self.births_this_tick += 1;
    }

    /// Drop dead agents, keeping the order of the living
    fn remove_dead(&mut self) {
        self.agents.retain(|a| a.is_alive());
    }

    fn update_stats(&mut self, new_day: bool) {
        self.stats
            .record_tick(self.births_this_tick, self.deaths_this_tick);
        self.stats
            .update(&self.agents, self.clock.day(), self.grid.total_food());

        if new_day {
            self.stats_history.record(self.stats.clone());
            log::info!("{}", self.stats.summary());
            if self.agents.is_empty() {
                log::info!("Population extinct on day {}", self.clock.day());
            }
        }
    }

    /// Read-only views of all live agents, in population order
    pub fn population(&self) -> Vec<AgentView> {
        self.agents
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| AgentView::new(a, &self.clock))
            .collect()
    }

    /// Copy of the tile at a grid cell
    pub fn tile_at(&self, x: usize, y: usize) -> Option<TileView> {
        self.grid.get(x, y).map(TileView::from)
    }

    /// Live agent whose body covers the point, closest first
    pub fn select_nearest(&self, px: f32, py: f32) -> Option<&Agent> {
        let dist2 = |a: &Agent| (a.x - px).powi(2) + (a.y - py).powi(2);
        self.agents
            .iter()
            .filter(|a| a.is_alive() && a.covers(px, py))
            .min_by(|a, b| dist2(*a).total_cmp(&dist2(*b)))
    }

    /// Find an agent by id
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[inline]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    #[inline]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[inline]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    #[inline]
    pub fn stats_history(&self) -> &StatsHistory {
        &self.stats_history
    }

    /// Get current population count
    #[inline]
    pub fn population_count(&self) -> usize {
        self.agents.len()
    }

    /// Check if population is extinct
    #[inline]
    pub fn is_extinct(&self) -> bool {
        self.agents.is_empty()
    }

    /// Seed the world was created with
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Index of the largest |output|; the first one wins ties
pub fn choose_action(outputs: &[f32]) -> Option<Activity> {
    if outputs.is_empty() {
        return None;
    }
    let mut best = 0;
    for (i, v) in outputs.iter().enumerate().skip(1) {
        if v.abs() > outputs[best].abs() {
            best = i;
        }
    }
    Activity::from_index(best)
}

/// Move along one axis, keeping the body inside `[0, extent]`.
///
/// A step that would leave the world parks the agent against the wall on
/// the side it is currently on.
fn step_axis(pos: f32, delta: f32, diameter: f32, extent: f32, margin: f32) -> f32 {
    let low = diameter / 2.0 + margin;
    let high = extent - diameter / 2.0 - margin;
    let proposed = pos + delta;

    if proposed >= low && proposed <= high {
        proposed
    } else if pos <= extent / 2.0 {
        low
    } else {
        high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use crate::lineage::Family;
    use crate::neural::{Layer, Network, Neuron};

    /// 8 -> 4 brain with a single non-zero weight
    fn wired_brain(input: usize, output: usize) -> Network {
        let mut input_layer: Vec<Neuron> =
            (0..8).map(|_| Neuron::with_weights(vec![0.0; 4])).collect();
        input_layer[input].weights[output] = 1.0;
        let output_layer = (0..4).map(|_| Neuron::with_weights(vec![])).collect();
        Network::from_layers(vec![Layer::new(input_layer), Layer::new(output_layer)]).unwrap()
    }

    fn agent_at(id: AgentId, x: f32, y: f32, energy: f32, brain: Network, config: &Config) -> Agent {
        let family = Family {
            color: [10, 20, 30],
            name: "bafoke".to_string(),
        };
        let mut agent = Agent::new(id, family, brain, x, y, 0, config);
        agent.energy = energy;
        agent
    }

    #[test]
    fn test_choose_action() {
        assert_eq!(choose_action(&[0.1, -0.9, 0.5, 0.2]), Some(Activity::MoveY));
        assert_eq!(choose_action(&[0.5, -0.5, 0.5, 0.1]), Some(Activity::MoveX));
        assert_eq!(choose_action(&[0.0, 0.0, 0.0, 0.0]), Some(Activity::MoveX));
        assert_eq!(choose_action(&[0.0, 0.2, 0.2, -0.7]), Some(Activity::Reproduce));
        assert_eq!(choose_action(&[]), None);
    }

    #[test]
    fn test_step_axis() {
        // Inside the band
        assert_eq!(step_axis(100.0, 0.5, 20.0, 200.0, 5.0), 100.5);
        // Left wall
        assert_eq!(step_axis(0.0, -5.0, 20.0, 200.0, 5.0), 15.0);
        // Right wall
        assert_eq!(step_axis(190.0, 1.0, 20.0, 200.0, 5.0), 185.0);
    }

    #[test]
    fn test_step_axis_overshoot_stays_on_current_side() {
        // Proposed position is past the far wall; the agent parks on its own side
        assert_eq!(step_axis(190.0, -200.0, 20.0, 200.0, 5.0), 185.0);
        assert_eq!(step_axis(10.0, 300.0, 20.0, 200.0, 5.0), 15.0);
        assert_eq!(step_axis(100.0, 150.0, 20.0, 200.0, 5.0), 15.0);
        assert_eq!(step_axis(101.0, -150.0, 20.0, 200.0, 5.0), 185.0);
    }

    #[test]
    fn test_move_y_overshoot_keeps_side() {
        let config = Config::default();
        let grid = TileGrid::filled(10, 10, 20.0, Tile::land(0.0));
        let agent = agent_at(0, 100.0, 170.0, 180.0, wired_brain(0, 1), &config);
        let diameter = agent.diameter;
        let mut world = World::from_parts(config, grid, vec![agent], 9);

        world.apply_decision(0, &[0.0, -400.0, 0.0, 0.0], Activity::MoveY);
        assert_eq!(world.agents()[0].y, 200.0 - diameter / 2.0 - 5.0);
        assert_eq!(world.agents()[0].x, 100.0);
    }

    #[test]
    fn test_move_x_clamps_at_origin() {
        let config = Config::default();
        let grid = TileGrid::filled(10, 10, 20.0, Tile::land(50.0));
        let agent = agent_at(0, 0.0, 100.0, 180.0, wired_brain(0, 0), &config);
        let diameter = agent.diameter;
        let mut world = World::from_parts(config, grid, vec![agent], 1);

        world.apply_decision(0, &[-5.0, 0.0, 0.0, 0.0], Activity::MoveX);

        let agent = &world.agents()[0];
        assert_eq!(agent.x, diameter / 2.0 + 5.0);
        assert_eq!(agent.velocity, 1.0);
        assert!((agent.energy - (180.0 - 0.02)).abs() < 1e-4);
    }

    #[test]
    fn test_move_y_within_bounds() {
        let config = Config::default();
        let grid = TileGrid::filled(10, 10, 20.0, Tile::land(50.0));
        let agent = agent_at(0, 100.0, 100.0, 180.0, wired_brain(0, 1), &config);
        let mut world = World::from_parts(config, grid, vec![agent], 2);

        world.apply_decision(0, &[0.0, -0.75, 0.0, 0.0], Activity::MoveY);
        assert_eq!(world.agents()[0].y, 99.25);
        assert_eq!(world.agents()[0].x, 100.0);
    }

    #[test]
    fn test_eat_on_empty_tile_is_noop() {
        let config = Config::default();
        let grid = TileGrid::filled(10, 10, 20.0, Tile::land(0.0));
        let mut agent = agent_at(0, 100.0, 100.0, 180.0, wired_brain(3, 2), &config);
        agent.velocity = 4.0;
        let mut world = World::from_parts(config, grid, vec![agent], 3);

        world.apply_decision(0, &[0.0, 0.0, 1.0, 0.0], Activity::Eat);
        assert_eq!(world.agents()[0].energy, 180.0);
        assert_eq!(world.agents()[0].velocity, 4.0);
        assert_eq!(world.grid().tile(5, 5).food, 0.0);
    }

    #[test]
    fn test_eat_never_overdraws_tile() {
        let config = Config::default();
        let grid = TileGrid::filled(10, 10, 20.0, Tile::land(0.1));
        let agent = agent_at(0, 100.0, 100.0, 180.0, wired_brain(3, 2), &config);
        let mut world = World::from_parts(config, grid, vec![agent], 4);

        world.apply_decision(0, &[0.0, 0.0, 1.0, 0.0], Activity::Eat);
        assert_eq!(world.grid().tile(5, 5).food, 0.0);
        assert!((world.agents()[0].energy - 180.1).abs() < 1e-4);
    }

    #[test]
    fn test_failed_reproduction() {
        let config = Config::default();
        let grid = TileGrid::filled(10, 10, 20.0, Tile::land(0.0));
        let mut agent = agent_at(0, 100.0, 100.0, 249.0, wired_brain(0, 3), &config);
        agent.velocity = 2.0;
        let mut world = World::from_parts(config, grid, vec![agent], 5);

        world.apply_decision(0, &[0.0, 0.0, 0.0, 1.0], Activity::Reproduce);
        assert_eq!(world.agents().len(), 1);
        assert_eq!(world.agents()[0].energy, 249.0);
        assert_eq!(world.agents()[0].velocity, 0.0);
    }

    #[test]
    fn test_input_mismatch_reuses_previous_decision() {
        let config = Config::default();
        let grid = TileGrid::filled(10, 10, 20.0, Tile::land(50.0));

        // Five-input brain cannot take the eight-value sensory vector
        let input_layer = (0..5).map(|_| Neuron::with_weights(vec![0.0; 4])).collect();
        let output_layer = (0..4).map(|_| Neuron::with_weights(vec![])).collect();
        let brain =
            Network::from_layers(vec![Layer::new(input_layer), Layer::new(output_layer)]).unwrap();

        let mut fresh = agent_at(0, 100.0, 100.0, 180.0, brain.clone(), &config);
        fresh.last_decision = None;
        let mut seasoned = agent_at(1, 60.0, 60.0, 180.0, brain, &config);
        seasoned.last_decision = Some(vec![0.0, 0.0, 0.9, 0.0]);

        let mut world = World::from_parts(config, grid, vec![fresh, seasoned], 6);
        world.tick();

        let fresh = world.agent(0).unwrap();
        assert_eq!(fresh.activity, None);
        assert!((fresh.energy - (180.0 - 0.02)).abs() < 1e-4);

        let seasoned = world.agent(1).unwrap();
        assert_eq!(seasoned.activity, Some(Activity::Eat));
        assert!(seasoned.energy > 180.0);
        assert!(world.grid().tile(3, 3).food < 50.0);
    }

    #[test]
    fn test_repetition_counter() {
        let config = Config::default();
        let grid = TileGrid::filled(10, 10, 20.0, Tile::land(50.0));
        let agent = agent_at(0, 100.0, 100.0, 180.0, wired_brain(3, 2), &config);
        let mut world = World::from_parts(config, grid, vec![agent], 7);

        world.tick();
        assert_eq!(world.agents()[0].repetition, 0.0);
        world.tick();
        world.tick();
        assert!((world.agents()[0].repetition - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_select_nearest() {
        let config = Config::default();
        let grid = TileGrid::filled(10, 10, 20.0, Tile::land(0.0));
        let a = agent_at(0, 50.0, 50.0, 180.0, wired_brain(0, 0), &config);
        let b = agent_at(1, 60.0, 50.0, 180.0, wired_brain(0, 0), &config);
        let world = World::from_parts(config, grid, vec![a, b], 8);

        assert_eq!(world.select_nearest(57.0, 50.0).map(|a| a.id), Some(1));
        assert_eq!(world.select_nearest(52.0, 51.0).map(|a| a.id), Some(0));
        assert!(world.select_nearest(150.0, 150.0).is_none());
    }
}
