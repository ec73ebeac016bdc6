//! Read-only views of simulation state.
//!
//! These are plain copies handed to whatever draws the world; nothing in
//! here can reach back into the engine.

use crate::agent::{Activity, Agent, AgentId};
use crate::clock::Clock;
use crate::grid::{Terrain, Tile};
use serde::{Deserialize, Serialize};

/// Lightweight view of an agent for rendering
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub x: f32,
    pub y: f32,
    pub energy: f32,
    pub diameter: f32,
    pub family_color: [u8; 3],
    pub family_name: String,
    pub activity: Option<Activity>,
    pub age: u32,
    pub terrain: Terrain,
}

impl AgentView {
    pub fn new(agent: &Agent, clock: &Clock) -> Self {
        Self {
            id: agent.id,
            x: agent.x,
            y: agent.y,
            energy: agent.energy,
            diameter: agent.diameter,
            family_color: agent.family.color,
            family_name: agent.family.name.clone(),
            activity: agent.activity,
            age: agent.age(clock),
            terrain: agent.terrain,
        }
    }

    /// Label for the selected-agent panel
    pub fn activity_name(&self) -> &'static str {
        self.activity.map_or("Idle", |a| a.name())
    }
}

/// Copy of one tile
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileView {
    pub terrain: Terrain,
    pub food: f32,
}

impl From<&Tile> for TileView {
    fn from(tile: &Tile) -> Self {
        Self {
            terrain: tile.terrain,
            food: tile.food,
        }
    }
}
