//! Statistics tracking for the simulation.

use crate::agent::Agent;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Ticks simulated so far
    pub tick: u64,
    /// Current day
    pub day: u32,
    /// Live agents
    pub population: usize,
    /// Highest population seen
    pub population_peak: usize,
    /// Births this tick
    pub births: usize,
    /// Deaths this tick
    pub deaths: usize,
    /// Births since the start
    pub total_births: u64,
    /// Deaths since the start
    pub total_deaths: u64,
    /// Mean energy across agents
    pub energy_mean: f32,
    /// Mean age in days across agents
    pub age_mean: f32,
    /// Mean hidden neurons per brain
    pub brain_mean: f32,
    /// Number of distinct surviving families
    pub family_count: usize,
    /// Total food in the world
    pub total_food: f32,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the outcome of one tick into the running totals
    pub fn record_tick(&mut self, births: usize, deaths: usize) {
        self.tick += 1;
        self.births = births;
        self.deaths = deaths;
        self.total_births += births as u64;
        self.total_deaths += deaths as u64;
    }

    /// Recompute population-wide figures from the live agents
    pub fn update(&mut self, agents: &[Agent], day: u32, total_food: f32) {
        self.day = day;
        self.total_food = total_food;

        let alive: Vec<&Agent> = agents.iter().filter(|a| a.is_alive()).collect();
        self.population = alive.len();
        self.population_peak = self.population_peak.max(self.population);

        if alive.is_empty() {
            self.energy_mean = 0.0;
            self.age_mean = 0.0;
            self.brain_mean = 0.0;
            self.family_count = 0;
            return;
        }

        let n = alive.len() as f32;
        self.energy_mean = alive.iter().map(|a| a.energy).sum::<f32>() / n;
        self.age_mean = alive
            .iter()
            .map(|a| day.saturating_sub(a.day_born) as f32)
            .sum::<f32>()
            / n;
        self.brain_mean = alive.iter().map(|a| a.brain.complexity() as f32).sum::<f32>() / n;

        let families: HashSet<&str> = alive.iter().map(|a| a.family.name.as_str()).collect();
        self.family_count = families.len();
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:7} | Day:{:4} | Pop:{:5} | Born:{:6} | Died:{:6} | Fam:{:3} | Energy:{:.0} | Food:{:.0}",
            self.tick,
            self.day,
            self.population,
            self.total_births,
            self.total_deaths,
            self.family_count,
            self.energy_mean,
            self.total_food
        )
    }
}

/// Historical statistics, one snapshot per simulated day
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    pub snapshots: Vec<Stats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Get population over time
    pub fn population_series(&self) -> Vec<(u32, usize)> {
        self.snapshots.iter().map(|s| (s.day, s.population)).collect()
    }

    /// Save history to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
