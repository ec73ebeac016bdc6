//! # evsim
//!
//! Evolutionary agent simulator. Every agent carries its own small
//! feedforward brain with a randomly chosen hidden layout, lives on a grid
//! of land and water tiles, and eats, wanders and reproduces until it runs
//! out of energy. Children inherit their parent's brain layout with
//! slightly mutated weights.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use evsim::{Config, World};
//!
//! let mut world = World::new(Config::default()).unwrap();
//! world.run(1200);
//!
//! println!("Population: {}", world.population_count());
//! println!("Day: {}", world.clock().day());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use evsim::Config;
//!
//! let mut config = Config::default();
//! config.agents.starting_population = 100;
//! config.evolution.mutation_rate = 0.1;
//! assert!(config.validate().is_ok());
//! ```

pub mod agent;
pub mod clock;
pub mod config;
pub mod error;
pub mod grid;
pub mod lineage;
pub mod neural;
pub mod snapshot;
pub mod stats;
pub mod world;

// Re-export main types
pub use agent::{Activity, Agent};
pub use config::Config;
pub use error::SimError;
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(ticks: u64, population: usize) -> error::Result<BenchmarkResult> {
    use std::time::Instant;

    let mut config = Config::default();
    config.agents.starting_population = population;

    let mut world = World::new(config)?;

    let start = Instant::now();
    world.run(ticks);
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        ticks,
        initial_population: population,
        final_population: world.population_count(),
        total_births: world.stats().total_births,
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub initial_population: usize,
    pub final_population: usize,
    pub total_births: u64,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Population: {} -> {}", self.initial_population, self.final_population)?;
        writeln!(f, "Births: {}", self.total_births)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        Ok(())
    }
}
