//! Configuration system for the simulation.
//!
//! Supports YAML configuration files. Every default matches the tuned
//! constants the simulation was balanced against.

use crate::agent::{DECISION_OUTPUTS, SENSORY_INPUTS};
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub agents: AgentConfig,
    #[serde(default)]
    pub energy: EnergyConfig,
    #[serde(default)]
    pub neural: NeuralConfig,
    #[serde(default)]
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// World/environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Grid width in tiles
    pub width: usize,
    /// Grid height in tiles
    pub height: usize,
    /// Edge length of one tile in pixels
    pub tile_size: f32,
    /// Probability that a land tile is seeded (and later regrown) with food
    pub food_abundance: f32,
    /// Food placed on a seeded land tile
    pub tile_base_food: f32,
    /// Terrain noise above this value becomes water
    pub water_threshold: f32,
    /// Spatial frequency of the terrain pattern along x
    pub terrain_freq_x: f32,
    /// Spatial frequency of the terrain pattern along y
    pub terrain_freq_y: f32,
    /// Length of one simulated day in time-of-day units
    pub day_length: f32,
    /// Time-of-day advance per tick
    pub tick_increment: f32,
}

/// Agent body configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Number of founders at start
    pub starting_population: usize,
    /// Diameter of an agent with zero energy
    pub base_diameter: f32,
    /// Diameter gained per unit of energy
    pub size_scaling: f32,
    /// Length of generated family names
    pub name_length: usize,
    /// Clearance kept between an agent's body and the world edge
    pub move_margin: f32,
}

/// Energy economy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Energy of a newborn; also what a parent pays to reproduce
    pub starting_energy: f32,
    /// Agents below this energy die
    pub min_energy: f32,
    /// Energy required to reproduce
    pub reproduction_threshold: f32,
    /// Flat metabolic cost per tick
    pub energy_loss: f32,
    /// Additional cost per tick per day of age
    pub age_penalty: f32,
    /// Metabolic discount while reproducing
    pub reproduction_benefit: f32,
    /// Cost of one movement step
    pub moving_cost: f32,
    /// Extra cost per tick spent on water
    pub swimming_cost: f32,
    /// Numerator of the eating gain
    pub base_food_energy_gain: f32,
    /// Scales the current energy in the eating gain denominator
    pub diminishing_returns_factor: f32,
}

/// Brain layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralConfig {
    /// Number of input neurons
    pub n_inputs: usize,
    /// Number of output neurons
    pub n_outputs: usize,
    /// Maximum number of layers, input and output included
    pub max_layers: usize,
    /// Maximum width of a hidden layer
    pub max_width: usize,
    /// Amplitude of the random jitter input
    pub bias: f32,
}

/// Evolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Width of the uniform perturbation applied to inherited weights
    pub mutation_rate: f32,
    /// Repetition counter increment for repeating the same action
    pub repetition_cost: f32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Ticks between progress lines in the CLI
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 30,
            tile_size: 20.0,
            food_abundance: 0.5,
            tile_base_food: 50.0,
            water_threshold: 0.65,
            terrain_freq_x: 0.15,
            terrain_freq_y: 0.2,
            day_length: 24.0,
            tick_increment: 0.02,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            starting_population: 50,
            base_diameter: 20.0,
            size_scaling: 0.05,
            name_length: 6,
            move_margin: 5.0,
        }
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        let starting_energy = 180.0;
        let min_energy = 30.0;
        Self {
            starting_energy,
            min_energy,
            reproduction_threshold: starting_energy + min_energy + 40.0,
            energy_loss: 0.02,
            age_penalty: 0.002,
            reproduction_benefit: 0.018,
            moving_cost: 0.02,
            swimming_cost: 0.15,
            base_food_energy_gain: 80.0,
            diminishing_returns_factor: 2.3,
        }
    }
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            n_inputs: SENSORY_INPUTS,
            n_outputs: DECISION_OUTPUTS,
            max_layers: 4,
            max_width: 8,
            bias: 52.8,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.15,
            repetition_cost: 0.01,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 1200,
            log_level: "info".to_string(),
        }
    }
}

impl WorldConfig {
    /// Whole ticks in one day
    pub fn ticks_per_day(&self) -> u64 {
        (self.day_length / self.tick_increment).round().max(1.0) as u64
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(SimError::Config(msg.to_string()));

        if self.world.width == 0 || self.world.height == 0 {
            return invalid("grid width and height must be > 0");
        }
        if self.world.tile_size <= 0.0 {
            return invalid("tile_size must be > 0");
        }
        if !(0.0..=1.0).contains(&self.world.food_abundance) {
            return invalid("food_abundance must be between 0 and 1");
        }
        if self.world.day_length <= 0.0 || self.world.tick_increment <= 0.0 {
            return invalid("day_length and tick_increment must be > 0");
        }
        if self.agents.starting_population == 0 {
            return invalid("starting_population must be > 0");
        }
        if self.energy.min_energy <= 0.0 {
            return invalid("min_energy must be > 0");
        }
        if self.energy.reproduction_threshold < self.energy.min_energy {
            return invalid("reproduction_threshold cannot be below min_energy");
        }
        if self.energy.energy_loss <= self.energy.reproduction_benefit {
            return invalid("energy_loss must exceed reproduction_benefit");
        }
        if self.energy.diminishing_returns_factor <= 0.0 {
            return invalid("diminishing_returns_factor must be > 0");
        }
        if self.neural.n_inputs != SENSORY_INPUTS {
            return Err(SimError::Config(format!(
                "n_inputs must be {}",
                SENSORY_INPUTS
            )));
        }
        if self.neural.n_outputs != DECISION_OUTPUTS {
            return Err(SimError::Config(format!(
                "n_outputs must be {}",
                DECISION_OUTPUTS
            )));
        }
        if self.neural.max_layers < 2 || self.neural.max_width == 0 {
            return invalid("max_layers must be >= 2 and max_width > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.energy.reproduction_threshold, 250.0);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.world.width, loaded.world.width);
        assert_eq!(config.energy.starting_energy, loaded.energy.starting_energy);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "evolution:\n  mutation_rate: 0.3\n  repetition_cost: 0.05\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.evolution.mutation_rate, 0.3);
        assert_eq!(config.world.width, WorldConfig::default().width);
        assert_eq!(config.energy.starting_energy, 180.0);
        assert_eq!(config.neural.n_inputs, SENSORY_INPUTS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ticks_per_day() {
        let world = WorldConfig::default();
        assert_eq!(world.ticks_per_day(), 1200);
    }

    #[test]
    fn test_rejects_free_reproduction() {
        let mut config = Config::default();
        config.energy.reproduction_benefit = config.energy.energy_loss;
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn test_rejects_wrong_input_width() {
        let mut config = Config::default();
        config.neural.n_inputs = 5;
        assert!(config.validate().is_err());
    }
}
