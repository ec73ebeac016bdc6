//! Error types for the simulation core.

use thiserror::Error;

/// Errors returned by the simulation library
#[derive(Debug, Error)]
pub enum SimError {
    /// Malformed layer layout handed to a network constructor
    #[error("invalid network shape: {0}")]
    Shape(String),

    /// Sensory vector does not fit the brain's input layer
    #[error("input mismatch: network expects {expected} inputs, got {actual}")]
    InputMismatch { expected: usize, actual: usize },

    /// Configuration value out of range
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
