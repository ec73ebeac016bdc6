//! Neural network module for agent brains.
//!
//! Implements small feedforward networks with:
//! - Explicit per-neuron weight vectors
//! - Per-agent hidden layouts
//! - Mutation-only reproduction

mod mutations;
mod network;

pub use network::{Layer, Network, Neuron};
