//! Awareness simulation: threat, targeting and engagement for monsters.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces AwarenessSnapshots for observers.

pub mod awareness;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod systems;
pub mod world_setup;

pub use aggro_core as core;
pub use engine::{SimConfig, SimulationEngine};
pub use error::SimError;
pub use oracle::{CombatOracle, DefaultOracle};

#[cfg(test)]
mod tests;
