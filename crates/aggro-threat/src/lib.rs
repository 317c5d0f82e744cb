//! Threat and targeting algorithms for the aggro subsystem.
//!
//! Threat ledger bookkeeping, weighted target rolls, legacy tactics and the
//! deception contest. Pure functions and plain data, no ECS dependency:
//! attackers are identified by any ordered key the caller chooses.

pub mod deception;
pub mod ledger;
pub mod selection;
pub mod tactics;

pub use aggro_core as core;
pub use ledger::ThreatLedger;
