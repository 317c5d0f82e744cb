//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are plain functions over the world plus a [`SystemCtx`] carrying
//! the per-tick shared state. Most take `&World` and borrow single components
//! mutably through `World::get`, so a system may call into another mid-loop
//! as long as it holds no component borrow across the call.

pub mod alert;
pub mod cleanup;
pub mod engagement;
pub mod movement;
pub mod snapshot;
pub mod spatial;
pub mod targeting;
pub mod threat_decay;

use rand_chacha::ChaCha8Rng;

use aggro_core::config::AwarenessConfig;
use aggro_core::events::AwarenessEvent;

use crate::oracle::CombatOracle;

/// Shared state handed to every system for one tick.
pub struct SystemCtx<'a> {
    pub config: &'a AwarenessConfig,
    pub rng: &'a mut ChaCha8Rng,
    pub oracle: &'a dyn CombatOracle,
    pub events: &'a mut Vec<AwarenessEvent>,
    /// Current simulation time (secs).
    pub now: f64,
}
