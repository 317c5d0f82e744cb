//! Simulation constants and tuning parameters.
//!
//! Values that operators may want to adjust live in
//! [`AwarenessConfig`](crate::config::AwarenessConfig); the ones here are fixed
//! by the rules of the subsystem.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 10;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Threat ledger ---

/// Lowest value a tracked attacker's threat can hold.
pub const THREAT_BASELINE: u32 = 100;

/// Smallest increment a single threat contribution applies.
pub const MIN_THREAT_INCREMENT: u32 = 2;

/// Power metric at or above which a provoke stance doubles threat.
pub const PROVOKE_POWER_THRESHOLD: f64 = 0.5;

/// Fraction of the excess above baseline always drained per decay tick.
pub const DECAY_MINIMUM_FRACTION: u32 = 10;

/// Fraction of the maximum threat separating potential from safe entries.
pub const AGGRO_FLOOR_RATIO: u32 = 2;

// --- Deception ---

/// Scale applied to the opposed perception/deception check.
pub const DECEPTION_SKILL_SCALE: f64 = 0.25;

/// Multiplier for specialized deception when several candidates are visible.
pub const DECEPTION_SPECIALIZED_MULTIPLIER: f64 = 2.0;

/// Flat bonus while the player's deception ability is active.
pub const DECEPTION_ABILITY_BONUS: f64 = 0.5;

/// Steepness of the logistic opposed-skill curve.
pub const OPPOSED_SKILL_STEEPNESS: f64 = 0.03;

// --- Detection ---

/// Visual awareness radius used when a creature defines none (m).
pub const DEFAULT_VISUAL_RANGE: f64 = 18.0;

/// Aural awareness radius used when a creature defines none (m).
pub const DEFAULT_AURAL_RANGE: f64 = 30.0;

/// Pursuit radius for the current target (m).
pub const DEFAULT_CHASE_RANGE: f64 = 48.0;

/// Radius of the spatial "visible objects" query (m).
pub const DEFAULT_VISIBILITY_RADIUS: f64 = 96.0;

/// Detection range bonus per creature level.
pub const LEVEL_RANGE_BONUS: f64 = 0.002;

/// Cap on the level-derived detection bonus.
pub const MAX_LEVEL_RANGE_BONUS: f64 = 0.5;

// --- Engagement ---

/// Default seconds between target re-evaluations while awake.
pub const DEFAULT_RETARGET_INTERVAL_SECS: f64 = 5.0;

/// Default seconds between passive scans while idle.
pub const DEFAULT_PASSIVE_SCAN_INTERVAL_SECS: f64 = 1.0;

/// Default seconds between threat decay ticks.
pub const DEFAULT_THREAT_DECAY_INTERVAL_SECS: f64 = 1.0;

/// Default per-target alert cooldown (2 minutes).
pub const DEFAULT_ALERT_COOLDOWN_SECS: f64 = 120.0;

/// Default chance to spawn a bonus creature on wake when carrying death loot.
pub const DEFAULT_BONUS_SPAWN_CHANCE: f64 = 0.01;

/// Maximum ground offset of a bonus spawn from the waking monster (m).
pub const BONUS_SPAWN_SCATTER: f64 = 5.0;

/// Distance from home treated as "arrived" (m).
pub const HOME_ARRIVAL_DISTANCE: f64 = 1.0;

/// Distance at which a chasing monster stops closing on its target (m).
pub const MELEE_DISTANCE: f64 = 1.5;

/// Default return-home movement speed (m/s).
pub const DEFAULT_RETURN_SPEED: f64 = 4.0;

/// Monsters whose names start with this never build threat entries.
pub const NON_AGGRO_NAME_PREFIX: &str = "Placeholder";
