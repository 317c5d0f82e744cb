//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Engagement state of a monster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngagementState {
    /// Not in combat; patrol or wander active.
    #[default]
    Idle,
    /// Actively pursuing or attacking a target.
    Awake,
    /// Target lost, heading back to its home position.
    Returning,
}

/// Closed set of creature kinds. Tolerance filtering matches on this
/// instead of inspecting the entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureKind {
    Player,
    #[default]
    Monster,
    /// A monster bound to a player; hostile creatures treat it like its owner.
    Pet,
}

/// Combat posture, reset when a monster goes back to sleep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPosture {
    #[default]
    Peace,
    Combat,
}

/// Threat-affecting stance active on an attacker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stance {
    #[default]
    None,
    /// Doubles threat while the attacker's power metric is high enough.
    Provoke,
    /// Halves threat.
    Smokescreen,
}

/// Training tier of a skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillTraining {
    #[default]
    Untrained,
    Trained,
    Specialized,
}

/// Process-wide targeting mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingMode {
    /// Threat-ledger weighted selection.
    #[default]
    Threat,
    /// Flag-driven legacy tactics.
    Legacy,
}

/// A single legacy targeting tactic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tactic {
    Random,
    Focused,
    LastDamager,
    TopDamager,
    Weakest,
    Strongest,
    Nearest,
}

/// Visual effect requested from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Played on a monster as it notices a target.
    Alerted,
    /// Played where a bonus creature appears.
    BonusSpawn,
}
