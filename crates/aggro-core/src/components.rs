//! ECS components for hecs entities.
//!
//! Components are plain data structs. Game logic lives in the threat crate
//! and the simulation systems, not here. Components that refer to other
//! entities live in `aggro-sim`, next to the ECS.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::flags::{TacticFlags, Tolerance};
use crate::types::Position;

/// Identity and targeting-relevant traits of any creature, player or monster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    pub kind: CreatureKind,
    /// Species identifier; allies of the same type answer each other's alerts.
    pub creature_type: u32,
    pub level: u32,
    /// Faction membership. Players usually carry none.
    pub faction: Option<u32>,
    /// Creature type this creature is hostile toward regardless of faction.
    pub foe_type: Option<u32>,
    /// Perception skill, opposed against a player's deception.
    pub perception: u32,
    pub attackable: bool,
    /// Targetable even when not generically attackable.
    #[serde(default)]
    pub targetable: bool,
    #[serde(default)]
    pub teleporting: bool,
    #[serde(default)]
    pub dead: bool,
}

/// Base awareness radii in meters. `None` falls back to the configured default.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Senses {
    pub visual_range: Option<f64>,
    pub aural_range: Option<f64>,
    pub chase_range: Option<f64>,
}

/// Targeting rules of a monster.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Temperament {
    pub tolerance: Tolerance,
    /// Enabled legacy tactics.
    pub tactics: TacticFlags,
    /// Use legacy tactics even when the process-wide mode is threat based.
    pub force_legacy: bool,
}

/// Spawn point a monster returns to after losing its target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Home {
    pub position: Position,
}

/// Patrol route; its presence keeps a monster from sleeping in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatrolRoute {
    pub waypoints: Vec<Position>,
}

/// Marks a creature that carries death loot (eligible for bonus spawns).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeathLoot;

/// Percentage threat modifiers from the attacker's defensive equipment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatGear {
    /// Additive gain bonuses (0.1 = +10%).
    pub gain_bonuses: Vec<f64>,
    /// Multiplicative reductions (0.1 = -10%), one per item.
    pub reductions: Vec<f64>,
}

/// Threat-relevant state of an attacker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreatSource {
    pub stance: Stance,
    /// Timing-dependent power of the attacker's current action (0.0..=1.0).
    pub power: f64,
    pub gear: ThreatGear,
}

/// Evasion state of a player.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stealth {
    pub deception: u32,
    pub deception_training: SkillTraining,
    /// Actively trying to appear non-threatening.
    pub attempting_deception: bool,
    /// Deception ability currently active.
    pub ability_active: bool,
    /// Vanish effect currently active.
    pub vanish_active: bool,
}
