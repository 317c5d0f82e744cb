//! Combat collaborators consulted by the target selector.
//!
//! Skill resolution and damage bookkeeping belong to the surrounding game;
//! the selector only asks these questions.

use hecs::{Entity, World};

use aggro_threat::deception::opposed_skill_chance;

use crate::awareness::DamageHistory;

pub trait CombatOracle {
    /// Probability that `defender_skill` prevails over `attacker_skill`.
    fn opposed_skill_check(&self, attacker_skill: u32, defender_skill: u32) -> f64 {
        opposed_skill_chance(attacker_skill, defender_skill)
    }

    /// Most recent attacker to damage `monster`.
    fn last_damager(&self, world: &World, monster: Entity) -> Option<Entity> {
        world
            .get::<&DamageHistory>(monster)
            .ok()
            .and_then(|history| history.last_damager())
    }

    /// Attacker with the most total damage against `monster`.
    fn top_damager(&self, world: &World, monster: Entity) -> Option<Entity> {
        world
            .get::<&DamageHistory>(monster)
            .ok()
            .and_then(|history| history.top_damager())
    }
}

/// Logistic skill curve and the engine-maintained damage history.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOracle;

impl CombatOracle for DefaultOracle {}
