//! Deception contest between a monster's perception and a player's deception.

use aggro_core::constants::*;
use aggro_core::enums::SkillTraining;

/// Probability that a defender's skill prevails against an attacker's in an
/// opposed check. Equal skills give 0.5; the curve is logistic in the gap.
pub fn opposed_skill_chance(attacker_skill: u32, defender_skill: u32) -> f64 {
    let gap = attacker_skill as f64 - defender_skill as f64;
    1.0 / (1.0 + (OPPOSED_SKILL_STEEPNESS * gap).exp())
}

/// Chance that a deceiving player avoids being targeted.
///
/// `skill_chance` is the opposed perception/deception result. Specialized
/// deception doubles the scaled chance when more than one candidate is
/// visible; an active deception ability adds a flat bonus.
pub fn deception_chance(
    skill_chance: f64,
    training: SkillTraining,
    candidate_count: usize,
    ability_active: bool,
) -> f64 {
    let mut chance = skill_chance * DECEPTION_SKILL_SCALE;
    if training == SkillTraining::Specialized && candidate_count > 1 {
        chance *= DECEPTION_SPECIALIZED_MULTIPLIER;
    }
    if ability_active {
        chance += DECEPTION_ABILITY_BONUS;
    }
    if chance.is_finite() {
        chance.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Outcome of one contest roll.
pub fn deception_succeeds(chance: f64, roll: f64) -> bool {
    roll < chance
}
