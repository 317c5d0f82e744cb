//! Legacy flag-driven targeting tactics.
//!
//! Each selection cycle draws one tactic uniformly from the monster's enabled
//! set and applies it to the candidate list.

use rand::seq::SliceRandom;
use rand::Rng;

use aggro_core::enums::Tactic;
use aggro_core::flags::TacticFlags;

use crate::selection::pick_by_distance;

/// A candidate as seen by the legacy tactics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TacticCandidate<K> {
    pub key: K,
    pub distance: f64,
    pub level: u32,
}

/// Damage history lookups consulted by `LastDamager` and `TopDamager`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageLeads<K> {
    pub last_damager: Option<K>,
    pub top_damager: Option<K>,
}

/// Draw one tactic uniformly from the enabled set.
pub fn choose_tactic(flags: TacticFlags, rng: &mut impl Rng) -> Tactic {
    let tactics = flags.tactics();
    tactics.choose(rng).copied().unwrap_or(Tactic::Random)
}

/// Apply `tactic` to `candidates`. Tactics that cannot resolve (no damage
/// history, current target gone) fall back to `Random`.
pub fn apply_tactic<K: Copy + PartialEq>(
    tactic: Tactic,
    candidates: &[TacticCandidate<K>],
    current: Option<K>,
    leads: DamageLeads<K>,
    rng: &mut impl Rng,
) -> Option<K> {
    if candidates.is_empty() {
        return None;
    }

    let listed = |key: Option<K>| key.filter(|k| candidates.iter().any(|c| c.key == *k));

    let chosen = match tactic {
        Tactic::Random => None,
        Tactic::Focused => listed(current),
        Tactic::LastDamager => listed(leads.last_damager),
        Tactic::TopDamager => listed(leads.top_damager),
        Tactic::Weakest => first_by(candidates, |a, b| a.level < b.level),
        Tactic::Strongest => first_by(candidates, |a, b| a.level > b.level),
        Tactic::Nearest => first_by(candidates, |a, b| a.distance < b.distance),
    };

    chosen.or_else(|| random_by_distance(candidates, rng))
}

/// First candidate in list order that no later candidate beats.
fn first_by<K: Copy>(
    candidates: &[TacticCandidate<K>],
    better: impl Fn(&TacticCandidate<K>, &TacticCandidate<K>) -> bool,
) -> Option<K> {
    let mut best = candidates.first()?;
    for candidate in &candidates[1..] {
        if better(candidate, best) {
            best = candidate;
        }
    }
    Some(best.key)
}

fn random_by_distance<K: Copy>(candidates: &[TacticCandidate<K>], rng: &mut impl Rng) -> Option<K> {
    let distances: Vec<f64> = candidates.iter().map(|c| c.distance).collect();
    pick_by_distance(&distances, rng).map(|i| candidates[i].key)
}
