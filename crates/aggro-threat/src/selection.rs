//! Weighted target rolls.
//!
//! Two schemes: a threat-weighted roll over ledger entries near the top of
//! the table, and an inverse-distance roll used when no meaningful threat has
//! accrued. Both degrade to the first entry when floating-point or range
//! edge cases leave no entry selected.

use rand::Rng;
use tracing::warn;

use aggro_core::constants::AGGRO_FLOOR_RATIO;

/// A ledger entry eligible for the threat roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<K> {
    pub key: K,
    pub value: u32,
    /// Tickets in the roll: `value - aggro_floor + 1`.
    pub weight: u64,
    /// Sum of this weight and all smaller ones.
    pub cumulative: u64,
}

/// Where an entry stands relative to the aggro floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Standing {
    /// At or above the floor; `chance` is its independent share of the roll.
    Potential { chance: f64 },
    /// Below the floor; `safety` is `value / floor - 1` (negative).
    Safe { safety: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appraisal<K> {
    pub key: K,
    pub value: u32,
    pub standing: Standing,
}

/// Half of the maximum threat.
pub fn aggro_floor(max_threat: u32) -> u32 {
    max_threat / AGGRO_FLOOR_RATIO
}

/// Potential entries sorted ascending by weight (ties by key) with running
/// cumulative sums.
pub fn rank_potential<K: Ord + Copy>(entries: &[(K, u32)]) -> Vec<Ranked<K>> {
    let Some(max_threat) = entries.iter().map(|(_, v)| *v).max() else {
        return Vec::new();
    };
    let floor = aggro_floor(max_threat);

    let mut ranked: Vec<Ranked<K>> = entries
        .iter()
        .filter(|(_, value)| *value >= floor)
        .map(|(key, value)| Ranked {
            key: *key,
            value: *value,
            weight: (*value - floor) as u64 + 1,
            cumulative: 0,
        })
        .collect();
    ranked.sort_by(|a, b| a.weight.cmp(&b.weight).then(a.key.cmp(&b.key)));

    let mut running = 0u64;
    for entry in &mut ranked {
        running += entry.weight;
        entry.cumulative = running;
    }
    ranked
}

/// Resolve a roll in `[0, cumulative_max)` against a ranked list: the first
/// entry whose cumulative value exceeds the roll.
pub fn resolve_threat_roll<K: Copy>(ranked: &[Ranked<K>], roll: u64) -> Option<K> {
    let first = ranked.first()?;
    match ranked.iter().find(|entry| entry.cumulative > roll) {
        Some(entry) => Some(entry.key),
        None => {
            warn!(roll, "threat roll exceeded every entry, using first candidate");
            Some(first.key)
        }
    }
}

/// Threat-weighted roll over `entries`. Every potential entry has a non-zero
/// chance; higher threat means more tickets.
pub fn pick_by_threat<K: Ord + Copy>(entries: &[(K, u32)], rng: &mut impl Rng) -> Option<K> {
    let ranked = rank_potential(entries);
    let cumulative_max = ranked.last()?.cumulative;
    if ranked.len() == 1 {
        return Some(ranked[0].key);
    }
    let roll = rng.gen_range(0..cumulative_max);
    resolve_threat_roll(&ranked, roll)
}

/// Steal-aggro chance for potential entries and safety percentile for the
/// rest, in the input order. Pure projection, nothing is cached.
pub fn appraise<K: Ord + Copy>(entries: &[(K, u32)]) -> Vec<Appraisal<K>> {
    let ranked = rank_potential(entries);
    let cumulative_max = ranked.last().map(|r| r.cumulative).unwrap_or(0);
    let floor = entries
        .iter()
        .map(|(_, v)| *v)
        .max()
        .map(aggro_floor)
        .unwrap_or(0);

    entries
        .iter()
        .map(|(key, value)| {
            let standing = match ranked.iter().find(|r| r.key == *key) {
                Some(r) if cumulative_max > 0 => Standing::Potential {
                    chance: r.weight as f64 / cumulative_max as f64,
                },
                _ => Standing::Safe {
                    safety: if floor > 0 {
                        *value as f64 / floor as f64 - 1.0
                    } else {
                        0.0
                    },
                },
            };
            Appraisal {
                key: *key,
                value: *value,
                standing,
            }
        })
        .collect()
}

/// Resolve a roll in `[0, n - 1)` against inverse-distance ratios
/// `1 - d / dist_sum`. Falls back to index 0 when nothing exceeds the roll.
pub fn resolve_distance_roll(distances: &[f64], roll: f64) -> usize {
    let dist_sum: f64 = distances.iter().sum();
    if !dist_sum.is_finite() {
        warn!(dist_sum, "non-finite distance sum, using first candidate");
        return 0;
    }

    let mut accumulator = 0.0;
    for (index, distance) in distances.iter().enumerate() {
        let ratio = if dist_sum > 0.0 {
            1.0 - distance / dist_sum
        } else {
            1.0
        };
        accumulator += ratio;
        if accumulator > roll {
            return index;
        }
    }

    warn!(roll, accumulator, "distance roll exceeded every candidate, using first");
    0
}

/// Inverse-distance weighted pick. Closer candidates are favored but never
/// chosen deterministically. A single candidate is returned without a roll.
pub fn pick_by_distance(distances: &[f64], rng: &mut impl Rng) -> Option<usize> {
    match distances.len() {
        0 => None,
        1 => Some(0),
        n => {
            let inv_ratio_sum = (n - 1) as f64;
            let roll = rng.gen_range(0.0..inv_ratio_sum);
            Some(resolve_distance_roll(distances, roll))
        }
    }
}
