//! Per-monster threat ledger.
//!
//! Maps each attacker to an integer threat score that never drops below
//! [`THREAT_BASELINE`] once tracked. Scores accrue through
//! [`ThreatLedger::increase_threat`] and drain through
//! [`ThreatLedger::tick_down`].

use std::collections::{BTreeMap, BTreeSet};

use aggro_core::components::{ThreatGear, ThreatSource};
use aggro_core::constants::*;
use aggro_core::enums::Stance;

use crate::selection::{appraise, Appraisal};

/// Threat scores of one monster, keyed by attacker.
///
/// Entries are kept in key order so iteration (and therefore every roll made
/// over the ledger) is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatLedger<K: Ord> {
    entries: BTreeMap<K, u32>,
    accrued_since_decay: u32,
    skip_next: BTreeSet<K>,
    double_next: BTreeSet<K>,
}

impl<K: Ord> Default for ThreatLedger<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            accrued_since_decay: 0,
            skip_next: BTreeSet::new(),
            double_next: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Copy> ThreatLedger<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, attacker: &K) -> Option<u32> {
        self.entries.get(attacker).copied()
    }

    pub fn contains(&self, attacker: &K) -> bool {
        self.entries.contains_key(attacker)
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, u32)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    pub fn max_threat(&self) -> Option<u32> {
        self.entries.values().copied().max()
    }

    /// Threat accrued since the last decay tick.
    pub fn accrued(&self) -> u32 {
        self.accrued_since_decay
    }

    /// Track `attacker`, creating the entry at baseline if missing.
    pub fn ensure(&mut self, attacker: K) -> u32 {
        *self.entries.entry(attacker).or_insert(THREAT_BASELINE)
    }

    /// Stop tracking `attacker`, dropping any pending modifiers.
    pub fn remove(&mut self, attacker: &K) -> Option<u32> {
        self.skip_next.remove(attacker);
        self.double_next.remove(attacker);
        self.entries.remove(attacker)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.entries.retain(|k, _| keep(k));
        self.skip_next.retain(|k| keep(k));
        self.double_next.retain(|k| keep(k));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.skip_next.clear();
        self.double_next.clear();
        self.accrued_since_decay = 0;
    }

    /// Drop the attacker's next contribution.
    pub fn mark_skip_next(&mut self, attacker: K) {
        self.skip_next.insert(attacker);
    }

    /// Double the attacker's next contribution.
    pub fn mark_double_next(&mut self, attacker: K) {
        self.double_next.insert(attacker);
    }

    pub fn has_pending_skip(&self, attacker: &K) -> bool {
        self.skip_next.contains(attacker)
    }

    pub fn has_pending_double(&self, attacker: &K) -> bool {
        self.double_next.contains(attacker)
    }

    /// Add threat from `attacker`. Returns the amount actually applied
    /// (zero when a pending skip consumed the contribution).
    pub fn increase_threat(
        &mut self,
        attacker: K,
        base: u32,
        source: Option<&ThreatSource>,
    ) -> u32 {
        self.ensure(attacker);

        let mut amount = base as f64;
        if let Some(source) = source {
            amount = apply_stance(amount, source.stance, source.power);
        }

        // At most one transient modifier is consumed; skip wins.
        if self.skip_next.remove(&attacker) {
            return 0;
        }
        if self.double_next.remove(&attacker) {
            amount *= 2.0;
        }

        if let Some(source) = source {
            amount = apply_gear(amount, &source.gear);
        }

        let applied = if amount.is_finite() {
            (amount.round() as u32).max(MIN_THREAT_INCREMENT)
        } else {
            MIN_THREAT_INCREMENT
        };

        if let Some(value) = self.entries.get_mut(&attacker) {
            *value = value.saturating_add(applied);
        }
        self.accrued_since_decay = self.accrued_since_decay.saturating_add(applied);
        applied
    }

    /// One decay step: drain every entry toward baseline.
    ///
    /// The per-entry subtraction is the larger of the recently accrued threat
    /// split evenly across entries and a tenth of the total excess above
    /// baseline (at least 1).
    pub fn tick_down(&mut self) {
        let count = self.entries.len() as u64;
        if count == 0 {
            self.accrued_since_decay = 0;
            return;
        }

        let total: u64 = self.entries.values().map(|v| *v as u64).sum();
        let above = total.saturating_sub(count * THREAT_BASELINE as u64);
        let minimum_subtraction = (above / DECAY_MINIMUM_FRACTION as u64).max(1);
        let per_entry = self.accrued_since_decay as u64 / count;
        let decrement = per_entry.max(minimum_subtraction);

        for value in self.entries.values_mut() {
            let drained = (*value as u64).saturating_sub(decrement);
            *value = drained.max(THREAT_BASELINE as u64) as u32;
        }
        self.accrued_since_decay = 0;
    }

    /// Steal-aggro and safety readout over the whole ledger.
    pub fn appraise(&self) -> Vec<Appraisal<K>> {
        let entries: Vec<(K, u32)> = self.iter().collect();
        appraise(&entries)
    }
}

/// Stance multiplier: provoke doubles at high power, smokescreen halves.
pub fn apply_stance(amount: f64, stance: Stance, power: f64) -> f64 {
    match stance {
        Stance::Provoke if power >= PROVOKE_POWER_THRESHOLD => amount * 2.0,
        Stance::Smokescreen => amount * 0.5,
        _ => amount,
    }
}

/// Gear modifiers: gains add together, reductions multiply.
pub fn apply_gear(amount: f64, gear: &ThreatGear) -> f64 {
    let gain: f64 = gear.gain_bonuses.iter().sum();
    let reduction: f64 = gear
        .reductions
        .iter()
        .map(|r| (1.0 - r).max(0.0))
        .product();
    amount * (1.0 + gain).max(0.0) * reduction
}
