//! Capability bitflag sets attached to creatures.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::enums::Tactic;

bitflags! {
    /// Which entities a monster may target, and whether it may switch.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Tolerance: u32 {
        /// Never targets anything.
        const NO_ATTACK = 1 << 0;
        /// Only targets entities that attacked it or its allies.
        const RETALIATE = 1 << 2;
        /// Cannot switch away from a still-valid current target.
        const TARGET = 1 << 3;
        /// Only targets other monsters.
        const MONSTER = 1 << 4;
    }
}

bitflags! {
    /// Enabled legacy targeting tactics.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TacticFlags: u32 {
        const RANDOM = 1 << 0;
        const FOCUSED = 1 << 1;
        const LAST_DAMAGER = 1 << 2;
        const TOP_DAMAGER = 1 << 3;
        const WEAKEST = 1 << 4;
        const STRONGEST = 1 << 5;
        const NEAREST = 1 << 6;
    }
}

impl TacticFlags {
    /// Enabled tactics in declaration order. An empty set behaves as `Random`.
    pub fn tactics(&self) -> Vec<Tactic> {
        let table = [
            (TacticFlags::RANDOM, Tactic::Random),
            (TacticFlags::FOCUSED, Tactic::Focused),
            (TacticFlags::LAST_DAMAGER, Tactic::LastDamager),
            (TacticFlags::TOP_DAMAGER, Tactic::TopDamager),
            (TacticFlags::WEAKEST, Tactic::Weakest),
            (TacticFlags::STRONGEST, Tactic::Strongest),
            (TacticFlags::NEAREST, Tactic::Nearest),
        ];
        let enabled: Vec<Tactic> = table
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, tactic)| *tactic)
            .collect();
        if enabled.is_empty() {
            vec![Tactic::Random]
        } else {
            enabled
        }
    }
}
