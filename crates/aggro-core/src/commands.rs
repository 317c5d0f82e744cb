//! Commands sent by collaborators (damage resolution, abilities) to the engine.
//!
//! Commands are queued and processed at the next tick boundary. Callers that
//! run inside the same tick may use the engine's direct methods instead.

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    /// `attacker` damaged or provoked `monster` for `threat` base points.
    Attack {
        monster: EntityId,
        attacker: EntityId,
        damage: u32,
        threat: u32,
    },
    /// The attacker's next contribution against `monster` is dropped.
    SkipNextThreat { monster: EntityId, attacker: EntityId },
    /// The attacker's next contribution against `monster` is doubled.
    DoubleNextThreat { monster: EntityId, attacker: EntityId },
    /// `player` vanished successfully against `monster`.
    Vanish { monster: EntityId, player: EntityId },
    /// Vanish effect on `player` started or expired.
    SetVanishActive { player: EntityId, active: bool },
    /// `player` started or stopped trying to appear non-threatening.
    SetDeceiving { player: EntityId, attempting: bool },
}
