//! Events emitted by the simulation for presentation and diagnostics.
//!
//! Presentation collaborators (effects, chat, movement requests) consume these
//! instead of being called directly.

use serde::{Deserialize, Serialize};

use crate::enums::EffectKind;
use crate::types::{EntityId, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AwarenessEvent {
    /// A dormant monster noticed a new enemy.
    NewEnemy { monster: EntityId, target: EntityId },
    /// Monster went from Idle to Awake.
    WokeUp { monster: EntityId },
    /// Monster went back to Idle.
    WentToSleep { monster: EntityId },
    /// Monster lost its target away from home.
    ReturningHome { monster: EntityId },
    /// Request to the movement engine to path the monster home.
    MoveToHome { monster: EntityId, home: Position },
    /// Monster switched to a different target.
    TargetChanged {
        monster: EntityId,
        from: Option<EntityId>,
        to: EntityId,
    },
    /// Allies were woken against a shared target.
    AlliesAlerted {
        monster: EntityId,
        target: EntityId,
        woken: u32,
    },
    /// Bonus creature should appear near a waking monster.
    BonusSpawn { source: EntityId, at: Position },
    PlayEffect { kind: EffectKind, at: Position },
    ChatLine { recipient: EntityId, text: String },
}
