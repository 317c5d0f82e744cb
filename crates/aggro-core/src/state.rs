//! Awareness snapshot: the visible decision state after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::EngagementState;
use crate::events::AwarenessEvent;
use crate::types::{EntityId, Position, SimTime};

/// Complete awareness state produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwarenessSnapshot {
    pub time: SimTime,
    pub monsters: Vec<MonsterView>,
    pub events: Vec<AwarenessEvent>,
}

/// One monster's engagement state and threat table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterView {
    pub id: EntityId,
    pub name: String,
    pub position: Position,
    pub state: EngagementState,
    pub target: Option<EntityId>,
    /// Threat entries in ascending attacker order.
    pub threat: Vec<ThreatEntryView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreatEntryView {
    pub attacker: EntityId,
    pub value: u32,
}
