//! Snapshot system: queries the ECS world and builds an AwarenessSnapshot.
//!
//! Read-only; it never modifies the world.

use hecs::World;

use aggro_core::components::Creature;
use aggro_core::events::AwarenessEvent;
use aggro_core::state::{AwarenessSnapshot, MonsterView, ThreatEntryView};
use aggro_core::types::{Position, SimTime};

use crate::awareness::{id_of, Awareness, Ledger};

pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    events: Vec<AwarenessEvent>,
) -> AwarenessSnapshot {
    AwarenessSnapshot {
        time: *time,
        monsters: build_monsters(world),
        events,
    }
}

/// MonsterView list sorted by id.
fn build_monsters(world: &World) -> Vec<MonsterView> {
    let mut monsters: Vec<MonsterView> = world
        .query::<(&Creature, &Position, &Awareness, Option<&Ledger>)>()
        .iter()
        .map(|(entity, (creature, pos, awareness, ledger))| MonsterView {
            id: id_of(entity),
            name: creature.name.clone(),
            position: *pos,
            state: awareness.state,
            target: awareness.current_target.map(id_of),
            threat: ledger
                .map(|l| {
                    l.iter()
                        .map(|(attacker, value)| ThreatEntryView {
                            attacker: id_of(attacker),
                            value,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect();

    monsters.sort_by_key(|m| m.id);
    monsters
}
