//! Periodic threat decay.

use hecs::{Entity, World};
use tracing::trace;

use crate::awareness::{Awareness, Ledger};
use crate::systems::spatial;

/// Evict attackers that died or left chase range, then tick every ledger
/// down once.
pub fn run(world: &World) {
    let monsters: Vec<(Entity, f64)> = world
        .query::<(&Awareness, &Ledger)>()
        .iter()
        .map(|(entity, (awareness, _))| {
            (entity, awareness.chase_range_sq.max(awareness.visual_range_sq))
        })
        .collect();

    for (monster, range_sq) in monsters {
        let Ok(mut ledger) = world.get::<&mut Ledger>(monster) else {
            continue;
        };
        let before = ledger.len();
        ledger.retain(|attacker| {
            spatial::is_alive(world, *attacker)
                && spatial::squared_distance(world, monster, *attacker)
                    .map(|d| d <= range_sq)
                    .unwrap_or(false)
        });
        if ledger.len() != before {
            trace!(monster = ?monster, evicted = before - ledger.len(), "threat entries evicted");
        }
        ledger.tick_down();
    }
}
