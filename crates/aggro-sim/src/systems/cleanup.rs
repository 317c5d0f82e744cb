//! Cleanup system: drops references to creatures that died or were
//! despawned, and expires stale alert records.

use hecs::{Entity, World};
use tracing::debug;

use crate::awareness::{Awareness, DamageHistory, Ledger};
use crate::systems::spatial;

/// Purge dangling entity handles from every monster's awareness state.
///
/// A monster whose target vanished gets its next selection pulled forward
/// to `now`.
pub fn run(world: &World, now: f64, alert_cooldown_secs: f64) {
    let monsters: Vec<Entity> = world.query::<&Awareness>().iter().map(|(e, _)| e).collect();

    for monster in monsters {
        {
            let Ok(mut awareness) = world.get::<&mut Awareness>(monster) else {
                continue;
            };
            if let Some(target) = awareness.current_target {
                if !spatial::is_alive(world, target) {
                    debug!(monster = ?monster, target = ?target, "target gone");
                    awareness.current_target = None;
                    awareness.next_target_check = now;
                }
            }
            awareness.retaliate.retain(|e| spatial::is_alive(world, *e));
            awareness.fooled_by.retain(|e| world.contains(*e));
            awareness
                .alerted_recently
                .retain(|e, at| world.contains(*e) && now - *at < alert_cooldown_secs);
        }

        if let Ok(mut ledger) = world.get::<&mut Ledger>(monster) {
            ledger.retain(|e| spatial::is_alive(world, *e));
        }
        if let Ok(mut history) = world.get::<&mut DamageHistory>(monster) {
            history.retain(|e| spatial::is_alive(world, e));
        }
    }
}
