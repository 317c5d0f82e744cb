//! Alert propagation to dormant allies.

use hecs::{Entity, World};
use tracing::{debug, info, warn};

use aggro_core::components::Creature;
use aggro_core::enums::{CreatureKind, EngagementState};
use aggro_core::events::AwarenessEvent;

use crate::awareness::{id_of, Awareness};
use crate::systems::{engagement, spatial, SystemCtx};

/// Identity of the monster raising the alarm.
struct Caller {
    faction: Option<u32>,
    creature_type: u32,
}

/// Wake dormant allies of `monster` against its current target.
///
/// Allies answer when they are attackable, share a faction or creature type
/// (or already count the target's type as a foe) and can hear the caller
/// from where they stand. Woken allies do not alert further on this call.
/// At most one alert per target every `alert_cooldown_secs`.
///
/// Returns the number of allies woken.
pub fn alert_friendly(world: &World, monster: Entity, ctx: &mut SystemCtx) -> u32 {
    let target = {
        let Ok(awareness) = world.get::<&Awareness>(monster) else {
            return 0;
        };
        let Some(target) = awareness.current_target else {
            return 0;
        };
        if let Some(&last) = awareness.alerted_recently.get(&target) {
            if ctx.now - last < ctx.config.alert_cooldown_secs {
                debug!(monster = ?monster, target = ?target, "alert on cooldown");
                return 0;
            }
        }
        target
    };

    let Some(caller) = world.get::<&Creature>(monster).ok().map(|c| Caller {
        faction: c.faction,
        creature_type: c.creature_type,
    }) else {
        return 0;
    };
    let target_type = world.get::<&Creature>(target).ok().map(|c| c.creature_type);

    let visibility_sq = ctx.config.visibility_radius * ctx.config.visibility_radius;
    let mut woken = 0u32;

    for ally in spatial::visible_creatures(world, monster, visibility_sq) {
        if ally == target || !answers_alert(world, ally, &caller, target_type) {
            continue;
        }

        let Some(distance_sq) = spatial::squared_distance(world, monster, ally) else {
            warn!(ally = ?ally, "ally without position skipped");
            continue;
        };

        {
            let Ok(mut awareness) = world.get::<&mut Awareness>(ally) else {
                warn!(ally = ?ally, "ally awareness unavailable");
                continue;
            };
            if awareness.state != EngagementState::Idle || distance_sq > awareness.aural_range_sq {
                continue;
            }
            awareness.add_retaliate_target(target);
            awareness.current_target = Some(target);
        }

        engagement::wake_up(world, ally, target, true, ctx);
        woken += 1;
    }

    if woken > 0 {
        if let Ok(mut awareness) = world.get::<&mut Awareness>(monster) {
            awareness.alerted_recently.insert(target, ctx.now);
        }
        ctx.events.push(AwarenessEvent::AlliesAlerted {
            monster: id_of(monster),
            target: id_of(target),
            woken,
        });
        info!(monster = ?monster, target = ?target, woken, "allies alerted");
    }
    woken
}

fn answers_alert(world: &World, ally: Entity, caller: &Caller, target_type: Option<u32>) -> bool {
    let Ok(creature) = world.get::<&Creature>(ally) else {
        return false;
    };
    if creature.kind != CreatureKind::Monster || creature.dead || !creature.attackable {
        return false;
    }
    let same_faction = matches!((creature.faction, caller.faction), (Some(a), Some(b)) if a == b);
    let same_type = creature.creature_type == caller.creature_type;
    let shared_foe = target_type.is_some() && creature.foe_type == target_type;
    same_faction || same_type || shared_foe
}
