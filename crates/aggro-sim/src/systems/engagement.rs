//! Engagement state machine: Idle, Awake and Returning.
//!
//! Transitions run through [`wake_up`], [`sleep`] and [`start_returning`] so
//! that their hooks fire no matter which system triggered them.

use hecs::{Entity, World};
use rand::Rng;
use tracing::{debug, info};

use aggro_core::components::{DeathLoot, Home, PatrolRoute};
use aggro_core::constants::{BONUS_SPAWN_SCATTER, HOME_ARRIVAL_DISTANCE};
use aggro_core::enums::{CombatPosture, EffectKind, EngagementState};
use aggro_core::events::AwarenessEvent;
use aggro_core::types::Velocity;

use crate::awareness::{id_of, Awareness, DamageHistory, Ledger};
use crate::systems::{alert, spatial, targeting, SystemCtx};

/// Idle -> Awake against `target`.
///
/// Runs the wake hooks: engagement timestamp, notifications, combat posture,
/// the bonus spawn roll and, unless `suppress_alert`, ally alerting.
pub fn wake_up(
    world: &World,
    monster: Entity,
    target: Entity,
    suppress_alert: bool,
    ctx: &mut SystemCtx,
) {
    {
        let Ok(mut awareness) = world.get::<&mut Awareness>(monster) else {
            return;
        };
        awareness.state = EngagementState::Awake;
        awareness.current_target = Some(target);
        awareness.engaged_at = Some(ctx.now);
        awareness.posture = CombatPosture::Combat;
        awareness.next_target_check = ctx.now + ctx.config.retarget_interval_secs;
    }

    let monster_id = id_of(monster);
    ctx.events.push(AwarenessEvent::NewEnemy {
        monster: monster_id,
        target: id_of(target),
    });
    ctx.events.push(AwarenessEvent::WokeUp { monster: monster_id });

    let position = spatial::position_of(world, monster).unwrap_or_default();
    ctx.events.push(AwarenessEvent::PlayEffect {
        kind: EffectKind::Alerted,
        at: position,
    });
    info!(monster = ?monster, target = ?target, "woke up");

    let has_loot = world.get::<&DeathLoot>(monster).is_ok();
    if has_loot && ctx.rng.gen::<f64>() < ctx.config.bonus_spawn_chance {
        let dx = ctx.rng.gen_range(-BONUS_SPAWN_SCATTER..=BONUS_SPAWN_SCATTER);
        let dy = ctx.rng.gen_range(-BONUS_SPAWN_SCATTER..=BONUS_SPAWN_SCATTER);
        let at = position.offset(dx, dy);
        ctx.events.push(AwarenessEvent::BonusSpawn { source: monster_id, at });
        ctx.events.push(AwarenessEvent::PlayEffect {
            kind: EffectKind::BonusSpawn,
            at,
        });
        info!(monster = ?monster, "bonus spawn");
    }

    if !suppress_alert {
        alert::alert_friendly(world, monster, ctx);
    }
}

/// Back to Idle: no target, no motion, no grudges, no threat.
pub fn sleep(world: &World, monster: Entity, ctx: &mut SystemCtx) {
    if let Ok(mut awareness) = world.get::<&mut Awareness>(monster) {
        awareness.state = EngagementState::Idle;
        awareness.current_target = None;
        awareness.retaliate.clear();
        awareness.posture = CombatPosture::Peace;
        awareness.next_target_check = ctx.now + ctx.config.passive_scan_interval_secs;
    } else {
        return;
    }
    if let Ok(mut velocity) = world.get::<&mut Velocity>(monster) {
        *velocity = Velocity::default();
    }
    if let Ok(mut ledger) = world.get::<&mut Ledger>(monster) {
        ledger.clear();
    }
    if let Ok(mut history) = world.get::<&mut DamageHistory>(monster) {
        history.clear();
    }
    ctx.events.push(AwarenessEvent::WentToSleep { monster: id_of(monster) });
    debug!(monster = ?monster, "went to sleep");
}

/// Awake -> Returning: drop the target and head home.
pub fn start_returning(world: &World, monster: Entity, ctx: &mut SystemCtx) {
    if let Ok(mut awareness) = world.get::<&mut Awareness>(monster) {
        awareness.state = EngagementState::Returning;
        awareness.current_target = None;
    } else {
        return;
    }
    let monster_id = id_of(monster);
    ctx.events.push(AwarenessEvent::ReturningHome { monster: monster_id });
    if let Ok(home) = world.get::<&Home>(monster) {
        ctx.events.push(AwarenessEvent::MoveToHome {
            monster: monster_id,
            home: home.position,
        });
    }
    debug!(monster = ?monster, "returning home");
}

/// Whether the monster stands at its spawn point. Monsters without a home
/// are always home.
pub fn is_at_home(world: &World, monster: Entity) -> bool {
    let Ok(home) = world.get::<&Home>(monster) else {
        return true;
    };
    spatial::position_of(world, monster)
        .map(|p| p.distance_to(&home.position) <= HOME_ARRIVAL_DISTANCE)
        .unwrap_or(true)
}

/// Run the selection cadence for every monster whose check is due.
pub fn run(world: &World, ctx: &mut SystemCtx) {
    let due: Vec<Entity> = world
        .query::<&Awareness>()
        .iter()
        .filter(|(_, awareness)| ctx.now >= awareness.next_target_check)
        .map(|(entity, _)| entity)
        .collect();

    for monster in due {
        // An earlier monster's alert may have woken this one already.
        let state = match world.get::<&Awareness>(monster) {
            Ok(awareness) if ctx.now >= awareness.next_target_check => awareness.state,
            _ => continue,
        };
        match state {
            EngagementState::Idle => passive_scan(world, monster, ctx),
            EngagementState::Awake | EngagementState::Returning => {
                retarget(world, monster, state, ctx)
            }
        }
    }
}

fn passive_scan(world: &World, monster: Entity, ctx: &mut SystemCtx) {
    if let Ok(mut awareness) = world.get::<&mut Awareness>(monster) {
        awareness.next_target_check = ctx.now + ctx.config.passive_scan_interval_secs;
    }
    let legacy = targeting::legacy_mode_for(world, monster, ctx);
    match targeting::select_target(world, monster, legacy, ctx) {
        Some(target) => wake_up(world, monster, target, false, ctx),
        None => {
            if let Ok(mut ledger) = world.get::<&mut Ledger>(monster) {
                ledger.clear();
            }
        }
    }
}

fn retarget(world: &World, monster: Entity, state: EngagementState, ctx: &mut SystemCtx) {
    let previous = {
        let Ok(mut awareness) = world.get::<&mut Awareness>(monster) else {
            return;
        };
        awareness.next_target_check = ctx.now + ctx.config.retarget_interval_secs;
        awareness.current_target
    };

    let legacy = targeting::legacy_mode_for(world, monster, ctx);
    match targeting::select_target(world, monster, legacy, ctx) {
        // Picking up a target on the way home starts a fresh engagement.
        Some(target) if state == EngagementState::Returning => {
            wake_up(world, monster, target, false, ctx);
        }
        Some(target) => {
            if let Ok(mut awareness) = world.get::<&mut Awareness>(monster) {
                awareness.current_target = Some(target);
            }
            if previous != Some(target) {
                ctx.events.push(AwarenessEvent::TargetChanged {
                    monster: id_of(monster),
                    from: previous.map(id_of),
                    to: id_of(target),
                });
                debug!(monster = ?monster, from = ?previous, to = ?target, "target changed");
                alert::alert_friendly(world, monster, ctx);
            }
        }
        None => {
            let patrols = world.get::<&PatrolRoute>(monster).is_ok();
            if is_at_home(world, monster) && !patrols {
                sleep(world, monster, ctx);
            } else if state == EngagementState::Awake {
                start_returning(world, monster, ctx);
            }
        }
    }
}

/// Returning monsters that reached home go to sleep.
pub fn check_arrivals(world: &World, ctx: &mut SystemCtx) {
    let returning: Vec<Entity> = world
        .query::<&Awareness>()
        .iter()
        .filter(|(_, awareness)| awareness.state == EngagementState::Returning)
        .map(|(entity, _)| entity)
        .collect();

    for monster in returning {
        if is_at_home(world, monster) {
            sleep(world, monster, ctx);
        }
    }
}
