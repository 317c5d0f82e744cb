//! Target selector.
//!
//! Builds the candidate list for a monster, then picks one candidate by
//! threat (or by legacy tactic), runs the deception contest on the pick and
//! maintains the vanish exclusions.

use std::collections::BTreeSet;

use hecs::{Entity, World};
use rand::Rng;
use tracing::debug;

use aggro_core::components::{Creature, Home, Stealth, Temperament};
use aggro_core::constants::{NON_AGGRO_NAME_PREFIX, THREAT_BASELINE};
use aggro_core::enums::{CreatureKind, EngagementState, TargetingMode};
use aggro_core::events::AwarenessEvent;
use aggro_core::flags::Tolerance;
use aggro_core::types::Position;
use aggro_threat::deception::{deception_chance, deception_succeeds};
use aggro_threat::selection::{pick_by_distance, pick_by_threat};
use aggro_threat::tactics::{apply_tactic, choose_tactic, DamageLeads, TacticCandidate};

use crate::awareness::{id_of, Awareness, Ledger};
use crate::systems::spatial;
use crate::systems::SystemCtx;

/// A visible, valid target and its distance from the monster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    pub distance: f64,
}

/// The monster-side facts the candidate filter needs.
struct Viewer {
    entity: Entity,
    name: String,
    position: Position,
    faction: Option<u32>,
    foe_type: Option<u32>,
    perception: u32,
    temperament: Temperament,
    awareness: Awareness,
}

impl Viewer {
    fn load(world: &World, monster: Entity) -> Option<Viewer> {
        let creature = world.get::<&Creature>(monster).ok()?;
        let awareness = world.get::<&Awareness>(monster).ok()?;
        let position = spatial::position_of(world, monster)?;
        let temperament = world
            .get::<&Temperament>(monster)
            .map(|t| *t)
            .unwrap_or_default();
        Some(Viewer {
            entity: monster,
            name: creature.name.clone(),
            position,
            faction: creature.faction,
            foe_type: creature.foe_type,
            perception: creature.perception,
            temperament,
            awareness: (*awareness).clone(),
        })
    }

    fn tolerance(&self) -> Tolerance {
        self.temperament.tolerance
    }

    fn is_placeholder(&self) -> bool {
        self.name.starts_with(NON_AGGRO_NAME_PREFIX)
    }
}

/// Whether the monster uses legacy tactics this cycle.
pub fn legacy_mode_for(world: &World, monster: Entity, ctx: &SystemCtx) -> bool {
    let forced = world
        .get::<&Temperament>(monster)
        .map(|t| t.force_legacy)
        .unwrap_or(false);
    forced || ctx.config.targeting_mode == TargetingMode::Legacy
}

/// Faction and tolerance rules for one potential target.
fn passes_allegiance(viewer: &Viewer, entity: Entity, creature: &Creature) -> bool {
    let tolerance = viewer.tolerance();
    let grudge = viewer.awareness.is_retaliate_target(entity);

    if tolerance.contains(Tolerance::RETALIATE) && !grudge {
        return false;
    }

    let same_faction = matches!(
        (viewer.faction, creature.faction),
        (Some(a), Some(b)) if a == b
    );
    if same_faction && !grudge {
        return false;
    }

    match creature.kind {
        CreatureKind::Player | CreatureKind::Pet => !tolerance.contains(Tolerance::MONSTER),
        CreatureKind::Monster => {
            grudge
                || tolerance.contains(Tolerance::MONSTER)
                || viewer.foe_type == Some(creature.creature_type)
        }
    }
}

/// Visible creatures this monster may target, in entity order.
fn build_candidates(
    world: &World,
    viewer: &Viewer,
    excluded: &BTreeSet<Entity>,
    ctx: &SystemCtx,
) -> Vec<Candidate> {
    if viewer.tolerance().contains(Tolerance::NO_ATTACK) {
        return Vec::new();
    }

    let visibility_sq = ctx.config.visibility_radius * ctx.config.visibility_radius;
    let mut candidates = Vec::new();

    for entity in spatial::visible_creatures(world, viewer.entity, visibility_sq) {
        if excluded.contains(&entity) {
            continue;
        }
        let Ok(creature) = world.get::<&Creature>(entity) else {
            continue;
        };
        if creature.dead || creature.teleporting {
            continue;
        }
        if !creature.attackable && !creature.targetable {
            continue;
        }
        let Some(position) = spatial::position_of(world, entity) else {
            continue;
        };

        let distance_sq = viewer.position.distance_sq(&position);
        let sight = &viewer.awareness;
        let range_sq = if sight.current_target == Some(entity) {
            sight.chase_range_sq.max(sight.visual_range_sq)
        } else {
            sight.visual_range_sq
        };
        if distance_sq > range_sq {
            continue;
        }

        if !passes_allegiance(viewer, entity, &creature) {
            continue;
        }

        candidates.push(Candidate {
            entity,
            distance: distance_sq.sqrt(),
        });
    }
    candidates
}

/// Drop vanish exclusions whose effect has expired; return the players still
/// hidden from this monster. A hidden previous target is purged.
fn refresh_vanish(world: &World, monster: Entity) -> BTreeSet<Entity> {
    let still_hidden: BTreeSet<Entity> = {
        let Ok(awareness) = world.get::<&Awareness>(monster) else {
            return BTreeSet::new();
        };
        let hidden: BTreeSet<Entity> = awareness
            .fooled_by
            .iter()
            .copied()
            .filter(|player| {
                world
                    .get::<&Stealth>(*player)
                    .map(|s| s.vanish_active)
                    .unwrap_or(false)
            })
            .collect();
        hidden
    };

    if let Ok(mut awareness) = world.get::<&mut Awareness>(monster) {
        awareness.fooled_by.retain(|p| still_hidden.contains(p));
        if let Some(target) = awareness.current_target {
            if still_hidden.contains(&target) {
                debug!(monster = ?monster, player = ?target, "vanished target dropped");
                awareness.current_target = None;
                if let Ok(mut ledger) = world.get::<&mut Ledger>(monster) {
                    ledger.remove(&target);
                }
            }
        }
    }
    still_hidden
}

/// Pick among candidates by threat, falling back to proximity when no
/// meaningful threat has accrued. Only an engaged monster records baseline
/// entries for its candidates; an Idle one reads the ledger as it stands.
fn pick_by_ledger(
    world: &World,
    viewer: &Viewer,
    candidates: &[Candidate],
    ctx: &mut SystemCtx,
) -> Option<Entity> {
    let mut entries: Vec<(Entity, u32)> = Vec::new();
    let mut max_threat = 0;
    if !viewer.is_placeholder() {
        if let Ok(mut ledger) = world.get::<&mut Ledger>(viewer.entity) {
            let engaged = viewer.awareness.state != EngagementState::Idle;
            for candidate in candidates {
                let value = if engaged {
                    ledger.ensure(candidate.entity)
                } else {
                    ledger.get(&candidate.entity).unwrap_or(THREAT_BASELINE)
                };
                entries.push((candidate.entity, value));
            }
            max_threat = ledger.max_threat().unwrap_or(0);
        }
    }

    if max_threat <= THREAT_BASELINE {
        return pick_nearest_weighted(candidates, ctx);
    }
    pick_by_threat(&entries, ctx.rng)
}

fn pick_nearest_weighted(candidates: &[Candidate], ctx: &mut SystemCtx) -> Option<Entity> {
    let distances: Vec<f64> = candidates.iter().map(|c| c.distance).collect();
    pick_by_distance(&distances, ctx.rng).map(|i| candidates[i].entity)
}

fn pick_by_tactic(
    world: &World,
    viewer: &Viewer,
    candidates: &[Candidate],
    ctx: &mut SystemCtx,
) -> Option<Entity> {
    let tactic = choose_tactic(viewer.temperament.tactics, ctx.rng);
    let listed: Vec<TacticCandidate<Entity>> = candidates
        .iter()
        .map(|c| TacticCandidate {
            key: c.entity,
            distance: c.distance,
            level: world.get::<&Creature>(c.entity).map(|cr| cr.level).unwrap_or(0),
        })
        .collect();
    let leads = DamageLeads {
        last_damager: ctx.oracle.last_damager(world, viewer.entity),
        top_damager: ctx.oracle.top_damager(world, viewer.entity),
    };
    debug!(monster = ?viewer.entity, ?tactic, "legacy tactic");
    apply_tactic(tactic, &listed, viewer.awareness.current_target, leads, ctx.rng)
}

/// Run the deception contest against `player`. Returns true when the player
/// avoids being targeted.
fn contest_deception(
    world: &World,
    viewer: &Viewer,
    player: Entity,
    candidate_count: usize,
    ctx: &mut SystemCtx,
) -> Option<bool> {
    let stealth = world.get::<&Stealth>(player).ok().map(|s| *s)?;
    if !stealth.attempting_deception {
        return None;
    }

    let skill_chance = ctx.oracle.opposed_skill_check(viewer.perception, stealth.deception);
    let chance = deception_chance(
        skill_chance,
        stealth.deception_training,
        candidate_count,
        stealth.ability_active,
    );
    let roll: f64 = ctx.rng.gen();
    let fooled = deception_succeeds(chance, roll);

    let text = if fooled {
        format!("You successfully deceive {}.", viewer.name)
    } else {
        format!("{} sees through your deception!", viewer.name)
    };
    ctx.events.push(AwarenessEvent::ChatLine {
        recipient: id_of(player),
        text,
    });
    debug!(monster = ?viewer.entity, player = ?player, chance, fooled, "deception contest");
    Some(fooled)
}

/// Choose a target for `monster`, or `None` when nothing valid is in range.
///
/// A Returning monster with no candidates asks the movement engine to path
/// home. A pick that wins its deception contest is removed and selection is
/// re-run on the reduced list; each player contests at most once per cycle.
pub fn select_target(
    world: &World,
    monster: Entity,
    legacy_mode: bool,
    ctx: &mut SystemCtx,
) -> Option<Entity> {
    let hidden = refresh_vanish(world, monster);
    let viewer = Viewer::load(world, monster)?;
    let mut candidates = build_candidates(world, &viewer, &hidden, ctx);

    if candidates.is_empty() {
        if viewer.awareness.state == EngagementState::Returning {
            if let Ok(home) = world.get::<&Home>(monster) {
                ctx.events.push(AwarenessEvent::MoveToHome {
                    monster: id_of(monster),
                    home: home.position,
                });
            }
        }
        return None;
    }

    if viewer.tolerance().contains(Tolerance::TARGET) {
        if let Some(current) = viewer.awareness.current_target {
            if candidates.iter().any(|c| c.entity == current) {
                return Some(current);
            }
        }
    }

    let mut contested: BTreeSet<Entity> = BTreeSet::new();
    loop {
        let pick = if legacy_mode {
            pick_by_tactic(world, &viewer, &candidates, ctx)
        } else {
            pick_by_ledger(world, &viewer, &candidates, ctx)
        }?;

        if !contested.insert(pick) {
            return Some(pick);
        }
        match contest_deception(world, &viewer, pick, candidates.len(), ctx) {
            Some(true) => {
                candidates.retain(|c| c.entity != pick);
                if candidates.is_empty() {
                    return None;
                }
            }
            _ => return Some(pick),
        }
    }
}
