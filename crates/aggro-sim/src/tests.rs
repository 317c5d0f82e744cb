//! Tests for the simulation engine: state machine, targeting rules, alerts,
//! evasion and threat bookkeeping.

use hecs::Entity;

use aggro_core::commands::SimCommand;
use aggro_core::components::{Creature, Senses, Temperament, ThreatSource};
use aggro_core::config::AwarenessConfig;
use aggro_core::enums::*;
use aggro_core::events::AwarenessEvent;
use aggro_core::flags::{TacticFlags, Tolerance};
use aggro_core::types::{EntityId, Position, Velocity};

use crate::awareness::{id_of, Awareness, DamageHistory};
use crate::engine::{SimConfig, SimulationEngine};
use crate::error::SimError;
use crate::oracle::CombatOracle;
use crate::world_setup::{MonsterSpec, PlayerSpec};

fn engine() -> SimulationEngine {
    SimulationEngine::new(SimConfig::default())
}

fn engine_with(awareness: AwarenessConfig) -> SimulationEngine {
    SimulationEngine::new(SimConfig {
        awareness,
        ..Default::default()
    })
}

fn spawn_monster(engine: &mut SimulationEngine, x: f64, y: f64) -> Entity {
    engine.spawn_monster(&MonsterSpec::new("Drudge", 7, Position::new(x, y, 0.0)).faction(1))
}

fn spawn_player(engine: &mut SimulationEngine, name: &str, x: f64, y: f64) -> Entity {
    engine.spawn_player(&PlayerSpec::new(name, Position::new(x, y, 0.0)))
}

fn run_ticks(engine: &mut SimulationEngine, ticks: usize) -> Vec<AwarenessEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        events.extend(engine.tick().events);
    }
    events
}

fn move_to(engine: &mut SimulationEngine, entity: Entity, x: f64, y: f64) {
    *engine.world_mut().get::<&mut Position>(entity).unwrap() = Position::new(x, y, 0.0);
}

/// Forces the opposed check result.
struct FixedSkillCheck(f64);

impl CombatOracle for FixedSkillCheck {
    fn opposed_skill_check(&self, _attacker_skill: u32, _defender_skill: u32) -> f64 {
        self.0
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let build = || {
        let mut engine = SimulationEngine::new(SimConfig {
            seed: 12345,
            ..Default::default()
        });
        let a = spawn_monster(&mut engine, 0.0, 0.0);
        let b = spawn_monster(&mut engine, 12.0, 0.0);
        let p1 = spawn_player(&mut engine, "Asheron", 6.0, 3.0);
        let p2 = spawn_player(&mut engine, "Bael", 9.0, -4.0);
        (engine, [a, b], [p1, p2])
    };
    let (mut engine_a, monsters, players) = build();
    let (mut engine_b, _, _) = build();

    for tick in 0..300 {
        if tick % 10 == 0 {
            let attack = SimCommand::Attack {
                monster: id_of(monsters[tick / 10 % 2]),
                attacker: id_of(players[tick / 20 % 2]),
                damage: 5,
                threat: 10 + tick as u32,
            };
            engine_a.queue_command(attack.clone());
            engine_b.queue_command(attack);
        }
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

// ---- State machine ----

#[test]
fn test_idle_monster_wakes_on_visible_player() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 5.0, 0.0);

    let snap = engine.tick();

    assert_eq!(engine.state_of(monster), Some(EngagementState::Awake));
    assert_eq!(engine.target_of(monster), Some(player));
    assert!(snap.events.contains(&AwarenessEvent::NewEnemy {
        monster: id_of(monster),
        target: id_of(player),
    }));
    assert!(snap.events.contains(&AwarenessEvent::WokeUp { monster: id_of(monster) }));
    assert!(snap.events.iter().any(|e| matches!(
        e,
        AwarenessEvent::PlayEffect {
            kind: EffectKind::Alerted,
            ..
        }
    )));

    let awareness = engine.world().get::<&Awareness>(monster).unwrap();
    assert_eq!(awareness.posture, CombatPosture::Combat);
    assert_eq!(awareness.engaged_at, Some(0.0));
}

#[test]
fn test_player_out_of_sight_stays_idle() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    spawn_player(&mut engine, "Asheron", 50.0, 0.0);

    run_ticks(&mut engine, 30);
    assert_eq!(engine.state_of(monster), Some(EngagementState::Idle));
    assert_eq!(engine.target_of(monster), None);
}

#[test]
fn test_monster_sleeps_at_home_when_target_leaves() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 1.0, 0.0);

    engine.tick();
    assert_eq!(engine.state_of(monster), Some(EngagementState::Awake));

    move_to(&mut engine, player, 500.0, 0.0);
    let events = run_ticks(&mut engine, 60);

    assert!(events.contains(&AwarenessEvent::WentToSleep { monster: id_of(monster) }));
    assert_eq!(engine.state_of(monster), Some(EngagementState::Idle));
    assert_eq!(engine.target_of(monster), None);

    let awareness = engine.world().get::<&Awareness>(monster).unwrap();
    assert_eq!(awareness.posture, CombatPosture::Peace);
    assert!(awareness.retaliate.is_empty());
    let velocity = *engine.world().get::<&Velocity>(monster).unwrap();
    assert_eq!(velocity, Velocity::default());
    assert_eq!(engine.threat_of(monster, player), None);
}

#[test]
fn test_monster_returns_home_before_sleeping() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 10.0, 0.0);

    run_ticks(&mut engine, 60);
    let chased = *engine.world().get::<&Position>(monster).unwrap();
    assert!(chased.x > 5.0, "monster should have closed on its target, at {chased:?}");

    move_to(&mut engine, player, 0.0, 500.0);
    let events = run_ticks(&mut engine, 200);

    assert!(events.contains(&AwarenessEvent::ReturningHome { monster: id_of(monster) }));
    assert!(events.iter().any(|e| matches!(
        e,
        AwarenessEvent::MoveToHome { monster: m, .. } if *m == id_of(monster)
    )));
    assert!(events.contains(&AwarenessEvent::WentToSleep { monster: id_of(monster) }));
    assert_eq!(engine.state_of(monster), Some(EngagementState::Idle));

    let home = *engine.world().get::<&Position>(monster).unwrap();
    assert!(home.distance_to(&Position::default()) <= 1.0, "monster at {home:?}");
}

#[test]
fn test_returning_monster_reengages_with_wake_hooks() {
    let mut engine = engine_with(AwarenessConfig {
        retarget_interval_secs: 0.5,
        ..Default::default()
    });
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 10.0, 0.0);

    run_ticks(&mut engine, 30);
    move_to(&mut engine, player, 0.0, 500.0);
    for _ in 0..20 {
        engine.tick();
        if engine.state_of(monster) == Some(EngagementState::Returning) {
            break;
        }
    }
    assert_eq!(engine.state_of(monster), Some(EngagementState::Returning));
    let first_engaged = engine.world().get::<&Awareness>(monster).unwrap().engaged_at;
    assert_eq!(first_engaged, Some(0.0));

    let here = *engine.world().get::<&Position>(monster).unwrap();
    move_to(&mut engine, player, here.x + 1.0, here.y);
    let mut events = Vec::new();
    for _ in 0..10 {
        events.extend(engine.tick().events);
        if engine.state_of(monster) == Some(EngagementState::Awake) {
            break;
        }
    }

    assert_eq!(engine.state_of(monster), Some(EngagementState::Awake));
    assert_eq!(engine.target_of(monster), Some(player));
    assert!(events.contains(&AwarenessEvent::WokeUp { monster: id_of(monster) }));
    assert!(events.contains(&AwarenessEvent::NewEnemy {
        monster: id_of(monster),
        target: id_of(player),
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        AwarenessEvent::PlayEffect {
            kind: EffectKind::Alerted,
            ..
        }
    )));
    let awareness = engine.world().get::<&Awareness>(monster).unwrap();
    assert!(awareness.engaged_at.unwrap() > 0.0);
    assert_eq!(awareness.posture, CombatPosture::Combat);
}

#[test]
fn test_dead_target_triggers_reselection() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 1.0, 0.0);

    engine.tick();
    assert_eq!(engine.target_of(monster), Some(player));

    engine.world_mut().get::<&mut Creature>(player).unwrap().dead = true;
    engine.tick();

    assert_eq!(engine.target_of(monster), None);
    assert_eq!(engine.state_of(monster), Some(EngagementState::Idle));
}

#[test]
fn test_on_attacked_wakes_dormant_monster() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 40.0, 0.0);

    let applied = engine.on_attacked(monster, player, 12, 10).unwrap();

    assert_eq!(applied, 10);
    assert_eq!(engine.state_of(monster), Some(EngagementState::Awake));
    assert_eq!(engine.target_of(monster), Some(player));
    assert_eq!(engine.threat_of(monster, player), Some(110));
    let history = engine.world().get::<&DamageHistory>(monster).unwrap();
    assert_eq!(history.last_damager(), Some(player));
}

#[test]
fn test_bonus_spawn_on_wake_with_death_loot() {
    let mut engine = engine_with(AwarenessConfig {
        bonus_spawn_chance: 1.0,
        ..Default::default()
    });
    let monster = engine.spawn_monster(&MonsterSpec {
        death_loot: true,
        ..MonsterSpec::new("Drudge", 7, Position::default())
    });
    spawn_player(&mut engine, "Asheron", 2.0, 0.0);

    let snap = engine.tick();
    let spawn = snap.events.iter().find_map(|e| match e {
        AwarenessEvent::BonusSpawn { source, at } if *source == id_of(monster) => Some(*at),
        _ => None,
    });
    let at = spawn.expect("bonus spawn event");
    assert!(at.x.abs() <= 5.0 && at.y.abs() <= 5.0);
}

// ---- Alerts ----

#[test]
fn test_alert_wakes_allies_within_earshot() {
    let mut engine = engine();
    let caller = spawn_monster(&mut engine, 0.0, 0.0);
    let ally = engine.spawn_monster(&MonsterSpec {
        senses: Senses {
            visual_range: Some(2.0),
            ..Default::default()
        },
        ..MonsterSpec::new("Drudge", 7, Position::new(20.0, 0.0, 0.0)).faction(1)
    });
    let player = spawn_player(&mut engine, "Asheron", 3.0, 0.0);

    let snap = engine.tick();

    assert_eq!(engine.state_of(caller), Some(EngagementState::Awake));
    assert_eq!(engine.state_of(ally), Some(EngagementState::Awake));
    assert_eq!(engine.target_of(ally), Some(player));
    assert!(engine.world().get::<&Awareness>(ally).unwrap().is_retaliate_target(player));
    assert!(snap.events.contains(&AwarenessEvent::AlliesAlerted {
        monster: id_of(caller),
        target: id_of(player),
        woken: 1,
    }));
    // Woken allies do not cascade.
    let alerts = snap
        .events
        .iter()
        .filter(|e| matches!(e, AwarenessEvent::AlliesAlerted { .. }))
        .count();
    assert_eq!(alerts, 1);
}

#[test]
fn test_alert_ignores_allies_out_of_earshot() {
    let mut engine = engine();
    let caller = spawn_monster(&mut engine, 0.0, 0.0);
    let far_ally = spawn_monster(&mut engine, -40.0, 0.0);
    spawn_player(&mut engine, "Asheron", 3.0, 0.0);

    let snap = engine.tick();

    assert_eq!(engine.state_of(caller), Some(EngagementState::Awake));
    assert_eq!(engine.state_of(far_ally), Some(EngagementState::Idle));
    assert!(!snap
        .events
        .iter()
        .any(|e| matches!(e, AwarenessEvent::AlliesAlerted { .. })));
}

#[test]
fn test_alert_rate_limited_per_target() {
    let mut engine = engine();
    let caller = spawn_monster(&mut engine, 0.0, 0.0);
    let blind = Senses {
        visual_range: Some(2.0),
        ..Default::default()
    };
    engine.spawn_monster(&MonsterSpec {
        senses: blind,
        ..MonsterSpec::new("Drudge", 7, Position::new(20.0, 0.0, 0.0)).faction(1)
    });
    let player = spawn_player(&mut engine, "Asheron", 3.0, 0.0);
    engine.tick();

    let late_ally = engine.spawn_monster(&MonsterSpec {
        senses: blind,
        ..MonsterSpec::new("Drudge", 7, Position::new(-20.0, 0.0, 0.0)).faction(1)
    });

    assert_eq!(engine.alert_friendly(caller).unwrap(), 0);
    assert_eq!(engine.state_of(late_ally), Some(EngagementState::Idle));

    // Past the two minute window the same target may be alerted for again.
    run_ticks(&mut engine, 1210);
    assert_eq!(engine.target_of(caller), Some(player));
    assert_eq!(engine.alert_friendly(caller).unwrap(), 1);
    assert_eq!(engine.state_of(late_ally), Some(EngagementState::Awake));
    assert_eq!(engine.target_of(late_ally), Some(player));
}

#[test]
fn test_alert_not_recorded_when_nobody_wakes() {
    let mut engine = engine();
    let caller = spawn_monster(&mut engine, 0.0, 0.0);
    spawn_player(&mut engine, "Asheron", 3.0, 0.0);
    engine.tick();

    let late_ally = engine.spawn_monster(&MonsterSpec {
        senses: Senses {
            visual_range: Some(2.0),
            ..Default::default()
        },
        ..MonsterSpec::new("Drudge", 7, Position::new(-20.0, 0.0, 0.0)).faction(1)
    });

    assert_eq!(engine.alert_friendly(caller).unwrap(), 1);
    assert_eq!(engine.state_of(late_ally), Some(EngagementState::Awake));
}

// ---- Targeting rules ----

#[test]
fn test_same_faction_ignored_until_grudge() {
    let mut engine = engine();
    let a = spawn_monster(&mut engine, 0.0, 0.0);
    let b = spawn_monster(&mut engine, 3.0, 0.0);

    assert_eq!(engine.select_target(a).unwrap(), None);

    engine.on_attacked(a, b, 5, 10).unwrap();
    assert_eq!(engine.select_target(a).unwrap(), Some(b));
}

#[test]
fn test_foe_type_monsters_are_targeted() {
    let mut engine = engine();
    let hunter = engine.spawn_monster(&MonsterSpec {
        foe_type: Some(9),
        ..MonsterSpec::new("Hunter", 7, Position::default()).faction(1)
    });
    let prey = engine.spawn_monster(&MonsterSpec::new("Prey", 9, Position::new(3.0, 0.0, 0.0)).faction(2));
    engine.spawn_monster(&MonsterSpec::new("Bystander", 5, Position::new(2.0, 0.0, 0.0)).faction(2));

    for _ in 0..20 {
        assert_eq!(engine.select_target(hunter).unwrap(), Some(prey));
    }
}

#[test]
fn test_monster_tolerance_skips_players() {
    let mut engine = engine();
    let brawler = engine.spawn_monster(&MonsterSpec::new("Brawler", 7, Position::default()).faction(1).temperament(
        Temperament {
            tolerance: Tolerance::MONSTER,
            ..Default::default()
        },
    ));
    spawn_player(&mut engine, "Asheron", 2.0, 0.0);
    let rival = engine.spawn_monster(&MonsterSpec::new("Rival", 5, Position::new(5.0, 0.0, 0.0)).faction(2));

    for _ in 0..20 {
        assert_eq!(engine.select_target(brawler).unwrap(), Some(rival));
    }
}

#[test]
fn test_no_attack_tolerance_never_targets() {
    let mut engine = engine();
    let pacifist = engine.spawn_monster(&MonsterSpec::new("Cow", 7, Position::default()).temperament(Temperament {
        tolerance: Tolerance::NO_ATTACK,
        ..Default::default()
    }));
    spawn_player(&mut engine, "Asheron", 2.0, 0.0);

    run_ticks(&mut engine, 20);
    assert_eq!(engine.state_of(pacifist), Some(EngagementState::Idle));
}

#[test]
fn test_retaliate_tolerance_only_targets_grudges() {
    let mut engine = engine();
    let monster = engine.spawn_monster(&MonsterSpec::new("Guard", 7, Position::default()).temperament(Temperament {
        tolerance: Tolerance::RETALIATE,
        ..Default::default()
    }));
    let player = spawn_player(&mut engine, "Asheron", 2.0, 0.0);

    assert_eq!(engine.select_target(monster).unwrap(), None);
    engine
        .world()
        .get::<&mut Awareness>(monster)
        .unwrap()
        .add_retaliate_target(player);
    assert_eq!(engine.select_target(monster).unwrap(), Some(player));
}

#[test]
fn test_target_tolerance_keeps_current_target() {
    let mut engine = engine();
    let monster = engine.spawn_monster(&MonsterSpec::new("Stubborn", 7, Position::default()).temperament(Temperament {
        tolerance: Tolerance::TARGET,
        ..Default::default()
    }));
    let p1 = spawn_player(&mut engine, "Asheron", 2.0, 0.0);
    let p2 = spawn_player(&mut engine, "Bael", 3.0, 0.0);

    engine.tick();
    let current = engine.target_of(monster).unwrap();
    let other = if current == p1 { p2 } else { p1 };
    engine.increase_threat(monster, other, 1000).unwrap();

    for _ in 0..20 {
        assert_eq!(engine.select_target(monster).unwrap(), Some(current));
    }
}

#[test]
fn test_teleporting_creatures_are_skipped() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 2.0, 0.0);
    engine.world_mut().get::<&mut Creature>(player).unwrap().teleporting = true;

    assert_eq!(engine.select_target(monster).unwrap(), None);
}

#[test]
fn test_threat_mode_prefers_high_threat() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let tank = spawn_player(&mut engine, "Tank", 8.0, 0.0);
    spawn_player(&mut engine, "Healer", 2.0, 0.0);

    // The healer sits below the aggro floor and is never picked.
    engine.increase_threat(monster, tank, 1000).unwrap();
    for _ in 0..50 {
        assert_eq!(engine.select_target(monster).unwrap(), Some(tank));
    }
}

#[test]
fn test_legacy_nearest_tactic() {
    let mut engine = engine_with(AwarenessConfig {
        targeting_mode: TargetingMode::Legacy,
        ..Default::default()
    });
    let monster = engine.spawn_monster(&MonsterSpec::new("Old", 7, Position::default()).temperament(Temperament {
        tactics: TacticFlags::NEAREST,
        ..Default::default()
    }));
    spawn_player(&mut engine, "Far", 8.0, 0.0);
    let near = spawn_player(&mut engine, "Near", 4.0, 0.0);

    for _ in 0..20 {
        assert_eq!(engine.select_target(monster).unwrap(), Some(near));
    }
}

#[test]
fn test_force_legacy_overrides_threat_mode() {
    let mut engine = engine();
    let monster = engine.spawn_monster(&MonsterSpec::new("Old", 7, Position::default()).temperament(Temperament {
        tactics: TacticFlags::WEAKEST,
        force_legacy: true,
        ..Default::default()
    }));
    let novice = engine.spawn_player(&PlayerSpec {
        level: 2,
        ..PlayerSpec::new("Novice", Position::new(9.0, 0.0, 0.0))
    });
    let veteran = engine.spawn_player(&PlayerSpec {
        level: 80,
        ..PlayerSpec::new("Veteran", Position::new(2.0, 0.0, 0.0))
    });
    engine.increase_threat(monster, veteran, 1000).unwrap();

    for _ in 0..20 {
        assert_eq!(engine.select_target(monster).unwrap(), Some(novice));
    }
}

#[test]
fn test_placeholder_keeps_no_threat() {
    let mut engine = engine();
    let monster = engine.spawn_monster(&MonsterSpec::new("Placeholder Wisp", 7, Position::default()));
    let player = spawn_player(&mut engine, "Asheron", 2.0, 0.0);

    assert_eq!(engine.increase_threat(monster, player, 50).unwrap(), 0);
    let snap = engine.tick();

    assert_eq!(engine.target_of(monster), Some(player));
    assert_eq!(engine.threat_of(monster, player), None);
    let view = snap.monsters.iter().find(|m| m.id == id_of(monster)).unwrap();
    assert!(view.threat.is_empty());
}

// ---- Evasion ----

#[test]
fn test_vanish_hides_player_until_effect_expires() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Rogue", 1.0, 0.0);
    engine.tick();
    assert_eq!(engine.target_of(monster), Some(player));

    engine.record_vanish(monster, player).unwrap();
    engine.set_vanish_active(player, true).unwrap();

    assert_eq!(engine.target_of(monster), None);
    assert_eq!(engine.threat_of(monster, player), None);
    assert_eq!(engine.select_target(monster).unwrap(), None);

    engine.set_vanish_active(player, false).unwrap();
    assert_eq!(engine.select_target(monster).unwrap(), Some(player));
    assert!(engine.world().get::<&Awareness>(monster).unwrap().fooled_by.is_empty());
}

#[test]
fn test_successful_deception_redirects_selection() {
    let mut engine = SimulationEngine::with_oracle(SimConfig::default(), FixedSkillCheck(4.0));
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let rogue = spawn_player(&mut engine, "Rogue", 2.0, 0.0);
    let fighter = spawn_player(&mut engine, "Fighter", 6.0, 0.0);
    engine.set_deceiving(rogue, true).unwrap();

    for _ in 0..20 {
        assert_eq!(engine.select_target(monster).unwrap(), Some(fighter));
    }

    let snap = engine.tick();
    assert!(snap.events.iter().any(|e| matches!(
        e,
        AwarenessEvent::ChatLine { recipient, text }
            if *recipient == id_of(rogue) && text.contains("successfully deceive")
    )));
}

#[test]
fn test_successful_deception_with_single_candidate_yields_none() {
    let mut engine = SimulationEngine::with_oracle(SimConfig::default(), FixedSkillCheck(4.0));
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let rogue = spawn_player(&mut engine, "Rogue", 2.0, 0.0);
    engine.set_deceiving(rogue, true).unwrap();

    for _ in 0..5 {
        assert_eq!(engine.select_target(monster).unwrap(), None);
    }

    let snap = engine.tick();
    assert_eq!(engine.state_of(monster), Some(EngagementState::Idle));
    assert!(snap.events.iter().any(|e| matches!(
        e,
        AwarenessEvent::ChatLine { recipient, text }
            if *recipient == id_of(rogue) && text.contains("successfully deceive")
    )));
}

#[test]
fn test_failed_deception_leaves_player_selectable() {
    let mut engine = SimulationEngine::with_oracle(SimConfig::default(), FixedSkillCheck(0.0));
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let rogue = spawn_player(&mut engine, "Rogue", 2.0, 0.0);
    spawn_player(&mut engine, "Fighter", 6.0, 0.0);
    engine.set_deceiving(rogue, true).unwrap();

    let picks: Vec<Entity> = (0..50)
        .filter_map(|_| engine.select_target(monster).unwrap())
        .collect();
    assert!(picks.contains(&rogue));

    let snap = engine.tick();
    assert!(snap.events.iter().any(|e| matches!(
        e,
        AwarenessEvent::ChatLine { recipient, text }
            if *recipient == id_of(rogue) && text.contains("sees through")
    )));
}

// ---- Threat bookkeeping ----

#[test]
fn test_provoke_through_engine() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let tank = engine.spawn_player(&PlayerSpec {
        threat: ThreatSource {
            stance: Stance::Provoke,
            power: 0.8,
            ..Default::default()
        },
        ..PlayerSpec::new("Tank", Position::new(30.0, 0.0, 0.0))
    });

    assert_eq!(engine.increase_threat(monster, tank, 10).unwrap(), 20);
    assert_eq!(engine.threat_of(monster, tank), Some(120));
}

#[test]
fn test_skip_and_double_commands() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 30.0, 0.0);
    let (m, p) = (id_of(monster), id_of(player));

    engine.queue_commands([
        SimCommand::SkipNextThreat { monster: m, attacker: p },
        SimCommand::Attack {
            monster: m,
            attacker: p,
            damage: 5,
            threat: 10,
        },
    ]);
    engine.tick();
    assert_eq!(engine.threat_of(monster, player), Some(100));

    engine.queue_commands([
        SimCommand::DoubleNextThreat { monster: m, attacker: p },
        SimCommand::Attack {
            monster: m,
            attacker: p,
            damage: 5,
            threat: 10,
        },
    ]);
    engine.tick();
    assert_eq!(engine.threat_of(monster, player), Some(120));
}

#[test]
fn test_threat_decays_to_baseline() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 1.0, 0.0);

    engine.increase_threat(monster, player, 500).unwrap();
    assert_eq!(engine.threat_of(monster, player), Some(600));

    run_ticks(&mut engine, 20);
    assert_eq!(engine.threat_of(monster, player), Some(100));
}

#[test]
fn test_idle_scan_without_target_clears_ledger() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Sniper", 200.0, 0.0);

    engine.increase_threat(monster, player, 50).unwrap();
    engine.tick();

    assert_eq!(engine.state_of(monster), Some(EngagementState::Idle));
    assert_eq!(engine.threat_of(monster, player), None);
}

#[test]
fn test_selection_on_idle_monster_leaves_ledger_empty() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 2.0, 0.0);

    assert_eq!(engine.select_target(monster).unwrap(), Some(player));
    assert_eq!(engine.state_of(monster), Some(EngagementState::Idle));
    assert_eq!(engine.threat_of(monster, player), None);

    engine.tick();
    assert_eq!(engine.state_of(monster), Some(EngagementState::Awake));
    assert_eq!(engine.select_target(monster).unwrap(), Some(player));
    assert_eq!(engine.threat_of(monster, player), Some(100));
}

#[test]
fn test_despawned_attacker_is_purged() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 1.0, 0.0);
    engine.tick();
    engine.increase_threat(monster, player, 50).unwrap();

    engine.world_mut().despawn(player).unwrap();
    engine.tick();

    assert_eq!(engine.threat_of(monster, player), None);
    assert_eq!(engine.target_of(monster), None);
}

#[test]
fn test_appraise_through_engine() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let tank = spawn_player(&mut engine, "Tank", 1.0, 0.0);
    let healer = spawn_player(&mut engine, "Healer", 2.0, 0.0);
    engine.increase_threat(monster, tank, 300).unwrap();
    engine.increase_threat(monster, healer, 10).unwrap();

    let appraisal = engine.appraise(monster).unwrap();
    assert_eq!(appraisal.len(), 2);
    assert!(appraisal.iter().any(|a| a.key == tank));
    assert!(appraisal.iter().any(|a| a.key == healer));
}

// ---- Setup and errors ----

#[test]
fn test_ranges_scale_with_level() {
    let mut engine = engine();
    let elder = engine.spawn_monster(&MonsterSpec {
        level: 100,
        ..MonsterSpec::new("Elder", 7, Position::default())
    });

    let awareness = engine.world().get::<&Awareness>(elder).unwrap();
    let expected = (18.0_f64 * 1.2).powi(2);
    assert!((awareness.visual_range_sq - expected).abs() < 1e-9);
}

#[test]
fn test_monster_spec_from_json() {
    let spec: MonsterSpec = serde_json::from_str(
        r#"{"name":"Drudge","creature_type":7,"level":10,"faction":1,
            "position":{"x":1.0,"y":2.0,"z":0.0}}"#,
    )
    .unwrap();
    assert_eq!(spec.level, 10);
    assert_eq!(spec.faction, Some(1));
    assert!(spec.home.is_none());

    let mut engine = engine();
    let monster = engine.spawn_monster(&spec);
    let home = engine.world().get::<&aggro_core::components::Home>(monster).unwrap().position;
    assert_eq!(home, Position::new(1.0, 2.0, 0.0));
}

#[test]
fn test_api_errors() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 1.0, 0.0);

    assert_eq!(
        engine.increase_threat(player, monster, 10),
        Err(SimError::NotAMonster(id_of(player)))
    );
    assert_eq!(
        engine.set_deceiving(monster, true),
        Err(SimError::NotAPlayer(id_of(monster)))
    );

    engine.world_mut().despawn(player).unwrap();
    assert_eq!(
        engine.increase_threat(monster, player, 10),
        Err(SimError::UnknownEntity(id_of(player)))
    );
}

#[test]
fn test_bad_command_is_rejected_without_panic() {
    let mut engine = engine();
    let monster = spawn_monster(&mut engine, 0.0, 0.0);
    engine.queue_command(SimCommand::Attack {
        monster: id_of(monster),
        attacker: EntityId(u64::MAX),
        damage: 1,
        threat: 1,
    });
    engine.tick();
    assert_eq!(engine.state_of(monster), Some(EngagementState::Idle));
}

#[test]
fn test_snapshot_lists_monsters_with_threat() {
    let mut engine = engine();
    let a = spawn_monster(&mut engine, 0.0, 0.0);
    let b = spawn_monster(&mut engine, 50.0, 0.0);
    let player = spawn_player(&mut engine, "Asheron", 1.0, 0.0);
    engine.increase_threat(a, player, 40).unwrap();

    let snap = engine.tick();
    let ids: Vec<EntityId> = snap.monsters.iter().map(|m| m.id).collect();
    let mut expected = vec![id_of(a), id_of(b)];
    expected.sort();
    assert_eq!(ids, expected);

    let view = snap.monsters.iter().find(|m| m.id == id_of(a)).unwrap();
    assert_eq!(view.state, EngagementState::Awake);
    assert_eq!(view.target, Some(id_of(player)));
    assert_eq!(view.threat[0].value, 140);
}
