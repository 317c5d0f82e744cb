//! Entity spawn factories for setting up the simulation world.
//!
//! Creates monsters and players with the component bundles the awareness
//! systems expect. Spawn tables deserialize straight into `MonsterSpec` and
//! `PlayerSpec`.

use hecs::{Entity, EntityBuilder, World};
use serde::{Deserialize, Serialize};

use aggro_core::components::*;
use aggro_core::config::AwarenessConfig;
use aggro_core::enums::{CreatureKind, SkillTraining};
use aggro_core::types::{Position, Velocity};

use crate::awareness::{Awareness, DamageHistory, Ledger};

/// Everything needed to place one monster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterSpec {
    pub name: String,
    pub creature_type: u32,
    pub level: u32,
    pub faction: Option<u32>,
    pub foe_type: Option<u32>,
    pub perception: u32,
    pub position: Position,
    pub senses: Senses,
    pub temperament: Temperament,
    /// Spawn point; defaults to `position`.
    pub home: Option<Position>,
    pub patrol: Option<Vec<Position>>,
    pub death_loot: bool,
}

impl MonsterSpec {
    pub fn new(name: impl Into<String>, creature_type: u32, position: Position) -> Self {
        Self {
            name: name.into(),
            creature_type,
            level: 1,
            position,
            ..Default::default()
        }
    }

    pub fn faction(mut self, faction: u32) -> Self {
        self.faction = Some(faction);
        self
    }

    pub fn temperament(mut self, temperament: Temperament) -> Self {
        self.temperament = temperament;
        self
    }
}

/// A player (or pet) that monsters may target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpec {
    pub name: String,
    pub kind: CreatureKind,
    pub level: u32,
    pub position: Position,
    pub deception: u32,
    pub deception_training: SkillTraining,
    pub threat: ThreatSource,
}

impl Default for PlayerSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: CreatureKind::Player,
            level: 1,
            position: Position::default(),
            deception: 0,
            deception_training: SkillTraining::Untrained,
            threat: ThreatSource::default(),
        }
    }
}

impl PlayerSpec {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            ..Default::default()
        }
    }
}

pub fn monster_creature(spec: &MonsterSpec) -> Creature {
    Creature {
        name: spec.name.clone(),
        kind: CreatureKind::Monster,
        creature_type: spec.creature_type,
        level: spec.level,
        faction: spec.faction,
        foe_type: spec.foe_type,
        perception: spec.perception,
        attackable: true,
        ..Default::default()
    }
}

pub fn player_creature(spec: &PlayerSpec) -> Creature {
    Creature {
        name: spec.name.clone(),
        kind: spec.kind,
        level: spec.level,
        attackable: true,
        ..Default::default()
    }
}

/// Spawn a monster in Idle state with detection ranges scaled by its level.
pub fn spawn_monster(world: &mut World, config: &AwarenessConfig, spec: &MonsterSpec) -> Entity {
    let senses = spec.senses;
    let awareness = Awareness::new(
        config.scaled_range_sq(senses.visual_range, config.default_visual_range, spec.level),
        config.scaled_range_sq(senses.aural_range, config.default_aural_range, spec.level),
        config.scaled_range_sq(senses.chase_range, config.default_chase_range, spec.level),
    );

    let mut builder = EntityBuilder::new();
    builder.add_bundle((
        monster_creature(spec),
        spec.position,
        Velocity::default(),
        senses,
        spec.temperament,
        Home {
            position: spec.home.unwrap_or(spec.position),
        },
        awareness,
        Ledger::new(),
        DamageHistory::default(),
    ));
    if let Some(waypoints) = &spec.patrol {
        builder.add(PatrolRoute {
            waypoints: waypoints.clone(),
        });
    }
    if spec.death_loot {
        builder.add(DeathLoot);
    }
    world.spawn(builder.build())
}

/// Spawn a player or pet.
pub fn spawn_player(world: &mut World, spec: &PlayerSpec) -> Entity {
    world.spawn((
        player_creature(spec),
        spec.position,
        Velocity::default(),
        spec.threat.clone(),
        Stealth {
            deception: spec.deception,
            deception_training: spec.deception_training,
            ..Default::default()
        },
    ))
}
