//! Awareness data model: per-monster engagement state, threat ledger and
//! damage history.
//!
//! These components hold non-owning `hecs::Entity` handles, resolved against
//! the world on every use, so they live next to the ECS rather than in the
//! vocabulary crate.

use std::collections::{BTreeMap, BTreeSet};

use hecs::Entity;

use aggro_core::enums::{CombatPosture, EngagementState};
use aggro_core::types::EntityId;
use aggro_threat::ThreatLedger;

/// Threat ledger keyed by attacker entity.
pub type Ledger = ThreatLedger<Entity>;

/// Engagement state of one monster.
#[derive(Debug, Clone)]
pub struct Awareness {
    pub state: EngagementState,
    pub current_target: Option<Entity>,
    pub posture: CombatPosture,
    /// Time (secs) of the last Idle -> Awake transition.
    pub engaged_at: Option<f64>,
    /// Earliest time (secs) the next target selection may run.
    pub next_target_check: f64,
    pub visual_range_sq: f64,
    pub aural_range_sq: f64,
    pub chase_range_sq: f64,
    /// Entities this monster holds a grudge against.
    pub retaliate: Vec<Entity>,
    /// Target -> time (secs) allies were last alerted against it.
    pub alerted_recently: BTreeMap<Entity, f64>,
    /// Players whose vanish fooled this monster.
    pub fooled_by: BTreeSet<Entity>,
}

impl Awareness {
    pub fn new(visual_range_sq: f64, aural_range_sq: f64, chase_range_sq: f64) -> Self {
        Self {
            state: EngagementState::Idle,
            current_target: None,
            posture: CombatPosture::Peace,
            engaged_at: None,
            next_target_check: 0.0,
            visual_range_sq,
            aural_range_sq,
            chase_range_sq,
            retaliate: Vec::new(),
            alerted_recently: BTreeMap::new(),
            fooled_by: BTreeSet::new(),
        }
    }

    pub fn is_retaliate_target(&self, entity: Entity) -> bool {
        self.retaliate.contains(&entity)
    }

    pub fn add_retaliate_target(&mut self, entity: Entity) {
        if !self.retaliate.contains(&entity) {
            self.retaliate.push(entity);
        }
    }
}

/// Damage dealt to a monster, per attacker.
#[derive(Debug, Clone, Default)]
pub struct DamageHistory {
    last: Option<Entity>,
    totals: BTreeMap<Entity, u64>,
}

impl DamageHistory {
    pub fn record(&mut self, attacker: Entity, amount: u32) {
        self.last = Some(attacker);
        *self.totals.entry(attacker).or_insert(0) += amount as u64;
    }

    pub fn last_damager(&self) -> Option<Entity> {
        self.last
    }

    /// Attacker with the highest total; ties go to the lowest entity.
    pub fn top_damager(&self) -> Option<Entity> {
        self.totals
            .iter()
            .fold(None, |best: Option<(Entity, u64)>, (e, total)| match best {
                Some((_, top)) if top >= *total => best,
                _ => Some((*e, *total)),
            })
            .map(|(e, _)| e)
    }

    /// Keep only attackers for which `keep` holds.
    pub fn retain(&mut self, mut keep: impl FnMut(Entity) -> bool) {
        self.totals.retain(|e, _| keep(*e));
        if self.last.is_some_and(|e| !self.totals.contains_key(&e)) {
            self.last = None;
        }
    }

    pub fn clear(&mut self) {
        self.last = None;
        self.totals.clear();
    }
}

/// Stable id of an entity for events and snapshots.
pub fn id_of(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

/// Resolve a stable id back to an entity handle.
pub fn entity_of(id: EntityId) -> Option<Entity> {
    Entity::from_bits(id.0)
}
