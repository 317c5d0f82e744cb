//! Spatial query facade over the ECS world.
//!
//! The real game answers these from its physics/landblock engine; here they
//! are brute-force scans, which is enough for the population a single region
//! holds.

use hecs::{Entity, World};

use aggro_core::components::Creature;
use aggro_core::types::Position;

pub fn position_of(world: &World, entity: Entity) -> Option<Position> {
    world.get::<&Position>(entity).ok().map(|p| *p)
}

pub fn squared_distance(world: &World, a: Entity, b: Entity) -> Option<f64> {
    let pa = position_of(world, a)?;
    let pb = position_of(world, b)?;
    Some(pa.distance_sq(&pb))
}

/// Every creature other than `origin` within `radius_sq` of it, ordered by
/// entity for deterministic iteration.
pub fn visible_creatures(world: &World, origin: Entity, radius_sq: f64) -> Vec<Entity> {
    let Some(center) = position_of(world, origin) else {
        return Vec::new();
    };

    let mut found: Vec<Entity> = world
        .query::<(&Creature, &Position)>()
        .iter()
        .filter(|(entity, (_, pos))| *entity != origin && center.distance_sq(pos) <= radius_sq)
        .map(|(entity, _)| entity)
        .collect();
    found.sort();
    found
}

/// Whether `entity` exists and is a living creature.
pub fn is_alive(world: &World, entity: Entity) -> bool {
    world
        .get::<&Creature>(entity)
        .map(|c| !c.dead)
        .unwrap_or(false)
}
