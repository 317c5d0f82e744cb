//! Steering and kinematic integration.
//!
//! Awake monsters close on their target, Returning monsters walk home.
//! Everyone else keeps whatever velocity the surrounding game gave it.

use hecs::{Entity, World};

use aggro_core::components::Home;
use aggro_core::constants::{DT, HOME_ARRIVAL_DISTANCE, MELEE_DISTANCE};
use aggro_core::enums::EngagementState;
use aggro_core::types::{Position, Velocity};

use crate::awareness::Awareness;
use crate::systems::spatial;

/// Point velocities of engaged and returning monsters at their goal.
pub fn steer(world: &mut World, speed: f64) {
    let goals: Vec<(Entity, Option<(Position, f64)>)> = world
        .query::<(&Awareness, &Position)>()
        .iter()
        .filter(|(_, (awareness, _))| awareness.state != EngagementState::Idle)
        .map(|(entity, (awareness, _))| {
            let goal = match awareness.state {
                EngagementState::Awake => awareness
                    .current_target
                    .and_then(|t| spatial::position_of(world, t))
                    .map(|p| (p, MELEE_DISTANCE)),
                EngagementState::Returning => world
                    .get::<&Home>(entity)
                    .ok()
                    .map(|h| (h.position, HOME_ARRIVAL_DISTANCE * 0.5)),
                EngagementState::Idle => None,
            };
            (entity, goal)
        })
        .collect();

    for (entity, goal) in goals {
        let Ok((pos, vel)) = world.query_one_mut::<(&Position, &mut Velocity)>(entity) else {
            continue;
        };
        *vel = match goal {
            Some((to, stop)) if pos.distance_to(&to) > stop => {
                let step = speed.min((pos.distance_to(&to) - stop) / DT);
                Velocity::toward(pos, &to, step)
            }
            _ => Velocity::default(),
        };
    }
}

/// position += velocity * dt for every moving entity.
pub fn run(world: &mut World) {
    for (_entity, (pos, vel)) in world.query_mut::<(&mut Position, &Velocity)>() {
        pos.x += vel.x * DT;
        pos.y += vel.y * DT;
        pos.z += vel.z * DT;
    }
}
