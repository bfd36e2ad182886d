//! Movement
//!
//! Kinematic movement on the horizontal plane. The AI only issues orders
//! (`move_to`, `follow_target`, `stop`); `apply_movement` carries them out
//! each frame and turns actors to face their direction of travel.

use std::collections::HashMap;

use bevy::prelude::*;

use super::components::{rotation_towards, CombatActor};
use super::constants::{DEFAULT_MOVE_SPEED, DEFAULT_STOPPING_DISTANCE, RANGE_TOLERANCE};

/// Current movement order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MoveGoal {
    #[default]
    None,
    Point(Vec3),
    Follow { target: Entity, stop_distance: f32 },
}

/// Movement state for one actor.
#[derive(Component, Debug, Clone)]
pub struct Mover {
    pub move_speed: f32,
    /// Distance at which a `move_to` destination counts as reached
    pub stopping_distance: f32,
    goal: MoveGoal,
    velocity: Vec3,
}

impl Default for Mover {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_SPEED, DEFAULT_STOPPING_DISTANCE)
    }
}

impl Mover {
    pub fn new(move_speed: f32, stopping_distance: f32) -> Self {
        Self {
            move_speed,
            stopping_distance,
            goal: MoveGoal::None,
            velocity: Vec3::ZERO,
        }
    }

    pub fn move_to(&mut self, position: Vec3) {
        self.goal = MoveGoal::Point(position);
    }

    pub fn follow_target(&mut self, target: Entity, stop_distance: f32) {
        self.goal = MoveGoal::Follow {
            target,
            stop_distance,
        };
    }

    pub fn stop(&mut self) {
        self.goal = MoveGoal::None;
        self.velocity = Vec3::ZERO;
    }

    pub fn goal(&self) -> MoveGoal {
        self.goal
    }

    pub fn is_moving(&self) -> bool {
        self.velocity != Vec3::ZERO
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Move `position` toward the current goal for `dt` seconds.
    ///
    /// `resolve` maps a followed entity to its position; an unresolvable
    /// target cancels the order. Returns the new position.
    pub fn step(
        &mut self,
        position: Vec3,
        dt: f32,
        resolve: impl Fn(Entity) -> Option<Vec3>,
    ) -> Vec3 {
        let (destination, stop_distance) = match self.goal {
            MoveGoal::None => {
                self.velocity = Vec3::ZERO;
                return position;
            }
            MoveGoal::Point(point) => (point, self.stopping_distance),
            MoveGoal::Follow {
                target,
                stop_distance,
            } => match resolve(target) {
                Some(point) => (point, stop_distance),
                None => {
                    self.stop();
                    return position;
                }
            },
        };

        let offset = Vec3::new(destination.x - position.x, 0.0, destination.z - position.z);
        let distance = offset.length();
        if distance <= stop_distance + RANGE_TOLERANCE {
            self.velocity = Vec3::ZERO;
            if matches!(self.goal, MoveGoal::Point(_)) {
                self.goal = MoveGoal::None;
            }
            return position;
        }

        // Never overshoot the stop ring
        let travel = (self.move_speed * dt).min(distance - stop_distance).max(0.0);
        let direction = offset / distance;
        self.velocity = if dt > 0.0 {
            direction * (travel / dt)
        } else {
            Vec3::ZERO
        };
        position + direction * travel
    }
}

/// Carry out movement orders for every live actor.
pub fn apply_movement(time: Res<Time>, mut movers: Query<(Entity, &mut Mover, &mut Transform, &CombatActor)>) {
    let dt = time.delta_secs();

    // Follow targets resolve against positions at the start of the frame
    let positions: HashMap<Entity, Vec3> = movers
        .iter()
        .filter(|(_, _, _, actor)| actor.is_alive())
        .map(|(entity, _, transform, _)| (entity, transform.translation))
        .collect();

    for (_, mut mover, mut transform, actor) in movers.iter_mut() {
        if actor.is_dead() {
            if mover.goal() != MoveGoal::None {
                mover.stop();
            }
            continue;
        }
        let start = transform.translation;
        let next = mover.step(start, dt, |e| positions.get(&e).copied());
        if next != start {
            transform.translation = next;
            if let Some(rotation) = rotation_towards(next - start) {
                transform.rotation = rotation;
            }
        }
    }
}
