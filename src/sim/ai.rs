//! AI Controller
//!
//! Per-frame decision loop for every actor:
//!
//! 1. Decay ability cooldowns (floored at zero)
//! 2. Dead or casting actors take no action
//! 3. Scan for the nearest live opponent within `scan_radius`
//! 4. Approach until within `attack_range`, then stop and face the target
//! 5. Cast the first ability, in configured order, that is off cooldown and
//!    affordable
//!
//! The cooldown is set when the cast finishes (see `process_casting`).

use std::collections::HashMap;

use bevy::prelude::*;

use crate::combat::events::{AnimationCue, AnimationKind, CastStarted};
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::ability::AbilityConfig;
use super::casting::CastController;
use super::components::{horizontal_distance, rotation_towards, CombatActor, FactionMask};
use super::constants::{DEFAULT_ATTACK_RANGE, DEFAULT_SCAN_RADIUS, RANGE_TOLERANCE};
use super::movement::Mover;
use super::targeting::{ActorState, CombatWorld, SpatialQuery};

/// What the AI wants to do this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiDecision {
    /// No target in range; stand still
    Hold,
    /// Close the distance to `target`
    Approach { target: Entity },
    /// In range but nothing is ready
    Wait { target: Entity, target_position: Vec3 },
    /// Cast `abilities[ability]` at `target`
    Cast {
        target: Entity,
        target_position: Vec3,
        ability: usize,
    },
}

/// Decision state and ability loadout for one actor.
#[derive(Component, Debug, Clone)]
pub struct CombatAi {
    /// Abilities in priority order
    pub abilities: Vec<AbilityConfig>,
    pub scan_radius: f32,
    pub attack_range: f32,
    pub target_mask: FactionMask,
    /// Most recently chosen target
    pub current_target: Option<Entity>,
    cooldowns: HashMap<String, f32>,
}

impl CombatAi {
    pub fn new(abilities: Vec<AbilityConfig>, target_mask: FactionMask) -> Self {
        Self {
            abilities,
            scan_radius: DEFAULT_SCAN_RADIUS,
            attack_range: DEFAULT_ATTACK_RANGE,
            target_mask,
            current_target: None,
            cooldowns: HashMap::new(),
        }
    }

    pub fn with_ranges(mut self, scan_radius: f32, attack_range: f32) -> Self {
        self.scan_radius = scan_radius;
        self.attack_range = attack_range;
        self
    }

    /// Tick every cooldown down by `dt`, never below zero.
    pub fn decay_cooldowns(&mut self, dt: f32) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = (*remaining - dt).max(0.0);
        }
    }

    pub fn cooldown_remaining(&self, ability_id: &str) -> f32 {
        self.cooldowns.get(ability_id).copied().unwrap_or(0.0)
    }

    /// Abilities without an id never go on cooldown.
    pub fn is_on_cooldown(&self, ability_id: &str) -> bool {
        !ability_id.is_empty() && self.cooldown_remaining(ability_id) > 0.0
    }

    pub fn set_cooldown(&mut self, ability: &AbilityConfig) {
        if ability.id.is_empty() {
            return;
        }
        self.cooldowns.insert(ability.id.clone(), ability.cooldown.max(0.0));
    }

    /// Index of the first ability that is off cooldown and costs at most `mp`.
    pub fn pick_ready_ability(&self, mp: f32) -> Option<usize> {
        self.abilities
            .iter()
            .position(|a| !self.is_on_cooldown(&a.id) && a.mana_cost <= mp)
    }

    /// Choose this frame's action for `me`.
    pub fn decide(&self, me: &ActorState, world: &CombatWorld) -> AiDecision {
        let Some(target) = find_nearest_target(world, me.entity, me.position, self.scan_radius, self.target_mask)
        else {
            return AiDecision::Hold;
        };
        let Some(target_position) = world.get(target).map(|t| t.position) else {
            return AiDecision::Hold;
        };

        // Measured on the ground plane, like movement
        if horizontal_distance(me.position, target_position) > self.attack_range + RANGE_TOLERANCE {
            return AiDecision::Approach { target };
        }

        match self.pick_ready_ability(me.stats.mp) {
            Some(ability) => AiDecision::Cast {
                target,
                target_position,
                ability,
            },
            None => AiDecision::Wait {
                target,
                target_position,
            },
        }
    }
}

/// Nearest live actor other than `me` within `radius`. Ties keep query order.
pub fn find_nearest_target(
    world: &CombatWorld,
    me: Entity,
    position: Vec3,
    radius: f32,
    mask: FactionMask,
) -> Option<Entity> {
    let mut best: Option<(f32, Entity)> = None;
    for entity in world.overlap_sphere(position, radius, mask) {
        if entity == me {
            continue;
        }
        let Some(candidate) = world.get(entity) else {
            continue;
        };
        if candidate.is_dead() {
            continue;
        }
        let distance = candidate.position.distance_squared(position);
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, entity));
        }
    }
    best.map(|(_, e)| e)
}

/// Run the decision loop for every AI-driven actor.
#[allow(clippy::type_complexity)]
pub fn drive_combat_ai(
    time: Res<Time>,
    mut actors: ParamSet<(
        Query<(Entity, &CombatActor, &Transform)>,
        Query<(
            Entity,
            &mut CombatActor,
            &mut CombatAi,
            &mut CastController,
            &mut Mover,
            &mut Transform,
        )>,
    )>,
    mut cast_started: EventWriter<CastStarted>,
    mut cues: EventWriter<AnimationCue>,
    mut combat_log: ResMut<CombatLog>,
) {
    let dt = time.delta_secs();

    let world: CombatWorld = actors
        .p0()
        .iter()
        .map(|(entity, actor, transform)| ActorState::capture(entity, actor, transform, None))
        .collect();

    for (entity, mut actor, mut ai, mut cast, mut mover, mut transform) in actors.p1().iter_mut() {
        ai.decay_cooldowns(dt);

        if actor.is_dead() || cast.is_casting() {
            continue;
        }
        let Some(me) = world.get(entity) else {
            continue;
        };

        match ai.decide(me, &world) {
            AiDecision::Hold => {
                ai.current_target = None;
                mover.stop();
            }
            AiDecision::Approach { target } => {
                ai.current_target = Some(target);
                let range = ai.attack_range;
                mover.follow_target(target, range);
            }
            AiDecision::Wait {
                target,
                target_position,
            } => {
                ai.current_target = Some(target);
                mover.stop();
                face(&mut transform, target_position);
            }
            AiDecision::Cast {
                target,
                target_position,
                ability,
            } => {
                ai.current_target = Some(target);
                mover.stop();
                face(&mut transform, target_position);

                let Some(ability) = ai.abilities.get(ability).cloned() else {
                    continue;
                };
                if !actor.consume_mana(ability.mana_cost) {
                    continue;
                }
                let attack_speed = actor.stats.attack_speed;
                if cast.start_cast(&ability, attack_speed, Some(target), target_position) {
                    cues.send(AnimationCue {
                        entity,
                        kind: AnimationKind::Attack,
                    });
                    cast_started.send(CastStarted {
                        caster: entity,
                        ability_id: ability.id.clone(),
                        target: Some(target),
                    });
                    combat_log.log(
                        CombatLogEventType::AbilityUsed,
                        format!("{} begins casting {}", actor.actor_id, ability.name),
                    );
                }
            }
        }
    }
}

fn face(transform: &mut Transform, point: Vec3) {
    if let Some(rotation) = rotation_towards(point - transform.translation) {
        transform.rotation = rotation;
    }
}
