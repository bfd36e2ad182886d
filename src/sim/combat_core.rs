//! Core combat loop: cast advancement and keyframe resolution.
//!
//! Casts advance first. Keyframes crossed this frame are resolved against a
//! snapshot of every actor, and the mutated stats, statuses and positions are
//! written back to the components afterwards. Finished casts put their
//! ability on cooldown.

use bevy::prelude::*;

use crate::combat::events::{AnimationCue, AnimationKind, HitDodged, HitLanded};
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::ability::{AbilityConfig, Element};
use super::ai::CombatAi;
use super::casting::{CastController, CastIntent, CastSignal};
use super::components::{CombatActor, FactionMask, GameRng};
use super::damage::DamageResolver;
use super::execution::{execute_ability, AbilityContext, HitRecord, HitResult};
use super::lifecycle::Corpse;
use super::status::StatusEffects;
use super::targeting::{ActorState, CombatWorld};

struct PendingKeyframe {
    caster: Entity,
    intent: CastIntent,
    mask: FactionMask,
}

/// Advance every cast, set cooldowns for finished casts and resolve keyframes.
#[allow(clippy::type_complexity)]
pub fn process_casting(
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    mut actors: Query<
        (
            Entity,
            &mut CombatActor,
            &mut StatusEffects,
            &mut Transform,
            Option<&mut CastController>,
            Option<&mut CombatAi>,
        ),
        Without<Corpse>,
    >,
    mut landed: EventWriter<HitLanded>,
    mut dodged: EventWriter<HitDodged>,
    mut cues: EventWriter<AnimationCue>,
    mut combat_log: ResMut<CombatLog>,
) {
    let dt = time.delta_secs();

    let mut pending: Vec<PendingKeyframe> = Vec::new();
    for (entity, actor, _, _, cast, mut ai) in actors.iter_mut() {
        let Some(mut cast) = cast else {
            continue;
        };
        if !cast.is_casting() {
            continue;
        }
        let mask = ai
            .as_ref()
            .map_or(actor.faction.opponents(), |ai| ai.target_mask);

        for signal in cast.advance(dt) {
            match signal {
                CastSignal::Keyframe(intent) => pending.push(PendingKeyframe {
                    caster: entity,
                    intent,
                    mask,
                }),
                CastSignal::Finished(intent) => {
                    if let Some(ai) = ai.as_mut() {
                        ai.set_cooldown(&intent.ability);
                    }
                }
            }
        }
    }

    if pending.is_empty() {
        return;
    }

    let mut world: CombatWorld = actors
        .iter()
        .map(|(entity, actor, status, transform, _, _)| {
            ActorState::capture(entity, actor, transform, Some(status))
        })
        .collect();

    let mut resolver = DamageResolver::new(&mut *rng);
    let mut resolved: Vec<(HitRecord, &AbilityConfig)> = Vec::new();
    for keyframe in &pending {
        let Some(caster) = world.get(keyframe.caster) else {
            continue;
        };
        if caster.is_dead() {
            continue;
        }
        // Aim at the target's current position, or where it was last seen
        let aim_point = keyframe
            .intent
            .target
            .and_then(|t| world.get(t))
            .map_or(keyframe.intent.aim_point, |t| t.position);
        let ctx = AbilityContext {
            caster: keyframe.caster,
            aim_point,
            aim_direction: (aim_point - caster.position).normalize_or_zero(),
            mask: keyframe.mask,
        };

        let ability = &keyframe.intent.ability;
        for record in execute_ability(&mut world, &mut resolver, ability, &ctx) {
            resolved.push((record, ability));
        }
    }

    for (entity, mut actor, mut status, mut transform, _, _) in actors.iter_mut() {
        let Some(state) = world.get(entity) else {
            continue;
        };
        actor.stats = state.stats;
        actor.damage_dealt = state.damage_dealt;
        actor.damage_taken = state.damage_taken;
        if *status != state.status {
            *status = state.status;
        }
        if transform.translation != state.position {
            transform.translation = state.position;
        }
    }

    for (record, ability) in resolved {
        let attacker = actor_name(&actors, record.attacker);
        let target = actor_name(&actors, record.target);
        match record.result {
            HitResult::Dodged => {
                combat_log.log(
                    CombatLogEventType::Dodge,
                    format!("{} dodges {}'s {}", target, attacker, ability.name),
                );
                dodged.send(HitDodged {
                    attacker: record.attacker,
                    target: record.target,
                    ability_id: ability.id.clone(),
                });
            }
            HitResult::Landed(outcome) => {
                debug!(
                    "{} hits {} with {} for {:.1}{}",
                    attacker,
                    target,
                    ability.id,
                    outcome.damage,
                    if outcome.critical { " (crit)" } else { "" }
                );
                combat_log.log(
                    CombatLogEventType::Damage,
                    format!(
                        "{}'s {} hits {} for {:.0}{}",
                        attacker,
                        ability.name,
                        target,
                        outcome.damage,
                        if outcome.critical { " (critical)" } else { "" }
                    ),
                );
                if let Some(effect) = status_label(ability) {
                    combat_log.log(
                        CombatLogEventType::StatusApplied,
                        format!("{} is {}", target, effect),
                    );
                }
                cues.send(AnimationCue {
                    entity: record.target,
                    kind: AnimationKind::Hit,
                });
                landed.send(HitLanded {
                    attacker: record.attacker,
                    target: record.target,
                    ability_id: ability.id.clone(),
                    damage: outcome.damage,
                    critical: outcome.critical,
                    killing_blow: outcome.killing_blow,
                });
            }
        }
    }
}

#[allow(clippy::type_complexity)]
fn actor_name(
    actors: &Query<
        (
            Entity,
            &mut CombatActor,
            &mut StatusEffects,
            &mut Transform,
            Option<&mut CastController>,
            Option<&mut CombatAi>,
        ),
        Without<Corpse>,
    >,
    entity: Entity,
) -> String {
    actors
        .get(entity)
        .map(|(_, actor, ..)| actor.actor_id.clone())
        .unwrap_or_else(|_| format!("{entity:?}"))
}

/// Status rider a landed hit of `ability` applies, for the log.
fn status_label(ability: &AbilityConfig) -> Option<&'static str> {
    match ability.element {
        Element::Ice if ability.slow_amount > 0.0 => Some("slowed"),
        Element::Fire if ability.ignite_bonus > 0.0 => Some("ignited"),
        Element::Poison => Some("corroded"),
        Element::Lightning => Some("chain-marked"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label_matches_side_effects() {
        let mut ability = AbilityConfig {
            element: Element::Ice,
            ..Default::default()
        };
        assert_eq!(status_label(&ability), None);
        ability.slow_amount = 1.0;
        assert_eq!(status_label(&ability), Some("slowed"));
        ability.element = Element::Poison;
        assert_eq!(status_label(&ability), Some("corroded"));
        ability.element = Element::None;
        assert_eq!(status_label(&ability), None);
    }
}
