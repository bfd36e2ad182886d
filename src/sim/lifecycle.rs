//! Actor lifecycle: mana regeneration, death handling and corpse cleanup.

use bevy::prelude::*;

use crate::combat::events::{ActorDied, AnimationCue, AnimationKind};
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::casting::CastController;
use super::components::CombatActor;
use super::constants::CORPSE_DURATION;
use super::movement::Mover;

/// Marks a dead actor waiting to be removed from the world.
#[derive(Component, Debug, Clone, Copy)]
pub struct Corpse {
    pub remaining: f32,
}

impl Default for Corpse {
    fn default() -> Self {
        Self {
            remaining: CORPSE_DURATION,
        }
    }
}

/// Restore mana for living actors at their regen rate.
pub fn regenerate_mana(time: Res<Time>, mut actors: Query<&mut CombatActor, Without<Corpse>>) {
    let dt = time.delta_secs();
    for mut actor in actors.iter_mut() {
        if actor.is_alive() && actor.mana_regen > 0.0 && actor.stats.mp < actor.stats.max_mp {
            let amount = actor.mana_regen * dt;
            actor.restore_mana(amount);
        }
    }
}

/// Handle actors whose health reached zero this frame: abandon their cast,
/// stop them, announce the death once and start the corpse timer.
#[allow(clippy::type_complexity)]
pub fn handle_deaths(
    mut commands: Commands,
    mut fallen: Query<
        (
            Entity,
            &CombatActor,
            Option<&mut CastController>,
            Option<&mut Mover>,
        ),
        Without<Corpse>,
    >,
    mut died: EventWriter<ActorDied>,
    mut cues: EventWriter<AnimationCue>,
    mut combat_log: ResMut<CombatLog>,
) {
    for (entity, actor, cast, mover) in fallen.iter_mut() {
        if actor.is_alive() {
            continue;
        }
        if let Some(mut cast) = cast {
            cast.interrupt();
        }
        if let Some(mut mover) = mover {
            mover.stop();
        }

        info!("{} has died", actor.actor_id);
        combat_log.log(
            CombatLogEventType::Death,
            format!("{} has died", actor.actor_id),
        );
        died.send(ActorDied {
            entity,
            actor_id: actor.actor_id.clone(),
            faction: actor.faction,
        });
        cues.send(AnimationCue {
            entity,
            kind: AnimationKind::Death,
        });
        commands.entity(entity).insert(Corpse::default());
    }
}

/// Remove corpses once their timer runs out.
pub fn despawn_corpses(time: Res<Time>, mut commands: Commands, mut corpses: Query<(Entity, &mut Corpse)>) {
    let dt = time.delta_secs();
    for (entity, mut corpse) in corpses.iter_mut() {
        corpse.remaining -= dt;
        if corpse.remaining <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}
