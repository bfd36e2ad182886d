//! Combat notifications and logging
//!
//! Registers everything the simulation publishes:
//! - Hit, dodge, cast and death events
//! - Animation cues (attack, hit, death)
//! - Wave lifecycle and reward notifications
//! - The combat log

use bevy::prelude::*;

pub mod events;
pub mod log;

use events::*;

use crate::sim::components::GameRng;

/// Plugin for combat events and shared combat resources
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Combat events
            .add_event::<HitLanded>()
            .add_event::<HitDodged>()
            .add_event::<CastStarted>()
            .add_event::<ActorDied>()
            .add_event::<AnimationCue>()
            // Wave events
            .add_event::<WaveStarted>()
            .add_event::<PrepTimerChanged>()
            .add_event::<WaveCompleted>()
            .add_event::<RewardsDropped>()
            .add_event::<AllWavesCleared>()
            .add_event::<EarlyStartRequested>()
            // Resources
            .init_resource::<log::CombatLog>()
            .init_resource::<GameRng>();
    }
}
