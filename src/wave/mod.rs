//! Wave orchestration: prep, spawn, clear and reward cycles, plus the hero
//! roster spawned at encounter start.

use bevy::prelude::*;

pub mod orchestrator;
pub mod rewards;
pub mod spawn;
pub mod systems;

pub use orchestrator::{WaveContext, WaveDirector, WaveHost, WavePhase, WaveSignal};
pub use rewards::{generate_rewards, RewardLedger};
pub use spawn::{ActorBlueprint, SceneAnchors, SpawnPattern, WaveSite};
pub use systems::{EarlyStartPolicy, HeroPlacement, HeroRoster};

use crate::sim::systems::{despawn_corpses, CombatSystemPhase};

/// Wave director and hero roster systems.
///
/// Expects `CombatDataRegistry` to be inserted by the caller; the other
/// resources fall back to empty defaults.
pub struct WavePlugin;

impl Plugin for WavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WaveDirector>()
            .init_resource::<RewardLedger>()
            .init_resource::<EarlyStartPolicy>()
            .init_resource::<HeroRoster>()
            .init_resource::<SceneAnchors>()
            .init_resource::<crate::data::PrefabCatalog>()
            .add_systems(Startup, systems::spawn_heroes)
            .add_systems(
                Update,
                (systems::auto_early_start, systems::run_wave_director)
                    .chain()
                    .in_set(CombatSystemPhase::CombatResolution)
                    .after(despawn_corpses),
            );
    }
}
