//! Combat Systems API
//!
//! This module provides a stable API for the simulation systems. The headless
//! runner and tests import from here rather than directly from internal
//! modules, allowing internal refactoring without breaking consumers.
//!
//! ## System Phases
//!
//! Combat systems run in three ordered phases each frame:
//!
//! 1. **ResourcesAndStatus** - Log clock, mana regeneration, status decay
//! 2. **CombatAndMovement** - AI decisions, casting and keyframes, movement
//! 3. **CombatResolution** - Death handling, corpse cleanup, wave orchestration
//!
//! ## Usage
//!
//! ```ignore
//! use wavesim::sim::systems;
//!
//! systems::configure_combat_system_ordering(&mut app);
//! systems::add_core_combat_systems(&mut app, || true);
//! ```

use bevy::prelude::*;

// === Phase 1: Resources and Status ===
pub use crate::combat::log::track_combat_time;
pub use super::lifecycle::regenerate_mana;
pub use super::status::tick_status_effects;

// === Phase 2: Combat and Movement ===
pub use super::ai::drive_combat_ai;
pub use super::combat_core::process_casting;
pub use super::movement::apply_movement;

// === Phase 3: Combat Resolution ===
pub use super::lifecycle::{despawn_corpses, handle_deaths};

// === Components and Resources ===
pub use super::ai::CombatAi;
pub use super::casting::{CastController, CastPhase};
pub use super::components::{CombatActor, Faction, FactionMask, GameRng, StatBlock};
pub use super::lifecycle::Corpse;
pub use super::movement::Mover;
pub use super::status::StatusEffects;

/// System set labels for combat system ordering.
///
/// Use these to ensure proper ordering when adding custom systems that
/// interact with combat.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSystemPhase {
    /// Phase 1: Clock, regeneration, status decay
    ResourcesAndStatus,
    /// Phase 2: AI, casting, keyframe resolution, movement
    CombatAndMovement,
    /// Phase 3: Deaths, cleanup, waves
    CombatResolution,
}

/// Configures the ordering between combat system phases.
///
/// Call this once during app setup before adding combat systems.
pub fn configure_combat_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            CombatSystemPhase::ResourcesAndStatus,
            CombatSystemPhase::CombatAndMovement,
            CombatSystemPhase::CombatResolution,
        )
            .chain(),
    );
}

/// Adds core combat simulation systems to the app.
///
/// # Arguments
/// * `app` - The Bevy App to add systems to
/// * `run_condition` - A run condition gating the whole simulation
///
/// # Example
/// ```ignore
/// add_core_combat_systems(&mut app, || true);
/// ```
pub fn add_core_combat_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    // Phase 1: Resources and Status
    app.add_systems(
        Update,
        (track_combat_time, regenerate_mana, tick_status_effects)
            .chain()
            .in_set(CombatSystemPhase::ResourcesAndStatus)
            .run_if(run_condition.clone()),
    );

    // Phase 2: Combat and Movement
    app.add_systems(
        Update,
        (drive_combat_ai, process_casting, apply_movement)
            .chain()
            .in_set(CombatSystemPhase::CombatAndMovement)
            .run_if(run_condition.clone()),
    );

    // Phase 3: Combat Resolution
    app.add_systems(
        Update,
        (handle_deaths, despawn_corpses)
            .chain()
            .in_set(CombatSystemPhase::CombatResolution)
            .run_if(run_condition),
    );
}
