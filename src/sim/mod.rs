//! Combat Simulation Core
//!
//! Real-time combat kernel: damage resolution, target selection, ability
//! execution, cast timing, status effects and the per-actor AI loop.
//!
//! ## Data Flow
//!
//! ```text
//! CombatAi (decide) -> CastController (advance) -> keyframe
//!     -> execute_ability -> select_targets / raycast -> HitResolver
//!     -> StatBlock + StatusEffects
//! ```
//!
//! The pure pieces (`StatBlock`, `StatusEffects`, `CastController`,
//! `CombatAi`, `CombatWorld`, `DamageResolver`) are advanced by plain method
//! calls and tested directly; the Bevy systems in `systems` only move data
//! between components and those pieces.

pub mod ability;
pub mod ai;
pub mod casting;
pub mod combat_core;
pub mod components;
pub mod constants;
pub mod damage;
pub mod execution;
pub mod lifecycle;
pub mod movement;
pub mod status;
pub mod systems;
pub mod targeting;

pub use ability::{AbilityConfig, AbilityShape, DamagePacket, DamageType, Element};
pub use ai::{AiDecision, CombatAi};
pub use casting::{CastController, CastPhase, CastSignal};
pub use components::{CombatActor, Faction, FactionMask, GameRng, ResistanceProfile, RollSource, StatBlock};
pub use damage::{DamageResolver, HitOutcome, HitResolver};
pub use execution::{execute_ability, AbilityContext, HitRecord, HitResult};
pub use movement::Mover;
pub use status::{StatusController, StatusEffects};
pub use targeting::{select_targets, ActorState, CombatWorld, SpatialQuery};
