//! WaveSim - Headless Wave-Defense Combat Simulation
//!
//! A real-time action-RPG combat kernel: data-driven abilities, cast timing
//! with keyframe-triggered effects, elemental damage resolution, per-actor AI
//! and a wave orchestrator, all running on Bevy ECS without rendering.
//!
//! This library exposes the core modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod data;
pub mod headless;
pub mod sim;
pub mod wave;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use data::CombatDataRegistry;
pub use headless::{run_encounter, EncounterConfig, EncounterOutcome, EncounterResult};
