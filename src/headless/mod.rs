//! Headless mode for automated encounter runs
//!
//! This module runs wave encounters without any graphical output, suitable
//! for automated testing and balance sweeps.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless encounter
//! cargo run --release -- --encounter assets/encounters/training_grounds.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "data_dir": "assets/config",
//!   "heroes": [{"hero_id": 1, "point": "HeroGate"}],
//!   "spawn_groups": {"NorthSpawns": [[0.0, 0.0, 12.0], [6.0, 0.0, 12.0]]},
//!   "points": {"ArenaCenter": [0.0, 0.0, 0.0], "HeroGate": [0.0, 0.0, -2.0]},
//!   "max_duration_secs": 300,
//!   "random_seed": 42
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{ConfigError, EncounterConfig};
pub use runner::{
    build_encounter_app, drive_encounter, run_encounter, EncounterOutcome, EncounterResult,
    HeadlessError,
};
