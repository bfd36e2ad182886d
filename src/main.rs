//! WaveSim - Headless Wave-Defense Combat Simulation
//!
//! Runs one encounter file to completion and prints the outcome.

use std::str::FromStr;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;

use wavesim::cli;
use wavesim::headless::{run_encounter, EncounterConfig};

fn main() {
    let args = cli::parse_args();

    let mut config = match EncounterConfig::load_from_file(&args.encounter) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load encounter {}: {}", args.encounter.display(), e);
            std::process::exit(1);
        }
    };

    // Command-line flags override the encounter file
    if let Some(output) = args.output {
        config.output_path = Some(output.to_string_lossy().into_owned());
    }
    if let Some(max_duration) = args.max_duration {
        config.max_duration_secs = max_duration;
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }

    let level = Level::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Unknown log level '{}', using info", args.log_level);
        Level::INFO
    });
    let log = LogPlugin {
        level,
        ..default()
    };

    match run_encounter(config, Some(log)) {
        Ok(result) => {
            println!(
                "{}: {} waves cleared, {} gold, {:.1}s",
                result.outcome, result.waves_cleared, result.gold_earned, result.elapsed_secs
            );
            for actor in &result.actors {
                println!(
                    "  [{}] {} hp {:.0}/{:.0} dealt {:.0} taken {:.0}{}",
                    actor.faction,
                    actor.actor_id,
                    actor.final_hp,
                    actor.max_hp,
                    actor.damage_dealt,
                    actor.damage_taken,
                    if actor.survived { "" } else { " (fell)" }
                );
            }
        }
        Err(e) => {
            eprintln!("Encounter failed: {}", e);
            std::process::exit(1);
        }
    }
}
