//! Command-line interface for WaveSim

use clap::Parser;
use std::path::PathBuf;

/// Headless wave-defense combat simulator
#[derive(Parser, Debug)]
#[command(name = "wavesim")]
#[command(about = "Headless wave-defense combat simulator")]
#[command(version)]
pub struct Args {
    /// JSON encounter file to run
    #[arg(long, value_name = "ENCOUNTER_FILE")]
    pub encounter: PathBuf,

    /// Output path for the combat log (overrides the encounter file)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum encounter duration in seconds (overrides the encounter file)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed for a reproducible run (overrides the encounter file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

pub fn parse_args() -> Args {
    Args::parse()
}
