//! JSON configuration for headless encounters
//!
//! An encounter names its data directory, the scene anchors waves spawn
//! around, the hero roster and the run limits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wave::spawn::SceneAnchors;
use crate::wave::systems::{EarlyStartPolicy, HeroPlacement};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read encounter file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse encounter JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid encounter: {0}")]
    Invalid(String),
}

/// Headless encounter configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterConfig {
    /// Directory holding the RON data tables and `Prefabs.ron`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Wave index the director starts from (default: 1)
    #[serde(default = "default_start_wave")]
    pub start_wave: u32,
    /// Heroes spawned at encounter start
    #[serde(default)]
    pub heroes: Vec<HeroPlacement>,
    /// Named spawn-point groups referenced by wave rows
    #[serde(default)]
    pub spawn_groups: HashMap<String, Vec<[f32; 3]>>,
    /// Named single points (wave centers, hero gates)
    #[serde(default)]
    pub points: HashMap<String, [f32; 3]>,
    /// Maximum encounter duration in seconds (default: 600)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Whether waves skip their prep timer
    #[serde(default)]
    pub early_start: EarlyStartPolicy,
    /// Custom output path for the combat log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("assets/config")
}

fn default_start_wave() -> u32 {
    1
}

fn default_max_duration() -> f32 {
    600.0
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            start_wave: default_start_wave(),
            heroes: Vec::new(),
            spawn_groups: HashMap::new(),
            points: HashMap::new(),
            max_duration_secs: default_max_duration(),
            random_seed: None,
            early_start: EarlyStartPolicy::default(),
            output_path: None,
        }
    }
}

impl EncounterConfig {
    /// Load and validate configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EncounterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_duration_secs.is_finite() || self.max_duration_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "max_duration_secs must be positive".to_string(),
            ));
        }

        for placement in &self.heroes {
            match &placement.point {
                Some(name) if !self.points.contains_key(name) => {
                    return Err(ConfigError::Invalid(format!(
                        "hero {} references unknown point '{}'",
                        placement.hero_id, name
                    )));
                }
                None if placement.position.is_none() => {
                    return Err(ConfigError::Invalid(format!(
                        "hero {} needs a point or a position",
                        placement.hero_id
                    )));
                }
                _ => {}
            }
        }

        for (name, points) in &self.spawn_groups {
            if points.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "spawn group '{}' has no points",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Scene anchors for the wave director.
    pub fn anchors(&self) -> SceneAnchors {
        SceneAnchors {
            spawn_groups: self
                .spawn_groups
                .iter()
                .map(|(name, points)| {
                    (name.clone(), points.iter().copied().map(Vec3::from_array).collect())
                })
                .collect(),
            points: self
                .points
                .iter()
                .map(|(name, p)| (name.clone(), Vec3::from_array(*p)))
                .collect(),
        }
    }
}
