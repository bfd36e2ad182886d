//! Actor prefab catalog.
//!
//! Maps a prefab path (as referenced by enemy, hero and wave rows) to the
//! locomotion and AI parameters of the actor it spawns. Loaded from
//! `Prefabs.ron` next to the data tables.

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sim::constants::{
    DEFAULT_ATTACK_RANGE, DEFAULT_KEYFRAME_OFFSET, DEFAULT_MOVE_SPEED, DEFAULT_SCAN_RADIUS,
    DEFAULT_STOPPING_DISTANCE,
};

use super::error::{DataError, Result};

/// File name of the catalog inside the data directory.
pub const PREFAB_FILE: &str = "Prefabs.ron";

/// Spawn template for one actor prefab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorTemplate {
    pub move_speed: f32,
    pub stopping_distance: f32,
    pub scan_radius: f32,
    pub attack_range: f32,
    /// Fraction of the cast lock at which damage lands
    pub keyframe_offset: f32,
    /// Mana restored per second
    pub mana_regen: f32,
}

impl Default for ActorTemplate {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            stopping_distance: DEFAULT_STOPPING_DISTANCE,
            scan_radius: DEFAULT_SCAN_RADIUS,
            attack_range: DEFAULT_ATTACK_RANGE,
            keyframe_offset: DEFAULT_KEYFRAME_OFFSET,
            mana_regen: 0.0,
        }
    }
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefabCatalog {
    prefabs: HashMap<String, ActorTemplate>,
}

impl PrefabCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefab(mut self, path: impl Into<String>, template: ActorTemplate) -> Self {
        self.insert(path, template);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, template: ActorTemplate) {
        self.prefabs.insert(path.into(), template);
    }

    /// Template for a prefab path; `None` when the path is empty or unknown.
    pub fn get(&self, path: &str) -> Option<&ActorTemplate> {
        self.prefabs.get(path.trim())
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }

    pub fn from_ron(text: &str) -> Result<Self> {
        let prefabs: HashMap<String, ActorTemplate> =
            ron::from_str(text).map_err(|e| DataError::Parse {
                table: PREFAB_FILE.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { prefabs })
    }

    /// Load `Prefabs.ron` from `dir`. A missing file yields an empty catalog.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(PREFAB_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No prefab catalog at {}, every spawn will be skipped", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(DataError::Io {
                    table: PREFAB_FILE.to_string(),
                    path,
                    source,
                })
            }
        };

        let catalog = Self::from_ron(&text)?;
        info!("Loaded {} prefabs from {}", catalog.len(), path.display());
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ron_with_defaults() {
        let catalog = PrefabCatalog::from_ron(
            r#"{
                "Enemies/Grunt": (move_speed: 2.0, attack_range: 1.5),
                "Heroes/Knight": (),
            }"#,
        )
        .unwrap();

        let grunt = catalog.get("Enemies/Grunt").unwrap();
        assert_eq!(grunt.move_speed, 2.0);
        assert_eq!(grunt.attack_range, 1.5);
        assert_eq!(grunt.scan_radius, DEFAULT_SCAN_RADIUS);
        assert_eq!(catalog.get("Heroes/Knight"), Some(&ActorTemplate::default()));
        assert!(catalog.get("").is_none());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let catalog = PrefabCatalog::load_from_dir(Path::new("/nonexistent/wavesim")).unwrap();
        assert!(catalog.is_empty());
    }
}
