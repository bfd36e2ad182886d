//! Combat logging
//!
//! Records combat and wave events with timestamps for post-encounter analysis.

use std::path::Path;

use bevy::prelude::*;
use serde::Serialize;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize)]
pub struct CombatLogEntry {
    /// Timestamp in encounter time (seconds since start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Hit evaded
    Dodge,
    /// Cast started
    AbilityUsed,
    /// Status effect applied by a hit
    StatusApplied,
    /// Actor spawned
    Spawn,
    /// Actor died
    Death,
    /// Wave phase transition
    WaveEvent,
    /// Reward drop
    Reward,
    /// Encounter start/end
    EncounterEvent,
}

/// Summary of one actor written alongside the log.
#[derive(Debug, Clone, Serialize)]
pub struct ActorSummary {
    pub actor_id: String,
    pub faction: String,
    pub max_hp: f32,
    pub final_hp: f32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub survived: bool,
}

/// Encounter-level metadata written alongside the log.
#[derive(Debug, Clone, Serialize)]
pub struct EncounterMetadata {
    pub outcome: String,
    pub waves_cleared: u32,
    pub gold_earned: i64,
    pub duration_secs: f32,
    pub random_seed: Option<u64>,
    pub actors: Vec<ActorSummary>,
}

#[derive(Serialize)]
struct SavedLog<'a> {
    metadata: &'a EncounterMetadata,
    entries: &'a [CombatLogEntry],
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current encounter time
    pub match_time: f32,
}

impl CombatLog {
    /// Clear the log for a new encounter
    pub fn clear(&mut self) {
        self.entries.clear();
        self.match_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.match_time,
            event_type,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Write the log and metadata as pretty JSON.
    pub fn save_to_file(&self, metadata: &EncounterMetadata, path: &Path) -> std::io::Result<()> {
        let saved = SavedLog {
            metadata,
            entries: &self.entries,
        };
        let json = serde_json::to_string_pretty(&saved).map_err(std::io::Error::other)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
    }
}

/// Advance the log clock.
pub fn track_combat_time(time: Res<Time>, mut log: ResMut<CombatLog>) {
    log.match_time += time.delta_secs();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_take_current_timestamp() {
        let mut log = CombatLog::default();
        log.match_time = 2.5;
        log.log(CombatLogEventType::Damage, "hit".into());
        assert_eq!(log.entries[0].timestamp, 2.5);
    }

    #[test]
    fn test_filter_and_recent() {
        let mut log = CombatLog::default();
        log.log(CombatLogEventType::Damage, "a".into());
        log.log(CombatLogEventType::Death, "b".into());
        log.log(CombatLogEventType::Damage, "c".into());

        assert_eq!(log.filter_by_type(CombatLogEventType::Damage).len(), 2);
        let recent: Vec<&str> = log.recent(2).iter().map(|e| e.message.as_str()).collect();
        assert_eq!(recent, vec!["b", "c"]);

        log.clear();
        assert!(log.entries.is_empty());
        assert_eq!(log.match_time, 0.0);
    }

    #[test]
    fn test_save_to_file_writes_json() {
        let mut log = CombatLog::default();
        log.log(CombatLogEventType::WaveEvent, "Wave 0 started".into());
        let metadata = EncounterMetadata {
            outcome: "Victory".into(),
            waves_cleared: 1,
            gold_earned: 20,
            duration_secs: 12.0,
            random_seed: Some(7),
            actors: vec![],
        };
        let path = std::env::temp_dir().join(format!("wavesim_log_{}.json", std::process::id()));
        log.save_to_file(&metadata, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["metadata"]["outcome"], "Victory");
        assert_eq!(value["entries"][0]["event_type"], "WaveEvent");
        let _ = std::fs::remove_file(&path);
    }
}
