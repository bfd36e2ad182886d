//! Tests for the combat log produced by a full encounter
//!
//! These tests verify that the CombatLog:
//! - Records spawns, deaths, wave transitions and rewards in order
//! - Saves entries and encounter metadata as JSON

use std::collections::HashMap;

use wavesim::combat::log::CombatLogEventType;
use wavesim::data::{ActorTemplate, CombatDataRegistry, InMemorySource, PrefabCatalog};
use wavesim::headless::runner::EncounterState;
use wavesim::headless::{build_encounter_app, EncounterConfig};
use wavesim::wave::HeroPlacement;
use wavesim::CombatLog;

fn registry() -> CombatDataRegistry {
    CombatDataRegistry::new(
        InMemorySource::new()
            .with_table(
                "SkillData",
                r#"[
                    (id: 1, name: "Sweep", damage_type: "Physical", shape: "SelfAoe", base_value: 50.0,
                     cooldown: 0.5, pre_cast: 0.1, cast_lock: 0.2, post_cast: 0.1, radius: 20.0, max_targets: 5),
                    (id: 2, name: "Nibble", damage_type: "Physical", base_value: 1.0, cooldown: 1.0, radius: 20.0),
                ]"#,
            )
            .with_table(
                "HeroData",
                r#"[(id: 1, name: "Warden", stats: (base_hp: 500.0), base_skills: "1", prefab_path: "Test")]"#,
            )
            .with_table(
                "EnemyData",
                r#"[(id: 7, name: "Beetle", stats: (base_hp: 10.0), base_skills: 2, prefab_path: "Test")]"#,
            )
            .with_table(
                "WaveData",
                r#"[(id: 1, name: "Swarm", wave_index: 1, prep_time: 0.5, reward_table_id: "Pouch",
                     spawn_point_group_name: "Gate", center_point_name: "Center")]"#,
            )
            .with_table(
                "WaveEntryData",
                r#"[(id: 1, wave_id: 1, enemy_id: 7, count: 3, spawn_pattern: "circle")]"#,
            )
            .with_table(
                "WaveRewardData",
                r#"[(id: 1, reward_table_id: "Pouch", gold_min: 25, gold_max: 25, item_pool_id: "Trinkets")]"#,
            ),
    )
}

fn prefabs() -> PrefabCatalog {
    PrefabCatalog::new().with_prefab(
        "Test",
        ActorTemplate {
            scan_radius: 40.0,
            attack_range: 20.0,
            ..Default::default()
        },
    )
}

fn config(output_path: Option<String>) -> EncounterConfig {
    EncounterConfig {
        heroes: vec![HeroPlacement {
            hero_id: 1,
            point: Some("Center".into()),
            position: None,
        }],
        spawn_groups: HashMap::from([("Gate".to_string(), vec![[0.0, 0.0, 6.0]])]),
        points: HashMap::from([("Center".to_string(), [0.0, 0.0, 0.0])]),
        max_duration_secs: 60.0,
        random_seed: Some(99),
        output_path,
        ..Default::default()
    }
}

/// Run the encounter to completion and return its app's log.
fn run_and_collect_log(output_path: Option<String>) -> CombatLog {
    let mut app = build_encounter_app(config(output_path), registry(), prefabs());
    app.finish();
    app.cleanup();
    while !app.world().resource::<EncounterState>().is_complete() {
        app.update();
    }
    let log = app.world().resource::<CombatLog>();
    CombatLog {
        entries: log.entries.clone(),
        match_time: log.match_time,
    }
}

fn position_of(log: &CombatLog, needle: &str) -> usize {
    log.entries
        .iter()
        .position(|e| e.message.contains(needle))
        .unwrap_or_else(|| panic!("no log entry containing {:?}", needle))
}

#[test]
fn test_log_records_spawns_and_deaths() {
    let log = run_and_collect_log(None);

    // One hero plus three beetles
    assert_eq!(log.filter_by_type(CombatLogEventType::Spawn).len(), 4);
    assert_eq!(log.filter_by_type(CombatLogEventType::Death).len(), 3);
    assert!(!log.filter_by_type(CombatLogEventType::Damage).is_empty());
}

#[test]
fn test_log_orders_wave_lifecycle() {
    let log = run_and_collect_log(None);

    let started = position_of(&log, "Swarm");
    let first_death = log
        .entries
        .iter()
        .position(|e| e.event_type == CombatLogEventType::Death)
        .expect("a death entry");
    let reward = log
        .entries
        .iter()
        .position(|e| e.event_type == CombatLogEventType::Reward)
        .expect("a reward entry");

    assert!(started < first_death);
    assert!(first_death < reward);
    assert_eq!(
        log.entries.last().map(|e| e.event_type),
        Some(CombatLogEventType::EncounterEvent)
    );
}

#[test]
fn test_log_timestamps_never_decrease() {
    let log = run_and_collect_log(None);
    for pair in log.entries.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
    assert!(log.match_time > 0.0);
}

#[test]
fn test_log_saved_with_metadata() {
    let path = std::env::temp_dir().join(format!("wavesim_encounter_{}.json", std::process::id()));
    run_and_collect_log(Some(path.to_string_lossy().into_owned()));

    let written = std::fs::read_to_string(&path).expect("log file written");
    let value: serde_json::Value = serde_json::from_str(&written).expect("valid JSON");
    assert_eq!(value["metadata"]["outcome"], "Victory");
    assert_eq!(value["metadata"]["waves_cleared"], 1);
    assert_eq!(value["metadata"]["gold_earned"], 25);
    assert_eq!(value["metadata"]["random_seed"], 99);
    assert_eq!(value["metadata"]["actors"].as_array().map(|a| a.len()), Some(4));
    assert!(value["entries"].as_array().is_some_and(|e| !e.is_empty()));
    let _ = std::fs::remove_file(&path);
}
