//! Headless encounter execution
//!
//! Runs wave encounters without any graphical output at a fixed 60 Hz tick,
//! suitable for automated testing and balance runs.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use thiserror::Error;

use crate::combat::log::{ActorSummary, CombatLog, CombatLogEventType, EncounterMetadata};
use crate::combat::CombatPlugin;
use crate::data::error::DataError;
use crate::data::prefabs::PrefabCatalog;
use crate::data::registry::CombatDataRegistry;
use crate::data::source::RonDirectory;
// Use the stable systems API instead of importing internal functions directly
use crate::sim::systems::{self, CombatActor, CombatSystemPhase, Faction, GameRng};
use crate::wave::rewards::RewardLedger;
use crate::wave::systems::{spawn_heroes, HeroRoster};
use crate::wave::{WaveDirector, WavePlugin};

use super::config::{ConfigError, EncounterConfig};

/// Fixed simulation step.
pub const TICK_SECS: f64 = 1.0 / 60.0;

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EncounterOutcome {
    /// Every configured wave was cleared
    Victory,
    /// No hero left alive
    Defeat,
    /// The maximum duration elapsed first
    Timeout,
}

/// Result of a completed headless encounter
///
/// This struct provides programmatic access to encounter results for testing and analysis.
#[derive(Debug, Clone)]
pub struct EncounterResult {
    pub outcome: EncounterOutcome,
    pub waves_cleared: u32,
    pub gold_earned: i64,
    /// Simulated seconds from start to the deciding tick
    pub elapsed_secs: f32,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    /// Every actor seen during the encounter, in spawn order
    pub actors: Vec<ActorSummary>,
}

impl EncounterResult {
    pub fn heroes(&self) -> impl Iterator<Item = &ActorSummary> {
        self.actors.iter().filter(|a| a.faction == Faction::Hero.to_string())
    }

    pub fn enemies(&self) -> impl Iterator<Item = &ActorSummary> {
        self.actors.iter().filter(|a| a.faction == Faction::Enemy.to_string())
    }
}

/// Resource to track headless encounter state
#[derive(Resource)]
pub struct EncounterState {
    /// Maximum encounter duration before declaring a timeout
    pub max_duration: f32,
    /// Elapsed encounter time
    pub elapsed_time: f32,
    /// Custom output path for the combat log
    pub output_path: Option<String>,
    /// Random seed for deterministic simulation (if provided)
    pub random_seed: Option<u64>,
    /// Whether a hero roster was configured; without one there is no defeat
    pub expects_heroes: bool,
    /// Result (populated when the encounter completes)
    pub result: Option<EncounterResult>,
    summaries: HashMap<Entity, ActorSummary>,
    spawn_order: Vec<Entity>,
}

impl EncounterState {
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    fn record(&mut self, entity: Entity, actor: &CombatActor) {
        let summary = ActorSummary {
            actor_id: actor.actor_id.clone(),
            faction: actor.faction.to_string(),
            max_hp: actor.stats.max_hp,
            final_hp: actor.stats.hp,
            damage_dealt: actor.damage_dealt,
            damage_taken: actor.damage_taken,
            survived: actor.is_alive(),
        };
        if self.summaries.insert(entity, summary).is_none() {
            self.spawn_order.push(entity);
        }
    }

    fn ordered_summaries(&self) -> Vec<ActorSummary> {
        self.spawn_order
            .iter()
            .filter_map(|e| self.summaries.get(e).cloned())
            .collect()
    }
}

/// Plugin for headless encounter execution
pub struct HeadlessPlugin {
    pub config: EncounterConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let rng = match self.config.random_seed {
            Some(seed) => {
                info!("Using deterministic RNG with seed: {}", seed);
                GameRng::from_seed(seed)
            }
            None => {
                info!("Using non-deterministic RNG (no seed provided)");
                GameRng::from_entropy()
            }
        };

        app.insert_resource(rng)
            .insert_resource(EncounterState {
                max_duration: self.config.max_duration_secs,
                elapsed_time: 0.0,
                output_path: self.config.output_path.clone(),
                random_seed: self.config.random_seed,
                expects_heroes: !self.config.heroes.is_empty(),
                result: None,
                summaries: HashMap::new(),
                spawn_order: Vec::new(),
            })
            .insert_resource(WaveDirector::new(self.config.start_wave))
            .insert_resource(HeroRoster(self.config.heroes.clone()))
            .insert_resource(self.config.anchors())
            .insert_resource(self.config.early_start);

        // Configure combat system phase ordering
        systems::configure_combat_system_ordering(app);

        // Add core combat systems using the shared API; they stop once the outcome is decided
        systems::add_core_combat_systems(app, encounter_running);

        app.add_systems(Startup, announce_encounter.before(spawn_heroes))
            .add_systems(
                Update,
                (track_encounter, check_encounter_end)
                    .chain()
                    .after(CombatSystemPhase::CombatResolution)
                    .run_if(encounter_running),
            );
    }
}

fn encounter_running(state: Res<EncounterState>) -> bool {
    !state.is_complete()
}

fn announce_encounter(mut combat_log: ResMut<CombatLog>, director: Res<WaveDirector>) {
    combat_log.clear();
    combat_log.log(
        CombatLogEventType::EncounterEvent,
        format!("Encounter started at wave {} (headless mode)", director.current_wave_index()),
    );
}

/// Advance the encounter clock and refresh actor summaries.
fn track_encounter(
    time: Res<Time>,
    mut state: ResMut<EncounterState>,
    actors: Query<(Entity, &CombatActor)>,
) {
    state.elapsed_time += time.delta_secs();
    for (entity, actor) in actors.iter() {
        state.record(entity, actor);
    }
}

/// Decide victory, defeat or timeout.
fn check_encounter_end(
    actors: Query<&CombatActor>,
    director: Res<WaveDirector>,
    ledger: Res<RewardLedger>,
    combat_log: ResMut<CombatLog>,
    mut state: ResMut<EncounterState>,
) {
    let heroes_alive = actors
        .iter()
        .any(|a| a.faction == Faction::Hero && a.is_alive());

    let outcome = if director.is_finished() {
        info!("All waves cleared after {:.1}s - VICTORY", state.elapsed_time);
        EncounterOutcome::Victory
    } else if state.expects_heroes && !heroes_alive {
        info!(
            "All heroes fell during wave {} - DEFEAT",
            director.current_wave_index()
        );
        EncounterOutcome::Defeat
    } else if state.elapsed_time >= state.max_duration {
        info!("Encounter timed out after {:.1}s", state.elapsed_time);
        EncounterOutcome::Timeout
    } else {
        return;
    };

    let result = EncounterResult {
        outcome,
        waves_cleared: director.waves_cleared(),
        gold_earned: ledger.gold,
        elapsed_secs: state.elapsed_time,
        random_seed: state.random_seed,
        actors: state.ordered_summaries(),
    };

    finish_log(combat_log, &result, state.output_path.as_deref());
    state.result = Some(result);
}

fn finish_log(mut combat_log: ResMut<CombatLog>, result: &EncounterResult, output_path: Option<&str>) {
    combat_log.log(
        CombatLogEventType::EncounterEvent,
        format!(
            "Encounter ended: {} ({} waves cleared, {} gold)",
            result.outcome, result.waves_cleared, result.gold_earned
        ),
    );

    let Some(path) = output_path else {
        return;
    };
    let metadata = EncounterMetadata {
        outcome: result.outcome.to_string(),
        waves_cleared: result.waves_cleared,
        gold_earned: result.gold_earned,
        duration_secs: result.elapsed_secs,
        random_seed: result.random_seed,
        actors: result.actors.clone(),
    };
    match combat_log.save_to_file(&metadata, Path::new(path)) {
        Ok(()) => info!("Combat log saved to: {}", path),
        Err(e) => warn!("Failed to save combat log to {}: {}", path, e),
    }
}

/// Build a headless encounter app over already-loaded data.
pub fn build_encounter_app(
    config: EncounterConfig,
    registry: CombatDataRegistry,
    prefabs: PrefabCatalog,
) -> App {
    let mut app = App::new();
    configure_encounter_app(&mut app, config, registry, prefabs);
    app
}

fn configure_encounter_app(
    app: &mut App,
    config: EncounterConfig,
    registry: CombatDataRegistry,
    prefabs: PrefabCatalog,
) {
    // Minimal plugins - no window, no rendering; time advances a fixed step per update
    app.add_plugins(MinimalPlugins)
        .add_plugins(TransformPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            TICK_SECS,
        )))
        .insert_resource(registry)
        .insert_resource(prefabs)
        .add_plugins(CombatPlugin)
        .add_plugins(HeadlessPlugin { config })
        .add_plugins(WavePlugin);
}

/// Step an encounter app until it produces a result.
pub fn drive_encounter(mut app: App) -> EncounterResult {
    app.finish();
    app.cleanup();
    loop {
        app.update();
        if let Some(result) = app.world().resource::<EncounterState>().result.clone() {
            return result;
        }
    }
}

/// Run a headless encounter with the given configuration, loading its data
/// directory. `log` installs a log subscriber before anything is loaded.
pub fn run_encounter(
    config: EncounterConfig,
    log: Option<LogPlugin>,
) -> Result<EncounterResult, HeadlessError> {
    config.validate()?;

    let mut app = App::new();
    if let Some(log) = log {
        app.add_plugins(log);
    }

    info!("Starting headless encounter simulation...");
    info!("  Data: {}", config.data_dir.display());
    info!("  Start wave: {}", config.start_wave);
    info!("  Heroes: {}", config.heroes.len());
    info!("  Max duration: {:.0}s", config.max_duration_secs);

    let registry = CombatDataRegistry::new(RonDirectory::new(&config.data_dir));
    registry.initialize()?;
    let prefabs = PrefabCatalog::load_from_dir(&config.data_dir)?;

    configure_encounter_app(&mut app, config, registry, prefabs);
    Ok(drive_encounter(app))
}
