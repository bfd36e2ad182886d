//! Wave Orchestrator
//!
//! Repeating four-phase cycle per wave index:
//!
//! ```text
//! Prep -> Spawning -> Clearing -> Reward -> (index + 1) -> Prep ...
//!                                                  \-> Finished (no more waves)
//! ```
//!
//! The director is a plain state machine advanced once per tick. It talks to
//! the world through `WaveHost` (spawn an actor, ask whether one is alive) and
//! reports what happened as returned `WaveSignal`s.
//!
//! The active-enemy set is owned here: the spawn step adds to it and the drain
//! check removes from it. Reward never starts while it is non-empty.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::events::RewardDrop;
use crate::data::prefabs::PrefabCatalog;
use crate::data::registry::CombatDataRegistry;
use crate::data::tables::{WaveEntryRow, WaveRow};
use crate::sim::components::GameRng;

use super::rewards::generate_rewards;
use super::spawn::{enemy_blueprint, ActorBlueprint, SceneAnchors, WaveSite};

/// Delay after each enemy spawn, in seconds.
pub const SPAWN_INTERVAL: f32 = 0.2;
/// Pause between the reward drop and the next wave, in seconds.
pub const REWARD_PAUSE: f32 = 2.0;

/// World access the director needs.
pub trait WaveHost {
    /// Instantiate an actor and return its handle.
    fn spawn(&mut self, blueprint: ActorBlueprint) -> Entity;

    /// False once the actor is dead or gone.
    fn is_alive(&self, entity: Entity) -> bool;
}

/// Read-only collaborators consulted while running waves.
#[derive(Clone, Copy)]
pub struct WaveContext<'a> {
    pub registry: &'a CombatDataRegistry,
    pub prefabs: &'a PrefabCatalog,
    pub anchors: &'a SceneAnchors,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaveSignal {
    Started {
        wave_index: u32,
        name: String,
        is_boss: bool,
    },
    PrepTimerChanged {
        wave_index: u32,
        remaining: f32,
    },
    Spawned {
        wave_index: u32,
        entity: Entity,
        actor_id: String,
    },
    Completed {
        wave_index: u32,
    },
    RewardsDropped {
        wave_index: u32,
        rewards: Vec<RewardDrop>,
        drop_point: Vec3,
    },
    AllCleared {
        waves_cleared: u32,
    },
}

pub type WaveSignals = SmallVec<[WaveSignal; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavePhase {
    /// Not started yet; the first tick loads the starting wave
    #[default]
    Pending,
    Prep,
    Spawning,
    Clearing,
    Reward,
    Finished,
}

/// Progress through the entries of the current wave.
#[derive(Debug, Clone, Default)]
struct SpawnCursor {
    entries: Vec<WaveEntryRow>,
    entry: usize,
    spawned: u32,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct WaveDirector {
    current_wave_index: u32,
    phase: WavePhase,
    /// Remaining wait of the current phase step
    wait: f32,
    prep_remaining: f32,
    early_start_used: bool,
    wave: Option<WaveRow>,
    site: WaveSite,
    cursor: SpawnCursor,
    active_enemies: Vec<Entity>,
    waves_cleared: u32,
    spawn_serial: u32,
}

impl WaveDirector {
    pub fn new(start_wave_index: u32) -> Self {
        Self {
            current_wave_index: start_wave_index,
            ..Default::default()
        }
    }

    pub fn current_wave_index(&self) -> u32 {
        self.current_wave_index
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == WavePhase::Finished
    }

    pub fn waves_cleared(&self) -> u32 {
        self.waves_cleared
    }

    pub fn prep_remaining(&self) -> f32 {
        self.prep_remaining
    }

    pub fn active_enemies(&self) -> &[Entity] {
        &self.active_enemies
    }

    pub fn current_wave(&self) -> Option<&WaveRow> {
        self.wave.as_ref()
    }

    pub fn early_start_used(&self) -> bool {
        self.early_start_used
    }

    pub fn can_start_early(&self) -> bool {
        self.phase == WavePhase::Prep && !self.early_start_used
    }

    /// Cut the prep timer short. Honoured once per wave, only while preparing.
    pub fn request_early_start(&mut self) -> bool {
        if !self.can_start_early() {
            return false;
        }
        self.early_start_used = true;
        self.prep_remaining = 0.0;
        true
    }

    /// Advance by `dt` seconds.
    ///
    /// Processing stops for the tick after a spawn, so the new actor is
    /// visible to the host before the next liveness check.
    pub fn tick(
        &mut self,
        dt: f32,
        ctx: &WaveContext,
        rng: &mut GameRng,
        host: &mut impl WaveHost,
    ) -> WaveSignals {
        let mut signals = WaveSignals::new();

        if self.phase == WavePhase::Pending {
            self.begin_wave(ctx, &mut signals);
        }

        let mut dt = dt;
        loop {
            match self.phase {
                WavePhase::Pending | WavePhase::Finished => break,
                WavePhase::Prep => {
                    if self.prep_remaining > 0.0 {
                        self.prep_remaining -= dt;
                        dt = 0.0;
                        signals.push(WaveSignal::PrepTimerChanged {
                            wave_index: self.current_wave_index,
                            remaining: self.prep_remaining,
                        });
                    }
                    if self.prep_remaining > 0.0 {
                        break;
                    }
                    self.begin_spawning(ctx);
                }
                WavePhase::Spawning => {
                    self.wait -= dt;
                    dt = 0.0;
                    if self.wait > 0.0 {
                        break;
                    }
                    if self.spawn_next(ctx, rng, host, &mut signals) {
                        break;
                    }
                }
                WavePhase::Clearing => {
                    self.active_enemies.retain(|&e| host.is_alive(e));
                    if !self.active_enemies.is_empty() {
                        break;
                    }
                    info!("Wave {} cleared", self.current_wave_index);
                    signals.push(WaveSignal::Completed {
                        wave_index: self.current_wave_index,
                    });
                    self.drop_rewards(ctx, rng, &mut signals);
                }
                WavePhase::Reward => {
                    self.wait -= dt;
                    dt = 0.0;
                    if self.wait > 0.0 {
                        break;
                    }
                    self.waves_cleared += 1;
                    self.current_wave_index += 1;
                    self.begin_wave(ctx, &mut signals);
                }
            }
        }

        signals
    }

    fn begin_wave(&mut self, ctx: &WaveContext, signals: &mut WaveSignals) {
        let Some(wave) = ctx.registry.wave_by_index(self.current_wave_index).cloned() else {
            info!(
                "No wave {} configured, all waves finished ({} cleared)",
                self.current_wave_index, self.waves_cleared
            );
            self.phase = WavePhase::Finished;
            self.wave = None;
            signals.push(WaveSignal::AllCleared {
                waves_cleared: self.waves_cleared,
            });
            return;
        };

        self.site = ctx.anchors.resolve(&wave);
        if wave.enemy_prefab_path.is_empty() {
            debug!("Wave {} has no enemy prefab path, using enemy rows", wave.wave_index);
        } else if ctx.prefabs.get(&wave.enemy_prefab_path).is_none() {
            warn!("Enemy prefab '{}' not found", wave.enemy_prefab_path);
        }

        info!(
            "Wave {} '{}' preparing ({:.1}s{})",
            wave.wave_index,
            wave.name,
            wave.prep_time,
            if wave.is_boss_wave { ", boss" } else { "" }
        );

        self.phase = WavePhase::Prep;
        self.prep_remaining = wave.prep_time;
        self.early_start_used = false;
        signals.push(WaveSignal::Started {
            wave_index: self.current_wave_index,
            name: wave.name.clone(),
            is_boss: wave.is_boss_wave,
        });
        self.wave = Some(wave);
    }

    fn begin_spawning(&mut self, ctx: &WaveContext) {
        let wave_id = self.wave.as_ref().map_or(0, |w| w.id);
        let entries: Vec<WaveEntryRow> = ctx
            .registry
            .wave_entries(wave_id)
            .into_iter()
            .cloned()
            .collect();

        info!(
            "Wave {} started: {} entries, {} enemies",
            self.current_wave_index,
            entries.len(),
            entries.iter().map(|e| e.count).sum::<u32>()
        );

        self.active_enemies.clear();
        self.wait = entries.first().map_or(0.0, |e| e.spawn_delay);
        self.cursor = SpawnCursor {
            entries,
            entry: 0,
            spawned: 0,
        };
        self.phase = WavePhase::Spawning;
    }

    /// Spawn the next enemy or move past an exhausted entry. Returns true when
    /// a spawn was attempted.
    fn spawn_next(
        &mut self,
        ctx: &WaveContext,
        rng: &mut GameRng,
        host: &mut impl WaveHost,
        signals: &mut WaveSignals,
    ) -> bool {
        let Some(entry) = self.cursor.entries.get(self.cursor.entry) else {
            self.phase = WavePhase::Clearing;
            return false;
        };

        if self.cursor.spawned >= entry.count {
            self.cursor.entry += 1;
            self.cursor.spawned = 0;
            self.wait = self
                .cursor
                .entries
                .get(self.cursor.entry)
                .map_or(0.0, |e| e.spawn_delay);
            return false;
        }

        let index = self.cursor.spawned;
        self.cursor.spawned += 1;
        self.wait = SPAWN_INTERVAL;

        let Some(wave) = self.wave.as_ref() else {
            return true;
        };
        self.spawn_serial += 1;
        let blueprint = enemy_blueprint(
            ctx.registry,
            ctx.prefabs,
            wave,
            entry,
            index,
            &self.site,
            self.spawn_serial,
            rng,
        );
        if let Some(blueprint) = blueprint {
            let actor_id = blueprint.actor_id.clone();
            let entity = host.spawn(blueprint);
            self.active_enemies.push(entity);
            signals.push(WaveSignal::Spawned {
                wave_index: self.current_wave_index,
                entity,
                actor_id,
            });
        }
        true
    }

    fn drop_rewards(&mut self, ctx: &WaveContext, rng: &mut GameRng, signals: &mut WaveSignals) {
        let (table, early_bonus) = match self.wave.as_ref() {
            Some(wave) => (
                ctx.registry.reward_table(&wave.reward_table_id),
                self.early_start_used.then_some(wave.early_start_bonus),
            ),
            None => (None, None),
        };
        if table.is_none() {
            debug!("Wave {} has no reward table", self.current_wave_index);
        }

        let rewards = generate_rewards(table, early_bonus, rng);
        signals.push(WaveSignal::RewardsDropped {
            wave_index: self.current_wave_index,
            rewards,
            drop_point: self.site.center.unwrap_or(Vec3::ZERO),
        });
        self.wait = REWARD_PAUSE;
        self.phase = WavePhase::Reward;
    }
}
