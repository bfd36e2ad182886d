//! Bevy systems driving the wave director and the hero roster.

use std::collections::HashSet;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::events::{
    AllWavesCleared, EarlyStartRequested, PrepTimerChanged, RewardType, RewardsDropped,
    WaveCompleted, WaveStarted,
};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::data::prefabs::PrefabCatalog;
use crate::data::registry::CombatDataRegistry;
use crate::sim::components::{CombatActor, GameRng};
use crate::sim::lifecycle::Corpse;

use super::orchestrator::{WaveContext, WaveDirector, WaveHost, WaveSignal};
use super::rewards::RewardLedger;
use super::spawn::{hero_blueprint, ActorBlueprint, SceneAnchors};

/// When the wave director is asked to skip the prep timer.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyStartPolicy {
    /// Only on an explicit `EarlyStartRequested` event
    #[default]
    Manual,
    /// Every wave starts as soon as its prep begins
    Immediate,
}

/// Where one hero enters the encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroPlacement {
    pub hero_id: u32,
    /// Named scene point; takes precedence over `position`
    #[serde(default)]
    pub point: Option<String>,
    #[serde(default)]
    pub position: Option<[f32; 3]>,
}

impl HeroPlacement {
    pub fn resolve(&self, anchors: &SceneAnchors) -> Option<Vec3> {
        match &self.point {
            Some(name) => anchors.point(name),
            None => self.position.map(Vec3::from_array),
        }
    }
}

/// Heroes spawned at encounter start.
#[derive(Resource, Debug, Clone, Default)]
pub struct HeroRoster(pub Vec<HeroPlacement>);

/// Data collaborators shared by the wave systems.
#[derive(SystemParam)]
pub struct WaveData<'w> {
    registry: Res<'w, CombatDataRegistry>,
    prefabs: Res<'w, PrefabCatalog>,
    anchors: Res<'w, SceneAnchors>,
}

impl WaveData<'_> {
    fn context(&self) -> WaveContext<'_> {
        WaveContext {
            registry: &self.registry,
            prefabs: &self.prefabs,
            anchors: &self.anchors,
        }
    }
}

#[derive(SystemParam)]
pub struct WaveEvents<'w> {
    started: EventWriter<'w, WaveStarted>,
    prep: EventWriter<'w, PrepTimerChanged>,
    completed: EventWriter<'w, WaveCompleted>,
    rewards: EventWriter<'w, RewardsDropped>,
    finished: EventWriter<'w, AllWavesCleared>,
}

/// Spawns through `Commands`; liveness is the set of living actors at the
/// start of the system.
struct CommandsHost<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    alive: HashSet<Entity>,
}

impl WaveHost for CommandsHost<'_, '_, '_> {
    fn spawn(&mut self, blueprint: ActorBlueprint) -> Entity {
        blueprint.spawn(self.commands)
    }

    fn is_alive(&self, entity: Entity) -> bool {
        self.alive.contains(&entity)
    }
}

/// Spawn every hero of the roster.
pub fn spawn_heroes(
    mut commands: Commands,
    roster: Res<HeroRoster>,
    data: WaveData,
    mut combat_log: ResMut<CombatLog>,
) {
    for placement in &roster.0 {
        let Some(hero) = data.registry.hero(placement.hero_id) else {
            warn!("Hero {} not found, skipping", placement.hero_id);
            continue;
        };
        let Some(position) = placement.resolve(&data.anchors) else {
            warn!("Hero {} has no valid spawn point, skipping", placement.hero_id);
            continue;
        };

        let blueprint = hero_blueprint(&data.registry, &data.prefabs, hero, position);
        let actor_id = blueprint.actor_id.clone();
        let ability_count = blueprint.abilities.len();
        blueprint.spawn(&mut commands);

        info!("Spawned hero {} at {} with {} abilities", actor_id, position, ability_count);
        combat_log.log(
            CombatLogEventType::Spawn,
            format!("{} enters the field", actor_id),
        );
    }
}

/// Request an early start for every wave under `EarlyStartPolicy::Immediate`.
pub fn auto_early_start(
    policy: Res<EarlyStartPolicy>,
    director: Res<WaveDirector>,
    mut requests: EventWriter<EarlyStartRequested>,
) {
    if *policy == EarlyStartPolicy::Immediate && director.can_start_early() {
        requests.send(EarlyStartRequested);
    }
}

/// Advance the wave director one tick and publish what it reports.
#[allow(clippy::too_many_arguments)]
pub fn run_wave_director(
    time: Res<Time>,
    mut director: ResMut<WaveDirector>,
    data: WaveData,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    actors: Query<(Entity, &CombatActor), Without<Corpse>>,
    mut early: EventReader<EarlyStartRequested>,
    mut events: WaveEvents,
    mut ledger: ResMut<RewardLedger>,
    mut combat_log: ResMut<CombatLog>,
) {
    for _ in early.read() {
        if director.request_early_start() {
            info!("Wave {} started early", director.current_wave_index());
            combat_log.log(
                CombatLogEventType::WaveEvent,
                format!("Wave {} started early", director.current_wave_index()),
            );
        }
    }

    if director.is_finished() {
        return;
    }

    let mut host = CommandsHost {
        commands: &mut commands,
        alive: actors
            .iter()
            .filter(|(_, actor)| actor.is_alive())
            .map(|(entity, _)| entity)
            .collect(),
    };
    let ctx = data.context();
    let signals = director.tick(time.delta_secs(), &ctx, &mut rng, &mut host);

    for signal in signals {
        match signal {
            WaveSignal::Started {
                wave_index,
                name,
                is_boss,
            } => {
                combat_log.log(
                    CombatLogEventType::WaveEvent,
                    format!(
                        "Wave {} '{}' begins preparing{}",
                        wave_index,
                        name,
                        if is_boss { " (boss wave)" } else { "" }
                    ),
                );
                events.started.send(WaveStarted {
                    wave_index,
                    name,
                    is_boss,
                });
            }
            WaveSignal::PrepTimerChanged {
                wave_index,
                remaining,
            } => {
                events.prep.send(PrepTimerChanged {
                    wave_index,
                    remaining,
                });
            }
            WaveSignal::Spawned {
                wave_index,
                actor_id,
                ..
            } => {
                combat_log.log(
                    CombatLogEventType::Spawn,
                    format!("{} spawns (wave {})", actor_id, wave_index),
                );
            }
            WaveSignal::Completed { wave_index } => {
                combat_log.log(
                    CombatLogEventType::WaveEvent,
                    format!("Wave {} cleared", wave_index),
                );
                events.completed.send(WaveCompleted { wave_index });
            }
            WaveSignal::RewardsDropped {
                wave_index,
                rewards,
                drop_point,
            } => {
                ledger.record(&rewards);
                for reward in &rewards {
                    let message = match reward.reward_type {
                        RewardType::Gold => format!("Wave {} drops {} gold", wave_index, reward.amount),
                        _ => format!(
                            "Wave {} drops {:?} {} x{}",
                            wave_index, reward.reward_type, reward.item_id, reward.amount
                        ),
                    };
                    combat_log.log(CombatLogEventType::Reward, message);
                }
                events.rewards.send(RewardsDropped {
                    wave_index,
                    rewards,
                    drop_point,
                });
            }
            WaveSignal::AllCleared { waves_cleared } => {
                combat_log.log(
                    CombatLogEventType::EncounterEvent,
                    format!("All waves finished ({} cleared)", waves_cleared),
                );
                events.finished.send(AllWavesCleared { waves_cleared });
            }
        }
    }
}
