//! Spawn placement and actor blueprints.
//!
//! Named scene anchors (spawn-point groups and single points) come from the
//! encounter. A wave resolves its anchors into a `WaveSite`; spawn patterns
//! then place each enemy relative to that site.

use std::collections::HashMap;
use std::f32::consts::PI;

use bevy::prelude::*;

use crate::data::prefabs::{ActorTemplate, PrefabCatalog};
use crate::data::registry::CombatDataRegistry;
use crate::data::tables::{HeroRow, WaveEntryRow, WaveRow};
use crate::sim::ability::AbilityConfig;
use crate::sim::ai::CombatAi;
use crate::sim::casting::CastController;
use crate::sim::components::{rotation_towards, CombatActor, Faction, GameRng, StatBlock};
use crate::sim::movement::Mover;
use crate::sim::status::StatusEffects;

/// Ring radius for `circle` and `arc` patterns.
pub const SPAWN_RING_RADIUS: f32 = 5.0;
/// Total arc spread for the `arc` pattern, in degrees.
pub const SPAWN_ARC_DEGREES: f32 = 120.0;

/// How enemies of one wave entry are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnPattern {
    #[default]
    Circle,
    Arc,
    Center,
    /// Any existing spawn point, picked at random
    Random,
}

impl SpawnPattern {
    /// Case-insensitive; blank means `Circle`, anything unknown means `Random`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("circle") {
            Self::Circle
        } else if raw.eq_ignore_ascii_case("arc") {
            Self::Arc
        } else if raw.eq_ignore_ascii_case("center") {
            Self::Center
        } else {
            Self::Random
        }
    }
}

/// Named points and spawn-point groups of the encounter scene.
#[derive(Resource, Debug, Clone, Default)]
pub struct SceneAnchors {
    pub spawn_groups: HashMap<String, Vec<Vec3>>,
    pub points: HashMap<String, Vec3>,
}

impl SceneAnchors {
    pub fn point(&self, name: &str) -> Option<Vec3> {
        self.points.get(name).copied()
    }

    /// Resolve the spawn points and center of a wave. Missing names warn.
    pub fn resolve(&self, wave: &WaveRow) -> WaveSite {
        let spawn_points = if wave.spawn_point_group_name.is_empty() {
            warn!("Wave {} has no spawn point group configured", wave.wave_index);
            Vec::new()
        } else {
            match self.spawn_groups.get(&wave.spawn_point_group_name) {
                Some(points) => points.clone(),
                None => {
                    warn!("Spawn point group '{}' not found", wave.spawn_point_group_name);
                    Vec::new()
                }
            }
        };

        let center = if wave.center_point_name.is_empty() {
            None
        } else {
            let center = self.point(&wave.center_point_name);
            if center.is_none() {
                warn!("Center point '{}' not found", wave.center_point_name);
            }
            center
        };

        WaveSite {
            spawn_points,
            center,
        }
    }
}

/// Resolved placement anchors of the current wave.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveSite {
    pub spawn_points: Vec<Vec3>,
    pub center: Option<Vec3>,
}

impl WaveSite {
    /// The center point, or the first spawn point without one.
    pub fn effective_center(&self) -> Option<Vec3> {
        self.center.or_else(|| self.spawn_points.first().copied())
    }

    /// Where index `index` of `count` spawns. `None` without spawn points.
    pub fn spawn_position(
        &self,
        pattern: SpawnPattern,
        count: u32,
        index: u32,
        rng: &mut GameRng,
    ) -> Option<Vec3> {
        let center = self.effective_center()?;

        let position = match pattern {
            SpawnPattern::Circle => {
                let step = 360.0 / count.max(1) as f32;
                center + ring_offset(step * index as f32)
            }
            SpawnPattern::Arc => {
                let start = -SPAWN_ARC_DEGREES / 2.0;
                let step = SPAWN_ARC_DEGREES / count.saturating_sub(1).max(1) as f32;
                center + ring_offset(start + step * index as f32)
            }
            SpawnPattern::Center => center,
            SpawnPattern::Random => {
                let pick = rng.random_index(self.spawn_points.len())?;
                self.spawn_points[pick]
            }
        };
        Some(position)
    }

    /// Rotation facing the wave center from `position`.
    pub fn facing_center(&self, position: Vec3) -> Quat {
        self.center
            .and_then(|center| rotation_towards(center - position))
            .unwrap_or(Quat::IDENTITY)
    }
}

fn ring_offset(angle_deg: f32) -> Vec3 {
    let angle = angle_deg * PI / 180.0;
    Vec3::new(angle.cos() * SPAWN_RING_RADIUS, 0.0, angle.sin() * SPAWN_RING_RADIUS)
}

// ============================================================================
// Blueprints
// ============================================================================

/// Everything needed to instantiate one combat actor.
#[derive(Debug, Clone)]
pub struct ActorBlueprint {
    pub actor_id: String,
    pub faction: Faction,
    pub stats: StatBlock,
    pub abilities: Vec<AbilityConfig>,
    pub template: ActorTemplate,
    pub position: Vec3,
    pub rotation: Quat,
}

impl ActorBlueprint {
    /// Spawn the actor with its full component set.
    pub fn spawn(self, commands: &mut Commands) -> Entity {
        let mut actor = CombatActor::new(self.actor_id, self.faction, self.stats);
        actor.mana_regen = self.template.mana_regen;
        let ai = CombatAi::new(self.abilities, self.faction.opponents())
            .with_ranges(self.template.scan_radius, self.template.attack_range);

        commands
            .spawn((
                actor,
                StatusEffects::default(),
                CastController::new(self.template.keyframe_offset),
                Mover::new(self.template.move_speed, self.template.stopping_distance),
                ai,
                Transform::from_translation(self.position).with_rotation(self.rotation),
            ))
            .id()
    }
}

/// Blueprint for index `index` of a wave entry, or `None` when the enemy
/// row, its prefab or the spawn points are missing.
#[allow(clippy::too_many_arguments)]
pub fn enemy_blueprint(
    registry: &CombatDataRegistry,
    prefabs: &PrefabCatalog,
    wave: &WaveRow,
    entry: &WaveEntryRow,
    index: u32,
    site: &WaveSite,
    serial: u32,
    rng: &mut GameRng,
) -> Option<ActorBlueprint> {
    let Some(enemy) = registry.enemy(entry.enemy_id) else {
        warn!("Enemy {} not found", entry.enemy_id);
        return None;
    };

    let prefab_path = if wave.enemy_prefab_path.is_empty() {
        enemy.prefab_path.as_str()
    } else {
        wave.enemy_prefab_path.as_str()
    };
    let Some(template) = prefabs.get(prefab_path) else {
        warn!("Enemy prefab '{}' not found, skipping spawn", prefab_path);
        return None;
    };

    let pattern = SpawnPattern::parse(&entry.spawn_pattern);
    let Some(position) = site.spawn_position(pattern, entry.count, index, rng) else {
        warn!("No spawn points loaded for wave {}, skipping spawn", wave.wave_index);
        return None;
    };

    let name = if enemy.name.is_empty() {
        format!("enemy_{}", enemy.id)
    } else {
        enemy.name.clone()
    };
    let actor_id = if entry.is_elite {
        format!("Elite {}#{}", name, serial)
    } else {
        format!("{}#{}", name, serial)
    };

    Some(ActorBlueprint {
        actor_id,
        faction: Faction::Enemy,
        stats: registry.enemy_stats(enemy, wave.difficulty_scalar, entry.is_elite),
        abilities: registry.enemy_abilities(enemy),
        template: template.clone(),
        position,
        rotation: site.facing_center(position),
    })
}

/// Blueprint for a hero. Heroes without a known prefab use default locomotion.
pub fn hero_blueprint(
    registry: &CombatDataRegistry,
    prefabs: &PrefabCatalog,
    hero: &HeroRow,
    position: Vec3,
) -> ActorBlueprint {
    let template = prefabs.get(&hero.prefab_path).cloned().unwrap_or_else(|| {
        debug!("Hero {} has no prefab template, using defaults", hero.id);
        ActorTemplate::default()
    });
    let actor_id = if hero.name.is_empty() {
        format!("hero_{}", hero.id)
    } else {
        hero.name.clone()
    };

    ActorBlueprint {
        actor_id,
        faction: Faction::Hero,
        stats: registry.hero_stats(hero),
        abilities: registry.hero_abilities(hero),
        template,
        position,
        rotation: Quat::IDENTITY,
    }
}
