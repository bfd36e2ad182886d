//! Target Selection
//!
//! A per-tick snapshot of every actor (`CombatWorld`) doubles as the spatial
//! index: it answers sphere overlaps and rays, and `select_targets` filters
//! those candidates by shape and count.
//!
//! Overlap results come back nearest first (ties keep insertion order), so
//! "first candidate" and "nearest candidate" coincide.

use bevy::prelude::*;

use super::ability::AbilityShape;
use super::components::{facing, CombatActor, Faction, FactionMask, StatBlock};
use super::constants::ACTOR_HIT_RADIUS;
use super::status::StatusEffects;

/// Spatial queries the combat core needs from the world.
pub trait SpatialQuery {
    /// Actors whose position lies within `radius` of `center`, nearest first.
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: FactionMask) -> Vec<Entity>;

    /// First live actor a ray touches within `max_distance`. Actors the ray
    /// starts inside are ignored.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: FactionMask,
    ) -> Option<Entity>;
}

/// Snapshot of one actor, mutated in place by hit application and written
/// back to its components afterwards.
#[derive(Debug, Clone)]
pub struct ActorState {
    pub entity: Entity,
    pub faction: Faction,
    pub position: Vec3,
    /// Horizontal unit facing
    pub facing: Vec3,
    pub stats: StatBlock,
    pub status: StatusEffects,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

impl ActorState {
    pub fn new(entity: Entity, faction: Faction, position: Vec3, stats: StatBlock) -> Self {
        Self {
            entity,
            faction,
            position,
            facing: Vec3::Z,
            stats,
            status: StatusEffects::default(),
            damage_dealt: 0.0,
            damage_taken: 0.0,
        }
    }

    /// Snapshot an actor's components.
    pub fn capture(
        entity: Entity,
        actor: &CombatActor,
        transform: &Transform,
        status: Option<&StatusEffects>,
    ) -> Self {
        Self {
            entity,
            faction: actor.faction,
            position: transform.translation,
            facing: facing(transform.rotation),
            stats: actor.stats,
            status: status.copied().unwrap_or_default(),
            damage_dealt: actor.damage_dealt,
            damage_taken: actor.damage_taken,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.stats.is_dead()
    }
}

/// Every actor visible to one tick's ability resolution.
#[derive(Debug, Clone, Default)]
pub struct CombatWorld {
    actors: Vec<ActorState>,
}

impl CombatWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: ActorState) {
        self.actors.push(actor);
    }

    pub fn get(&self, entity: Entity) -> Option<&ActorState> {
        self.actors.iter().find(|a| a.entity == entity)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut ActorState> {
        self.actors.iter_mut().find(|a| a.entity == entity)
    }

    /// Mutable access to two distinct actors at once.
    pub fn pair_mut(
        &mut self,
        first: Entity,
        second: Entity,
    ) -> Option<(&mut ActorState, &mut ActorState)> {
        if first == second {
            return None;
        }
        let i = self.actors.iter().position(|a| a.entity == first)?;
        let j = self.actors.iter().position(|a| a.entity == second)?;
        if i < j {
            let (left, right) = self.actors.split_at_mut(j);
            Some((&mut left[i], &mut right[0]))
        } else {
            let (left, right) = self.actors.split_at_mut(i);
            Some((&mut right[0], &mut left[j]))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.iter()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl FromIterator<ActorState> for CombatWorld {
    fn from_iter<I: IntoIterator<Item = ActorState>>(iter: I) -> Self {
        Self {
            actors: iter.into_iter().collect(),
        }
    }
}

impl SpatialQuery for CombatWorld {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: FactionMask) -> Vec<Entity> {
        let radius_sq = radius * radius;
        let mut hits: Vec<(f32, Entity)> = self
            .actors
            .iter()
            .filter(|a| mask.contains(a.faction))
            .map(|a| (a.position.distance_squared(center), a.entity))
            .filter(|(d, _)| *d <= radius_sq)
            .collect();
        // Stable sort keeps insertion order for equal distances
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, e)| e).collect()
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: FactionMask,
    ) -> Option<Entity> {
        let dir = Vec2::new(direction.x, direction.z).normalize_or_zero();
        if dir == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }
        let start = Vec2::new(origin.x, origin.z);
        let radius_sq = ACTOR_HIT_RADIUS * ACTOR_HIT_RADIUS;

        let mut best: Option<(f32, Entity)> = None;
        for actor in &self.actors {
            if actor.is_dead() || !mask.contains(actor.faction) {
                continue;
            }
            let rel = Vec2::new(actor.position.x, actor.position.z) - start;
            if rel.length_squared() <= radius_sq {
                continue;
            }
            let along = rel.dot(dir);
            let perp_sq = rel.length_squared() - along * along;
            if along < 0.0 || perp_sq > radius_sq {
                continue;
            }
            let entry = along - (radius_sq - perp_sq).sqrt();
            if entry > max_distance {
                continue;
            }
            if best.map_or(true, |(d, _)| entry < d) {
                best = Some((entry, actor.entity));
            }
        }
        best.map(|(_, e)| e)
    }
}

/// Select targets for `caster`, excluding the caster and dead actors.
///
/// Cones keep candidates within `angle_deg / 2` of the caster's facing,
/// measured on the horizontal plane; every other shape uses the full circle.
/// The result is truncated to `max_count` when it is positive.
pub fn select_targets(
    world: &CombatWorld,
    caster: Entity,
    shape: AbilityShape,
    radius: f32,
    angle_deg: f32,
    max_count: i32,
    mask: FactionMask,
) -> Vec<Entity> {
    let Some(origin) = world.get(caster) else {
        return Vec::new();
    };
    let half_angle = (angle_deg * 0.5).to_radians();
    let limit = usize::try_from(max_count).ok().filter(|n| *n > 0);

    let mut selected = Vec::new();
    for entity in world.overlap_sphere(origin.position, radius, mask) {
        if entity == caster {
            continue;
        }
        let Some(candidate) = world.get(entity) else {
            continue;
        };
        if candidate.is_dead() {
            continue;
        }
        if shape == AbilityShape::Cone
            && horizontal_angle(origin.facing, candidate.position - origin.position) > half_angle
        {
            continue;
        }
        selected.push(entity);
        if limit.is_some_and(|n| selected.len() >= n) {
            break;
        }
    }
    selected
}

/// Angle in radians between two vectors projected on the horizontal plane.
/// A degenerate vector counts as perfectly aligned.
pub fn horizontal_angle(a: Vec3, b: Vec3) -> f32 {
    let a = Vec2::new(a.x, a.z);
    let b = Vec2::new(b.x, b.z);
    if a.length_squared() <= f32::EPSILON || b.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    a.angle_to(b).abs()
}
