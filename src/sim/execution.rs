//! Ability Execution
//!
//! Dispatches an ability's shape to its targeting and hit sequence:
//!
//! - **Cone**: cone selection limited to `max_targets`
//! - **SelfAoe**: full-circle selection limited to `max_targets`
//! - **TargetActor** (and any other shape): the single nearest target in radius
//! - **Projectile**: an instant ray from chest height along the aim direction
//! - **Chain**: a primary target, then up to `chain_count` more from a
//!   full-circle selection around the caster
//!
//! Chain jumps are picked around the caster, not around the previous link.

use bevy::prelude::*;
use smallvec::SmallVec;

use super::ability::{AbilityConfig, AbilityShape};
use super::components::FactionMask;
use super::constants::PROJECTILE_RAY_HEIGHT;
use super::damage::{HitOutcome, HitResolver};
use super::targeting::{select_targets, CombatWorld, SpatialQuery};

/// Caster and aim for one ability execution.
#[derive(Debug, Clone, Copy)]
pub struct AbilityContext {
    pub caster: Entity,
    pub aim_point: Vec3,
    pub aim_direction: Vec3,
    /// Which factions the ability can touch
    pub mask: FactionMask,
}

/// How a single hit attempt ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitResult {
    /// The target evaded; nothing changed
    Dodged,
    Landed(HitOutcome),
}

/// One hit attempt made during an execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub attacker: Entity,
    pub target: Entity,
    pub result: HitResult,
    /// Horizontal displacement applied to the target
    pub knockback: Vec3,
}

impl HitRecord {
    pub fn landed(&self) -> Option<&HitOutcome> {
        match &self.result {
            HitResult::Landed(outcome) => Some(outcome),
            HitResult::Dodged => None,
        }
    }
}

pub type HitRecords = SmallVec<[HitRecord; 4]>;

/// Execute `ability` for `ctx.caster` against the actors in `world`.
pub fn execute_ability(
    world: &mut CombatWorld,
    resolver: &mut impl HitResolver,
    ability: &AbilityConfig,
    ctx: &AbilityContext,
) -> HitRecords {
    let mut records = HitRecords::new();
    let Some(caster) = world.get(ctx.caster) else {
        return records;
    };
    let caster_position = caster.position;
    let caster_facing = caster.facing;

    debug!(
        "{:?} executes '{}' ({}) toward {:?}",
        ctx.caster, ability.id, ability.shape, ctx.aim_point
    );

    let targets: Vec<Entity> = match ability.shape {
        AbilityShape::Cone => select_targets(
            world,
            ctx.caster,
            AbilityShape::Cone,
            ability.radius,
            ability.angle,
            ability.max_targets,
            ctx.mask,
        ),
        AbilityShape::SelfAoe => select_targets(
            world,
            ctx.caster,
            AbilityShape::SelfAoe,
            ability.radius,
            360.0,
            ability.max_targets,
            ctx.mask,
        ),
        AbilityShape::Projectile => {
            let direction = if ctx.aim_direction.length_squared() > f32::EPSILON {
                ctx.aim_direction
            } else {
                caster_facing
            };
            let origin = caster_position + Vec3::Y * PROJECTILE_RAY_HEIGHT;
            world
                .raycast(origin, direction, ability.radius, ctx.mask)
                .into_iter()
                .filter(|hit| *hit != ctx.caster)
                .collect()
        }
        AbilityShape::Chain => chain_targets(world, ability, ctx),
        AbilityShape::TargetActor | AbilityShape::TargetPoint => {
            nearest_target(world, ability, ctx).into_iter().collect()
        }
    };

    for target in targets {
        if let Some(record) = apply_hit(world, resolver, ability, ctx.caster, target) {
            records.push(record);
        }
    }
    records
}

fn nearest_target(world: &CombatWorld, ability: &AbilityConfig, ctx: &AbilityContext) -> Option<Entity> {
    select_targets(
        world,
        ctx.caster,
        AbilityShape::TargetActor,
        ability.radius,
        360.0,
        1,
        ctx.mask,
    )
    .into_iter()
    .next()
}

fn chain_targets(world: &CombatWorld, ability: &AbilityConfig, ctx: &AbilityContext) -> Vec<Entity> {
    let Some(primary) = nearest_target(world, ability, ctx) else {
        return Vec::new();
    };
    let jumps = ability.chain_count as usize;
    let candidates = select_targets(
        world,
        ctx.caster,
        AbilityShape::SelfAoe,
        ability.radius,
        360.0,
        i32::try_from(jumps + 1).unwrap_or(i32::MAX),
        ctx.mask,
    );

    let mut targets = Vec::with_capacity(jumps + 1);
    targets.push(primary);
    targets.extend(candidates.into_iter().filter(|e| *e != primary).take(jumps));
    targets
}

/// Resolve and apply one hit of `ability` from `attacker` to `target`.
///
/// Returns None when either actor is missing, the pair is degenerate, or the
/// target is already dead.
pub fn apply_hit(
    world: &mut CombatWorld,
    resolver: &mut impl HitResolver,
    ability: &AbilityConfig,
    attacker: Entity,
    target: Entity,
) -> Option<HitRecord> {
    let (source, victim) = world.pair_mut(attacker, target)?;
    if victim.is_dead() {
        return None;
    }

    let packet = ability.to_packet();
    if !resolver.try_resolve_hit(Some(&source.stats), Some(&victim.stats), &packet) {
        return Some(HitRecord {
            attacker,
            target,
            result: HitResult::Dodged,
            knockback: Vec3::ZERO,
        });
    }

    let outcome = resolver.apply_damage(
        Some(&source.stats),
        &mut victim.stats,
        &mut victim.status,
        &packet,
    );
    source.damage_dealt += outcome.hp_lost;
    victim.damage_taken += outcome.hp_lost;

    let mut knockback = Vec3::ZERO;
    if packet.knockback_force > 0.0 {
        let direction = (victim.position - source.position).normalize_or_zero();
        knockback = resolver.apply_knockback(&mut victim.position, direction, packet.knockback_force);
    }

    Some(HitRecord {
        attacker,
        target,
        result: HitResult::Landed(outcome),
        knockback,
    })
}
