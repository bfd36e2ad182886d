//! Actor Components
//!
//! ECS components and resources describing combat actors.
//!
//! ## Contents
//!
//! - `StatBlock` / `ResistanceProfile`: the numbers damage resolution reads and writes
//! - `CombatActor`: identity, faction and stats of one spawned hero or enemy
//! - `Faction` / `FactionMask`: who an actor is and who its queries may see
//! - `GameRng`: seeded random source shared by every probabilistic rule

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::ability::{DamageType, Element};

// ============================================================================
// Random Source
// ============================================================================

/// A source of uniform samples in `[0.0, 1.0)`.
///
/// Hit resolution draws through this trait so tests can script exact rolls.
pub trait RollSource {
    fn roll(&mut self) -> f32;
}

impl<R: RollSource + ?Sized> RollSource for &mut R {
    fn roll(&mut self) -> f32 {
        (**self).roll()
    }
}

/// Seeded random number generator for deterministic simulation.
///
/// When a seed is provided (e.g., via encounter config), the same seed will
/// always produce the same encounter outcome. Without a seed, uses system entropy.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random integer in `[min, max]`. Swapped bounds are tolerated.
    pub fn random_int_inclusive(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(lo..=hi)
    }

    /// Pick a random index below `len`, or None for an empty collection.
    pub fn random_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RollSource for GameRng {
    fn roll(&mut self) -> f32 {
        self.random_f32()
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Fractional damage reduction per damage type and element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResistanceProfile {
    pub physical: f32,
    pub magical: f32,
    pub ice: f32,
    pub fire: f32,
    pub lightning: f32,
    pub poison: f32,
}

impl ResistanceProfile {
    /// Resist for an element; `Element::None` has no resist.
    pub fn for_element(&self, element: Element) -> f32 {
        match element {
            Element::None => 0.0,
            Element::Ice => self.ice,
            Element::Fire => self.fire,
            Element::Lightning => self.lightning,
            Element::Poison => self.poison,
        }
    }

    pub fn for_damage_type(&self, damage_type: DamageType) -> f32 {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Magical => self.magical,
        }
    }
}

/// Combat numbers owned by each actor.
///
/// Invariants: `0 <= hp <= max_hp` and `0 <= mp <= max_mp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub max_hp: f32,
    pub hp: f32,
    pub max_mp: f32,
    pub mp: f32,
    pub armor: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub dodge_chance: f32,
    /// Scales cast phase durations (higher is faster)
    pub attack_speed: f32,
    pub resist: ResistanceProfile,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            hp: 100.0,
            max_mp: 0.0,
            mp: 0.0,
            armor: 0.0,
            crit_chance: 0.0,
            crit_multiplier: 2.0,
            dodge_chance: 0.0,
            attack_speed: 1.0,
            resist: ResistanceProfile::default(),
        }
    }
}

impl StatBlock {
    /// Full health and mana block with the given maxima.
    pub fn with_pools(max_hp: f32, max_mp: f32) -> Self {
        Self {
            max_hp,
            hp: max_hp,
            max_mp,
            mp: max_mp,
            ..Default::default()
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Spend mana. Non-positive costs always succeed; insufficient mana
    /// leaves the pool untouched and returns false.
    pub fn consume_mana(&mut self, cost: f32) -> bool {
        if cost <= 0.0 {
            return true;
        }
        if self.mp < cost {
            return false;
        }
        self.mp -= cost;
        true
    }

    /// Add mana, capped at `max_mp`. Negative amounts are ignored.
    pub fn restore_mana(&mut self, amount: f32) {
        self.mp = self.max_mp.min(self.mp + amount.max(0.0));
    }

    /// Add health, capped at `max_hp`. Negative amounts are ignored.
    pub fn restore_hp(&mut self, amount: f32) {
        self.hp = self.max_hp.min(self.hp + amount.max(0.0));
    }

    /// Debug-only check of the pool invariants.
    pub fn debug_validate(&self) {
        debug_assert!(
            self.hp >= 0.0 && self.hp <= self.max_hp,
            "hp {} outside [0, {}]",
            self.hp,
            self.max_hp
        );
        debug_assert!(
            self.mp >= 0.0 && self.mp <= self.max_mp,
            "mp {} outside [0, {}]",
            self.mp,
            self.max_mp
        );
    }
}

// ============================================================================
// Actors
// ============================================================================

/// Side an actor fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Faction {
    Hero,
    Enemy,
}

impl Faction {
    pub fn opponents(self) -> FactionMask {
        match self {
            Faction::Hero => FactionMask::ENEMIES,
            Faction::Enemy => FactionMask::HEROES,
        }
    }
}

/// Filter applied by spatial queries, the equivalent of a physics layer mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactionMask {
    pub heroes: bool,
    pub enemies: bool,
}

impl FactionMask {
    pub const ALL: Self = Self {
        heroes: true,
        enemies: true,
    };
    pub const HEROES: Self = Self {
        heroes: true,
        enemies: false,
    };
    pub const ENEMIES: Self = Self {
        heroes: false,
        enemies: true,
    };

    pub fn contains(&self, faction: Faction) -> bool {
        match faction {
            Faction::Hero => self.heroes,
            Faction::Enemy => self.enemies,
        }
    }
}

impl Default for FactionMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// A hero or enemy taking part in combat.
#[derive(Component, Debug, Clone)]
pub struct CombatActor {
    /// Data identity, e.g. `"hero:1"` or `"enemy:101#3"`
    pub actor_id: String,
    pub faction: Faction,
    pub stats: StatBlock,
    /// Mana restored per second
    pub mana_regen: f32,
    /// Total damage dealt (post-mitigation)
    pub damage_dealt: f32,
    /// Total damage taken (post-mitigation)
    pub damage_taken: f32,
}

impl CombatActor {
    pub fn new(actor_id: impl Into<String>, faction: Faction, stats: StatBlock) -> Self {
        Self {
            actor_id: actor_id.into(),
            faction,
            stats,
            mana_regen: 0.0,
            damage_dealt: 0.0,
            damage_taken: 0.0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.stats.is_dead()
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    pub fn consume_mana(&mut self, cost: f32) -> bool {
        self.stats.consume_mana(cost)
    }

    pub fn restore_mana(&mut self, amount: f32) {
        self.stats.restore_mana(amount);
    }

    pub fn restore_hp(&mut self, amount: f32) {
        self.stats.restore_hp(amount);
    }
}

/// Horizontal facing of a rotation. Actors face along local +Z.
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(b.x - a.x, b.z - a.z).length()
}

pub fn facing(rotation: Quat) -> Vec3 {
    let forward = rotation * Vec3::Z;
    Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero()
}

/// Rotation that faces `direction` on the horizontal plane.
pub fn rotation_towards(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(flat.x.atan2(flat.z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut rng1 = GameRng::from_seed(12345);
        let mut rng2 = GameRng::from_seed(12345);

        for _ in 0..100 {
            assert_eq!(rng1.random_f32(), rng2.random_f32());
        }
    }

    #[test]
    fn test_random_int_inclusive_bounds() {
        let mut rng = GameRng::from_seed(7);
        for _ in 0..200 {
            let value = rng.random_int_inclusive(10, 20);
            assert!((10..=20).contains(&value));
        }
        assert_eq!(rng.random_int_inclusive(5, 5), 5);
        let swapped = rng.random_int_inclusive(9, 3);
        assert!((3..=9).contains(&swapped));
    }

    #[test]
    fn test_random_index_empty() {
        let mut rng = GameRng::from_seed(1);
        assert_eq!(rng.random_index(0), None);
        assert_eq!(rng.random_index(1), Some(0));
    }

    #[test]
    fn test_consume_mana_insufficient_leaves_pool() {
        let mut stats = StatBlock::with_pools(100.0, 50.0);
        stats.mp = 10.0;
        assert!(!stats.consume_mana(15.0));
        assert_eq!(stats.mp, 10.0);
    }

    #[test]
    fn test_consume_mana_non_positive_cost_succeeds() {
        let mut stats = StatBlock::with_pools(100.0, 0.0);
        assert!(stats.consume_mana(0.0));
        assert!(stats.consume_mana(-3.0));
        assert_eq!(stats.mp, 0.0);
    }

    #[test]
    fn test_consume_mana_spends() {
        let mut stats = StatBlock::with_pools(100.0, 50.0);
        assert!(stats.consume_mana(20.0));
        assert_eq!(stats.mp, 30.0);
    }

    #[test]
    fn test_restore_clamps_to_max() {
        let mut stats = StatBlock::with_pools(100.0, 50.0);
        stats.hp = 90.0;
        stats.mp = 45.0;
        stats.restore_hp(25.0);
        stats.restore_mana(25.0);
        assert_eq!(stats.hp, 100.0);
        assert_eq!(stats.mp, 50.0);

        stats.hp = 40.0;
        stats.restore_hp(-10.0);
        assert_eq!(stats.hp, 40.0);
    }

    #[test]
    fn test_resist_lookup() {
        let resist = ResistanceProfile {
            physical: 0.1,
            magical: 0.2,
            ice: 0.3,
            fire: 0.4,
            lightning: 0.5,
            poison: 0.6,
        };
        assert_eq!(resist.for_element(Element::None), 0.0);
        assert_eq!(resist.for_element(Element::Fire), 0.4);
        assert_eq!(resist.for_damage_type(DamageType::Magical), 0.2);
    }

    #[test]
    fn test_faction_masks() {
        assert!(Faction::Hero.opponents().contains(Faction::Enemy));
        assert!(!Faction::Hero.opponents().contains(Faction::Hero));
        assert!(FactionMask::ALL.contains(Faction::Hero));
    }

    #[test]
    fn test_rotation_towards_faces_direction() {
        let rotation = rotation_towards(Vec3::new(1.0, 5.0, 0.0)).unwrap();
        let forward = facing(rotation);
        assert!((forward - Vec3::X).length() < 1e-5);
        assert!(rotation_towards(Vec3::Y).is_none());
    }
}
