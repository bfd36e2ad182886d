//! Damage Resolution Engine
//!
//! The authoritative hit algorithm. A hit is first *resolved* (alive checks
//! and the dodge roll), then *applied*:
//!
//! 1. Start from the packet's base value
//! 2. Lightning packets double on a 25% roll
//! 3. Fire packets with ignite stacks multiply by `1 + stacks`
//! 4. Crit roll against attacker + packet crit chance
//! 5. Resist reduction: `1 - clamp01(element resist + type resist)`
//! 6. Subtract from Hp, clamped to `[0, max_hp]`
//!
//! The order is fixed; later multipliers compound on earlier ones. Elemental
//! side effects go to the target's status tracker after the damage lands.

use bevy::prelude::*;

use super::ability::{DamagePacket, DamageType, Element};
use super::components::{RollSource, StatBlock};
use super::constants::{
    CHAIN_MARK_DURATION, CORRODE_DURATION, CORRODE_VALUE, ICE_SLOW_DURATION, IGNITE_DURATION,
    LIGHTNING_DOUBLE_CHANCE,
};
use super::status::StatusController;

/// What a single applied hit did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitOutcome {
    /// Damage after all multipliers and resists
    pub damage: f32,
    /// Hp actually removed (damage clamped by remaining Hp)
    pub hp_lost: f32,
    pub critical: bool,
    pub lightning_doubled: bool,
    /// The hit took the target from alive to dead
    pub killing_blow: bool,
}

/// Capability interface for resolving and applying hits.
pub trait HitResolver {
    /// Returns false, with no state change, when either side is missing or
    /// dead, or when the target dodges.
    fn try_resolve_hit(
        &mut self,
        attacker: Option<&StatBlock>,
        target: Option<&StatBlock>,
        packet: &DamagePacket,
    ) -> bool;

    /// Apply damage and elemental side effects to a resolved target.
    fn apply_damage(
        &mut self,
        attacker: Option<&StatBlock>,
        target: &mut StatBlock,
        status: &mut dyn StatusController,
        packet: &DamagePacket,
    ) -> HitOutcome;

    /// Displace `position` horizontally by `force` along `direction`.
    /// Returns the displacement applied.
    fn apply_knockback(&mut self, position: &mut Vec3, direction: Vec3, force: f32) -> Vec3 {
        let displacement = knockback_displacement(direction, force);
        *position += displacement;
        displacement
    }
}

/// Standard resolver drawing every roll from one random source.
pub struct DamageResolver<R: RollSource> {
    rolls: R,
}

impl<R: RollSource> DamageResolver<R> {
    pub fn new(rolls: R) -> Self {
        Self { rolls }
    }
}

impl<R: RollSource> HitResolver for DamageResolver<R> {
    fn try_resolve_hit(
        &mut self,
        attacker: Option<&StatBlock>,
        target: Option<&StatBlock>,
        _packet: &DamagePacket,
    ) -> bool {
        let (Some(attacker), Some(target)) = (attacker, target) else {
            return false;
        };
        if attacker.is_dead() || target.is_dead() {
            return false;
        }
        // One sample per attempt, even for targets that cannot dodge
        self.rolls.roll() >= target.dodge_chance
    }

    fn apply_damage(
        &mut self,
        attacker: Option<&StatBlock>,
        target: &mut StatBlock,
        status: &mut dyn StatusController,
        packet: &DamagePacket,
    ) -> HitOutcome {
        if target.is_dead() {
            return HitOutcome::default();
        }

        let mut outcome = HitOutcome::default();
        let mut amount = packet.base_value;

        if packet.allow_lightning_double && self.rolls.roll() < LIGHTNING_DOUBLE_CHANCE {
            amount *= 2.0;
            outcome.lightning_doubled = true;
        }

        if packet.element == Element::Fire && packet.ignite_bonus_stack > 0.0 {
            amount *= 1.0 + packet.ignite_bonus_stack;
        }

        let crit_chance = attacker.map_or(0.0, |a| a.crit_chance) + packet.crit_chance;
        if self.rolls.roll() < crit_chance {
            let multiplier = attacker.map_or(packet.crit_multiplier, |a| a.crit_multiplier);
            amount *= multiplier;
            outcome.critical = true;
        }

        amount = mitigate(amount, target, packet.element, packet.damage_type);

        let hp_before = target.hp;
        target.hp = (target.hp - amount).clamp(0.0, target.max_hp);
        outcome.damage = amount;
        outcome.hp_lost = hp_before - target.hp;
        outcome.killing_blow = hp_before > 0.0 && target.is_dead();

        debug_assert!(target.hp <= hp_before, "damage must never heal");
        target.debug_validate();

        apply_side_effects(status, packet);
        outcome
    }
}

/// Resist reduction against the packet's element and damage type, floored at zero.
pub fn mitigate(amount: f32, target: &StatBlock, element: Element, damage_type: DamageType) -> f32 {
    let resist =
        (target.resist.for_element(element) + target.resist.for_damage_type(damage_type)).clamp(0.0, 1.0);
    (amount * (1.0 - resist)).max(0.0)
}

/// Elemental riders applied after damage lands.
pub fn apply_side_effects(status: &mut dyn StatusController, packet: &DamagePacket) {
    match packet.element {
        Element::Ice if packet.slow_amount > 0.0 => {
            status.apply_slow(packet.slow_amount, ICE_SLOW_DURATION, true);
        }
        Element::Fire if packet.ignite_bonus_stack > 0.0 => {
            status.apply_ignite(packet.ignite_bonus_stack, IGNITE_DURATION);
        }
        Element::Poison => status.apply_corrode(CORRODE_VALUE, CORRODE_DURATION),
        Element::Lightning => status.apply_chain_mark(CHAIN_MARK_DURATION),
        _ => {}
    }
}

/// Horizontal displacement for a knockback; zero for non-positive force or
/// a purely vertical direction.
pub fn knockback_displacement(direction: Vec3, force: f32) -> Vec3 {
    if force <= 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero() * force
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::status::StatusEffects;
    use std::collections::VecDeque;

    /// Replays a fixed list of rolls, then keeps returning 0.99.
    struct ScriptedRolls(VecDeque<f32>);

    impl ScriptedRolls {
        fn new(rolls: &[f32]) -> Self {
            Self(rolls.iter().copied().collect())
        }
    }

    impl RollSource for ScriptedRolls {
        fn roll(&mut self) -> f32 {
            self.0.pop_front().unwrap_or(0.99)
        }
    }

    fn plain_target() -> StatBlock {
        StatBlock::with_pools(100.0, 0.0)
    }

    fn attacker() -> StatBlock {
        StatBlock {
            crit_chance: 0.0,
            crit_multiplier: 2.0,
            ..StatBlock::with_pools(100.0, 0.0)
        }
    }

    fn packet(base_value: f32) -> DamagePacket {
        DamagePacket {
            base_value,
            crit_chance: 0.0,
            damage_type: DamageType::Physical,
            element: Element::None,
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_hit_subtracts_base_value() {
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[]));
        let attacker = attacker();
        let mut target = plain_target();
        let mut status = StatusEffects::default();

        assert!(resolver.try_resolve_hit(Some(&attacker), Some(&target), &packet(50.0)));
        let outcome = resolver.apply_damage(Some(&attacker), &mut target, &mut status, &packet(50.0));
        assert_eq!(target.hp, 50.0);
        assert_eq!(outcome.damage, 50.0);
        assert!(!outcome.critical);
    }

    #[test]
    fn test_fire_ignite_multiplies_and_applies_ignite() {
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[]));
        let mut target = plain_target();
        let mut status = StatusEffects::default();
        let fire = DamagePacket {
            element: Element::Fire,
            ignite_bonus_stack: 0.5,
            ..packet(50.0)
        };

        resolver.apply_damage(Some(&attacker()), &mut target, &mut status, &fire);
        assert_eq!(target.hp, 25.0);
        assert_eq!(status.ignite_stacks, 0.5);
        assert_eq!(status.ignite_timer, IGNITE_DURATION);
    }

    #[test]
    fn test_dodge_leaves_target_untouched() {
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[0.1]));
        let target = StatBlock {
            dodge_chance: 0.2,
            ..plain_target()
        };
        assert!(!resolver.try_resolve_hit(Some(&attacker()), Some(&target), &packet(50.0)));
        assert_eq!(target.hp, 100.0);
    }

    #[test]
    fn test_roll_equal_to_dodge_chance_hits() {
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[0.2]));
        let target = StatBlock {
            dodge_chance: 0.2,
            ..plain_target()
        };
        assert!(resolver.try_resolve_hit(Some(&attacker()), Some(&target), &packet(50.0)));
    }

    #[test]
    fn test_missing_or_dead_participants_fail() {
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[]));
        let mut dead = plain_target();
        dead.hp = 0.0;
        let alive = plain_target();

        assert!(!resolver.try_resolve_hit(None, Some(&alive), &packet(10.0)));
        assert!(!resolver.try_resolve_hit(Some(&alive), None, &packet(10.0)));
        assert!(!resolver.try_resolve_hit(Some(&alive), Some(&dead), &packet(10.0)));
        assert!(!resolver.try_resolve_hit(Some(&dead), Some(&alive), &packet(10.0)));
    }

    #[test]
    fn test_lightning_double_then_crit_compound() {
        // lightning roll 0.1 < 0.25 doubles, crit roll 0.0 < 0.5 crits
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[0.1, 0.0]));
        let mut target = StatBlock::with_pools(1000.0, 0.0);
        let mut status = StatusEffects::default();
        let attacker = StatBlock {
            crit_chance: 0.5,
            crit_multiplier: 3.0,
            ..attacker()
        };
        let lightning = DamagePacket {
            element: Element::Lightning,
            allow_lightning_double: true,
            ..packet(10.0)
        };

        let outcome = resolver.apply_damage(Some(&attacker), &mut target, &mut status, &lightning);
        assert!(outcome.lightning_doubled);
        assert!(outcome.critical);
        assert_eq!(outcome.damage, 60.0);
        assert_eq!(status.chain_mark_timer, CHAIN_MARK_DURATION);
    }

    #[test]
    fn test_crit_chance_adds_packet_bonus() {
        // attacker 0.1 + packet 0.3 = 0.4 > roll 0.35
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[0.35]));
        let mut target = plain_target();
        let mut status = StatusEffects::default();
        let attacker = StatBlock {
            crit_chance: 0.1,
            ..attacker()
        };
        let bonus = DamagePacket {
            crit_chance: 0.3,
            ..packet(20.0)
        };
        let outcome = resolver.apply_damage(Some(&attacker), &mut target, &mut status, &bonus);
        assert!(outcome.critical);
        assert_eq!(target.hp, 60.0);
    }

    #[test]
    fn test_crit_without_attacker_uses_packet_multiplier() {
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[0.0]));
        let mut target = plain_target();
        let mut status = StatusEffects::default();
        let sure_crit = DamagePacket {
            crit_chance: 1.0,
            crit_multiplier: 1.5,
            ..packet(20.0)
        };
        resolver.apply_damage(None, &mut target, &mut status, &sure_crit);
        assert_eq!(target.hp, 70.0);
    }

    #[test]
    fn test_resists_sum_and_clamp() {
        let mut target = plain_target();
        target.resist.fire = 0.3;
        target.resist.magical = 0.2;
        assert_eq!(mitigate(100.0, &target, Element::Fire, DamageType::Magical), 50.0);
        assert_eq!(mitigate(100.0, &target, Element::None, DamageType::Physical), 100.0);

        target.resist.fire = 0.9;
        assert_eq!(mitigate(100.0, &target, Element::Fire, DamageType::Magical), 0.0);

        target.resist.fire = -0.5;
        target.resist.magical = 0.0;
        assert_eq!(mitigate(100.0, &target, Element::Fire, DamageType::Magical), 100.0);
    }

    #[test]
    fn test_negative_base_never_heals() {
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[]));
        let mut target = plain_target();
        target.hp = 80.0;
        let mut status = StatusEffects::default();
        resolver.apply_damage(Some(&attacker()), &mut target, &mut status, &packet(-30.0));
        assert_eq!(target.hp, 80.0);
    }

    #[test]
    fn test_overkill_clamps_to_zero() {
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[]));
        let mut target = plain_target();
        let mut status = StatusEffects::default();
        let outcome = resolver.apply_damage(Some(&attacker()), &mut target, &mut status, &packet(250.0));
        assert_eq!(target.hp, 0.0);
        assert_eq!(outcome.hp_lost, 100.0);
        assert!(outcome.killing_blow);
    }

    #[test]
    fn test_elemental_side_effects() {
        let mut status = StatusEffects::default();
        apply_side_effects(
            &mut status,
            &DamagePacket {
                element: Element::Ice,
                slow_amount: 2.0,
                ..packet(0.0)
            },
        );
        assert_eq!(status.slow_stacks, 2.0);
        assert_eq!(status.slow_timer, ICE_SLOW_DURATION);

        apply_side_effects(
            &mut status,
            &DamagePacket {
                element: Element::Poison,
                ..packet(0.0)
            },
        );
        assert_eq!(status.corrode_value, CORRODE_VALUE);

        let mut untouched = StatusEffects::default();
        apply_side_effects(
            &mut untouched,
            &DamagePacket {
                element: Element::Ice,
                slow_amount: 0.0,
                ..packet(0.0)
            },
        );
        assert!(untouched.is_clear());
    }

    #[test]
    fn test_knockback_is_horizontal() {
        let mut resolver = DamageResolver::new(ScriptedRolls::new(&[]));
        let mut position = Vec3::ZERO;
        let moved = resolver.apply_knockback(&mut position, Vec3::new(3.0, 4.0, 0.0), 2.0);
        assert!((moved - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(position, moved);

        assert_eq!(knockback_displacement(Vec3::X, 0.0), Vec3::ZERO);
        assert_eq!(knockback_displacement(Vec3::Y, 5.0), Vec3::ZERO);
    }
}
