//! Integration tests for hit resolution, status effects and cast timing
//!
//! These tests verify that:
//! - Damage lands, mitigates and clamps correctly
//! - Dodged hits change nothing
//! - Status effects stack and refresh as expected
//! - A cast fires its keyframe exactly once
//! - Cooldowns gate ability selection

use bevy::prelude::*;

use wavesim::sim::ability::AbilityConfig;
use wavesim::sim::casting::{CastController, CastSignal};
use wavesim::sim::status::{StatusController, StatusEffects};
use wavesim::sim::{CombatAi, DamageResolver, Element, FactionMask, HitResolver, RollSource, StatBlock};

/// Replays a fixed sequence of rolls, repeating the last one.
struct ScriptedRolls {
    rolls: Vec<f32>,
    next: usize,
}

impl ScriptedRolls {
    fn new(rolls: &[f32]) -> Self {
        Self {
            rolls: rolls.to_vec(),
            next: 0,
        }
    }

    fn constant(roll: f32) -> Self {
        Self::new(&[roll])
    }
}

impl RollSource for ScriptedRolls {
    fn roll(&mut self) -> f32 {
        let index = self.next.min(self.rolls.len() - 1);
        self.next += 1;
        self.rolls[index]
    }
}

fn strike(base_value: f32) -> AbilityConfig {
    AbilityConfig {
        id: "strike".into(),
        base_value,
        crit_bonus: 0.0,
        ..Default::default()
    }
}

fn timed(pre: f32, lock: f32, post: f32) -> AbilityConfig {
    AbilityConfig {
        id: "timed".into(),
        pre_cast: pre,
        cast_lock: lock,
        post_cast: post,
        cooldown: 1.0,
        ..Default::default()
    }
}

/// Resolve then apply one hit, returning whether it landed.
fn hit(
    resolver: &mut impl HitResolver,
    attacker: &StatBlock,
    target: &mut StatBlock,
    status: &mut StatusEffects,
    ability: &AbilityConfig,
) -> bool {
    let packet = ability.to_packet();
    if !resolver.try_resolve_hit(Some(attacker), Some(target), &packet) {
        return false;
    }
    resolver.apply_damage(Some(attacker), target, status, &packet);
    true
}

/// Advance a cast in fixed steps, counting keyframes until it finishes.
fn run_cast(controller: &mut CastController, dt: f32, max_steps: usize) -> (usize, bool) {
    let mut keyframes = 0;
    for _ in 0..max_steps {
        for signal in controller.advance(dt) {
            match signal {
                CastSignal::Keyframe(_) => keyframes += 1,
                CastSignal::Finished(_) => return (keyframes, true),
            }
        }
    }
    (keyframes, false)
}

// =============================================================================
// Damage Resolution
// =============================================================================

#[test]
fn test_plain_hit_removes_base_value() {
    let mut resolver = DamageResolver::new(ScriptedRolls::constant(0.5));
    let attacker = StatBlock::default();
    let mut target = StatBlock::default();
    let mut status = StatusEffects::default();

    assert!(hit(&mut resolver, &attacker, &mut target, &mut status, &strike(50.0)));
    assert_eq!(target.hp, 50.0);
    assert!(status.is_clear());
}

#[test]
fn test_ignite_bonus_amplifies_fire_damage() {
    let mut resolver = DamageResolver::new(ScriptedRolls::constant(0.5));
    let attacker = StatBlock::default();
    let mut target = StatBlock::default();
    let mut status = StatusEffects::default();
    let fireball = AbilityConfig {
        element: Element::Fire,
        ignite_bonus: 0.5,
        ..strike(50.0)
    };

    assert!(hit(&mut resolver, &attacker, &mut target, &mut status, &fireball));
    assert_eq!(target.hp, 25.0);
    assert_eq!(status.ignite_stacks, 0.5);
    assert!(status.ignite_timer > 0.0);
}

#[test]
fn test_dodged_hit_changes_nothing() {
    // First roll is the dodge check
    let mut resolver = DamageResolver::new(ScriptedRolls::constant(0.1));
    let attacker = StatBlock::default();
    let mut target = StatBlock {
        dodge_chance: 0.5,
        ..Default::default()
    };
    let mut status = StatusEffects::default();
    let frost = AbilityConfig {
        element: Element::Ice,
        slow_amount: 1.0,
        ..strike(40.0)
    };

    assert!(!hit(&mut resolver, &attacker, &mut target, &mut status, &frost));
    assert_eq!(target.hp, 100.0);
    assert!(status.is_clear());
}

#[test]
fn test_damage_never_heals_or_overflows() {
    let mut resolver = DamageResolver::new(ScriptedRolls::constant(0.99));
    let attacker = StatBlock::default();
    let mut status = StatusEffects::default();

    for base in [0.0, 1.0, 35.5, 99.0, 500.0, -20.0] {
        let mut target = StatBlock::default();
        target.hp = 60.0;
        let before = target.hp;
        hit(&mut resolver, &attacker, &mut target, &mut status, &strike(base));
        assert!(target.hp >= 0.0, "hp went negative for base {}", base);
        assert!(target.hp <= before, "hp increased for base {}", base);
        assert!(target.hp <= target.max_hp);
    }
}

#[test]
fn test_full_resist_blocks_damage() {
    let mut resolver = DamageResolver::new(ScriptedRolls::constant(0.5));
    let attacker = StatBlock::default();
    let mut target = StatBlock::default();
    target.resist.fire = 0.7;
    target.resist.physical = 0.7;
    let mut status = StatusEffects::default();
    let fire = AbilityConfig {
        element: Element::Fire,
        ..strike(80.0)
    };

    assert!(hit(&mut resolver, &attacker, &mut target, &mut status, &fire));
    assert_eq!(target.hp, 100.0);
}

#[test]
fn test_dead_target_cannot_be_hit() {
    let mut resolver = DamageResolver::new(ScriptedRolls::constant(0.5));
    let attacker = StatBlock::default();
    let mut target = StatBlock::default();
    target.hp = 0.0;

    assert!(!resolver.try_resolve_hit(Some(&attacker), Some(&target), &strike(10.0).to_packet()));
    assert!(!resolver.try_resolve_hit(None, Some(&StatBlock::default()), &strike(10.0).to_packet()));
}

// =============================================================================
// Mana and Status
// =============================================================================

#[test]
fn test_consume_mana_rejects_overdraw() {
    let mut stats = StatBlock::with_pools(100.0, 50.0);
    stats.mp = 10.0;

    assert!(!stats.consume_mana(15.0));
    assert_eq!(stats.mp, 10.0);
    assert!(stats.consume_mana(10.0));
    assert_eq!(stats.mp, 0.0);
}

#[test]
fn test_slow_stacks_add_and_timer_takes_max() {
    let mut status = StatusEffects::default();
    status.apply_slow(2.0, 3.0, true);
    status.tick(1.0);
    status.apply_slow(2.0, 3.0, true);

    assert_eq!(status.slow_stacks, 4.0);
    assert_eq!(status.slow_timer, 3.0);

    status.tick(3.0);
    assert_eq!(status.slow_stacks, 0.0);
    assert_eq!(status.slow_timer, 0.0);
}

// =============================================================================
// Cast Timing
// =============================================================================

#[test]
fn test_keyframe_fires_once_for_any_offset() {
    for offset in [-1.0, 0.0, 0.25, 0.5, 1.0, 3.0] {
        let mut controller = CastController::new(offset);
        assert!(controller.start_cast(&timed(0.2, 0.4, 0.2), 1.0, None, Vec3::ZERO));

        let (keyframes, finished) = run_cast(&mut controller, 1.0 / 60.0, 600);
        assert!(finished, "cast with offset {} never finished", offset);
        assert_eq!(keyframes, 1, "offset {} fired {} keyframes", offset, keyframes);
        assert!(!controller.is_casting());
    }
}

#[test]
fn test_keyframe_fires_once_with_zero_length_phases() {
    let mut controller = CastController::new(0.5);
    assert!(controller.start_cast(&timed(0.0, 0.0, 0.0), 1.0, None, Vec3::ZERO));

    let (keyframes, finished) = run_cast(&mut controller, 1.0 / 60.0, 10);
    assert!(finished);
    assert_eq!(keyframes, 1);
}

#[test]
fn test_start_cast_while_casting_is_noop() {
    let mut controller = CastController::new(0.5);
    let first = timed(0.5, 0.5, 0.5);
    let second = AbilityConfig {
        id: "other".into(),
        ..timed(0.1, 0.1, 0.1)
    };

    assert!(controller.start_cast(&first, 1.0, None, Vec3::ZERO));
    controller.advance(0.1);
    assert!(!controller.start_cast(&second, 1.0, None, Vec3::ONE));
    assert_eq!(controller.intent().map(|i| i.ability.id.as_str()), Some("timed"));
}

#[test]
fn test_interrupt_drops_pending_keyframe() {
    let mut controller = CastController::new(0.5);
    assert!(controller.start_cast(&timed(0.3, 0.3, 0.3), 1.0, None, Vec3::ZERO));
    controller.advance(0.35);

    assert!(controller.interrupt().is_some());
    let (keyframes, finished) = run_cast(&mut controller, 0.1, 20);
    assert_eq!(keyframes, 0);
    assert!(!finished);
}

// =============================================================================
// Cooldowns
// =============================================================================

#[test]
fn test_cooldown_gates_selection_until_elapsed() {
    let ability = AbilityConfig {
        cooldown: 1.0,
        ..strike(10.0)
    };
    let mut ai = CombatAi::new(vec![ability.clone()], FactionMask::ENEMIES);
    assert_eq!(ai.pick_ready_ability(0.0), Some(0));

    ai.set_cooldown(&ability);
    let dt = 1.0 / 60.0;
    let mut elapsed = 0.0;
    while ai.pick_ready_ability(0.0).is_none() {
        ai.decay_cooldowns(dt);
        elapsed += dt;
        assert!(ai.cooldown_remaining("strike") >= 0.0);
        assert!(elapsed < 2.0, "cooldown never expired");
    }
    assert!((elapsed - 1.0).abs() <= dt + 1e-4, "ready after {}", elapsed);
    assert_eq!(ai.cooldown_remaining("strike"), 0.0);
}

#[test]
fn test_unaffordable_ability_is_skipped() {
    let expensive = AbilityConfig {
        id: "nova".into(),
        mana_cost: 30.0,
        ..Default::default()
    };
    let cheap = strike(5.0);
    let ai = CombatAi::new(vec![expensive, cheap], FactionMask::ENEMIES);

    assert_eq!(ai.pick_ready_ability(10.0), Some(1));
    assert_eq!(ai.pick_ready_ability(30.0), Some(0));
}
