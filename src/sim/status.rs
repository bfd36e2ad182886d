//! Status Effect Tracker
//!
//! Per-actor timed effects with independent decay timers:
//!
//! - **Slow**: stacks additively or takes the max, depending on the caller
//! - **Ignite**: always stacks additively
//! - **Corrode**: max of value and duration
//! - **Chain mark**: max of duration
//!
//! Timers only ever refresh to the longer of the current and new duration.
//! When a timer runs out its value resets to zero on the same tick.

use bevy::prelude::*;

/// Capability interface hit resolution uses to apply side effects.
pub trait StatusController {
    fn apply_slow(&mut self, amount: f32, duration: f32, stack: bool);
    fn apply_ignite(&mut self, stack: f32, duration: f32);
    fn apply_corrode(&mut self, value: f32, duration: f32);
    fn apply_chain_mark(&mut self, duration: f32);
}

/// Decaying status counters for one actor.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusEffects {
    pub slow_stacks: f32,
    pub slow_timer: f32,
    pub ignite_stacks: f32,
    pub ignite_timer: f32,
    pub corrode_value: f32,
    pub corrode_timer: f32,
    pub chain_mark_timer: f32,
}

impl StatusEffects {
    /// Advance every channel by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        decay(&mut self.slow_timer, &mut self.slow_stacks, dt);
        decay(&mut self.ignite_timer, &mut self.ignite_stacks, dt);
        decay(&mut self.corrode_timer, &mut self.corrode_value, dt);

        if self.chain_mark_timer > 0.0 {
            self.chain_mark_timer = (self.chain_mark_timer - dt).max(0.0);
        }
    }

    pub fn is_chain_marked(&self) -> bool {
        self.chain_mark_timer > 0.0
    }

    /// True when no channel is active.
    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

fn decay(timer: &mut f32, value: &mut f32, dt: f32) {
    if *timer <= 0.0 {
        return;
    }
    *timer -= dt;
    if *timer <= 0.0 {
        *timer = 0.0;
        *value = 0.0;
    }
}

impl StatusController for StatusEffects {
    fn apply_slow(&mut self, amount: f32, duration: f32, stack: bool) {
        self.slow_stacks = if stack {
            self.slow_stacks + amount
        } else {
            self.slow_stacks.max(amount)
        };
        self.slow_timer = self.slow_timer.max(duration);
    }

    fn apply_ignite(&mut self, stack: f32, duration: f32) {
        self.ignite_stacks += stack;
        self.ignite_timer = self.ignite_timer.max(duration);
    }

    fn apply_corrode(&mut self, value: f32, duration: f32) {
        self.corrode_value = self.corrode_value.max(value);
        self.corrode_timer = self.corrode_timer.max(duration);
    }

    fn apply_chain_mark(&mut self, duration: f32) {
        self.chain_mark_timer = self.chain_mark_timer.max(duration);
    }
}

/// Decay status effect timers each frame.
pub fn tick_status_effects(time: Res<Time>, mut statuses: Query<&mut StatusEffects>) {
    let dt = time.delta_secs();
    for mut status in statuses.iter_mut() {
        if !status.is_clear() {
            status.tick(dt);
        }
    }
}
