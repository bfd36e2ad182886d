//! Cast Timing State Machine
//!
//! Each actor carries a `CastController` that walks one cast at a time
//! through its phases:
//!
//! ```text
//! Idle -> PreCast -> CastLock -> PostCast -> Idle
//! ```
//!
//! Phase durations are the ability's timings divided by the caster's attack
//! speed (clamped to a minimum). The keyframe fires once elapsed lock time
//! reaches `clamp01(keyframe_offset) * lock`, and at the end of the lock if it
//! has not fired yet, so every completed cast fires it exactly once.
//!
//! `advance` returns the keyframe and finish signals for the caller to act
//! on. Time left over after a phase ends carries into the next phase.
//! `interrupt` abandons the cast in any phase, including cast-lock, without
//! emitting a finish signal.

use bevy::prelude::*;
use smallvec::SmallVec;

use super::ability::AbilityConfig;
use super::constants::{DEFAULT_KEYFRAME_OFFSET, MIN_ATTACK_SPEED};

/// Timing phase of an ability cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CastPhase {
    #[default]
    Idle,
    /// Wind-up
    PreCast,
    /// Committed window containing the keyframe
    CastLock,
    /// Recovery
    PostCast,
}

/// Phase durations after attack-speed scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastTiming {
    pub pre_cast: f32,
    pub cast_lock: f32,
    pub post_cast: f32,
    /// Elapsed lock time at which the keyframe fires
    pub keyframe_at: f32,
}

impl CastTiming {
    pub fn scaled(ability: &AbilityConfig, attack_speed: f32, keyframe_offset: f32) -> Self {
        let speed = attack_speed.max(MIN_ATTACK_SPEED);
        let cast_lock = (ability.cast_lock / speed).max(0.0);
        Self {
            pre_cast: (ability.pre_cast / speed).max(0.0),
            cast_lock,
            post_cast: (ability.post_cast / speed).max(0.0),
            keyframe_at: keyframe_offset.clamp(0.0, 1.0) * cast_lock,
        }
    }

    pub fn total(&self) -> f32 {
        self.pre_cast + self.cast_lock + self.post_cast
    }
}

/// What a cast is for: the ability and who or where it aims at.
#[derive(Debug, Clone, PartialEq)]
pub struct CastIntent {
    pub ability: AbilityConfig,
    pub target: Option<Entity>,
    /// Last known aim point, used if the target is gone at the keyframe
    pub aim_point: Vec3,
}

/// Signals emitted by `CastController::advance`.
#[derive(Debug, Clone, PartialEq)]
pub enum CastSignal {
    /// Apply the ability's gameplay effect now
    Keyframe(CastIntent),
    /// The cast completed its post-cast phase
    Finished(CastIntent),
}

pub type CastSignals = SmallVec<[CastSignal; 2]>;

#[derive(Debug, Clone)]
struct ActiveCast {
    intent: CastIntent,
    timing: CastTiming,
    phase: CastPhase,
    elapsed: f32,
    keyframe_fired: bool,
}

/// Per-actor cast state. At most one cast is in flight.
#[derive(Component, Debug, Clone)]
pub struct CastController {
    active: Option<ActiveCast>,
    /// Keyframe position within cast-lock, clamped to [0, 1] when used
    pub keyframe_offset: f32,
}

impl Default for CastController {
    fn default() -> Self {
        Self::new(DEFAULT_KEYFRAME_OFFSET)
    }
}

impl CastController {
    pub fn new(keyframe_offset: f32) -> Self {
        Self {
            active: None,
            keyframe_offset,
        }
    }

    pub fn is_casting(&self) -> bool {
        self.active.is_some()
    }

    pub fn phase(&self) -> CastPhase {
        self.active.as_ref().map_or(CastPhase::Idle, |c| c.phase)
    }

    /// The cast in flight, if any.
    pub fn intent(&self) -> Option<&CastIntent> {
        self.active.as_ref().map(|c| &c.intent)
    }

    pub fn timing(&self) -> Option<CastTiming> {
        self.active.as_ref().map(|c| c.timing)
    }

    /// Begin casting. Returns false and changes nothing if a cast is already
    /// in flight.
    pub fn start_cast(
        &mut self,
        ability: &AbilityConfig,
        attack_speed: f32,
        target: Option<Entity>,
        aim_point: Vec3,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(ActiveCast {
            intent: CastIntent {
                ability: ability.clone(),
                target,
                aim_point,
            },
            timing: CastTiming::scaled(ability, attack_speed, self.keyframe_offset),
            phase: CastPhase::PreCast,
            elapsed: 0.0,
            keyframe_fired: false,
        });
        true
    }

    /// Abandon the current cast in any phase. Pending keyframe and finish
    /// signals are dropped. Returns the abandoned intent.
    pub fn interrupt(&mut self) -> Option<CastIntent> {
        self.active.take().map(|c| c.intent)
    }

    /// Advance the cast by `dt` seconds, returning any signals crossed.
    pub fn advance(&mut self, dt: f32) -> CastSignals {
        let mut signals = CastSignals::new();
        let Some(cast) = self.active.as_mut() else {
            return signals;
        };
        cast.elapsed += dt.max(0.0);

        let mut finished = false;
        loop {
            match cast.phase {
                CastPhase::PreCast => {
                    if cast.elapsed < cast.timing.pre_cast {
                        break;
                    }
                    cast.elapsed -= cast.timing.pre_cast;
                    cast.phase = CastPhase::CastLock;
                }
                CastPhase::CastLock => {
                    if !cast.keyframe_fired && cast.elapsed >= cast.timing.keyframe_at {
                        cast.keyframe_fired = true;
                        signals.push(CastSignal::Keyframe(cast.intent.clone()));
                    }
                    if cast.elapsed < cast.timing.cast_lock {
                        break;
                    }
                    if !cast.keyframe_fired {
                        cast.keyframe_fired = true;
                        signals.push(CastSignal::Keyframe(cast.intent.clone()));
                    }
                    cast.elapsed -= cast.timing.cast_lock;
                    cast.phase = CastPhase::PostCast;
                }
                CastPhase::PostCast => {
                    finished = cast.elapsed >= cast.timing.post_cast;
                    break;
                }
                CastPhase::Idle => break,
            }
        }

        if finished {
            if let Some(done) = self.active.take() {
                signals.push(CastSignal::Finished(done.intent));
            }
        }
        signals
    }
}
