//! Combat events
//!
//! Notifications published by the simulation for logging, presentation and
//! encounter tracking. Nothing in the combat core depends on who listens.

use bevy::prelude::*;
use serde::Serialize;

use crate::sim::components::Faction;

/// A resolved hit dealt damage.
#[derive(Event, Debug, Clone)]
pub struct HitLanded {
    pub attacker: Entity,
    pub target: Entity,
    pub ability_id: String,
    /// Damage after mitigation
    pub damage: f32,
    pub critical: bool,
    pub killing_blow: bool,
}

/// A hit attempt was dodged.
#[derive(Event, Debug, Clone)]
pub struct HitDodged {
    pub attacker: Entity,
    pub target: Entity,
    pub ability_id: String,
}

/// An actor started casting.
#[derive(Event, Debug, Clone)]
pub struct CastStarted {
    pub caster: Entity,
    pub ability_id: String,
    pub target: Option<Entity>,
}

/// An actor's health reached zero. Sent once per actor.
#[derive(Event, Debug, Clone)]
pub struct ActorDied {
    pub entity: Entity,
    pub actor_id: String,
    pub faction: Faction,
}

/// Presentation trigger. Fire-and-forget; the simulation never waits on it.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationCue {
    pub entity: Entity,
    pub kind: AnimationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    Attack,
    Hit,
    Death,
}

// ============================================================================
// Wave notifications
// ============================================================================

/// A wave entered its prep phase.
#[derive(Event, Debug, Clone)]
pub struct WaveStarted {
    pub wave_index: u32,
    pub name: String,
    pub is_boss: bool,
}

/// Remaining prep time, sent every prep tick.
#[derive(Event, Debug, Clone, Copy)]
pub struct PrepTimerChanged {
    pub wave_index: u32,
    pub remaining: f32,
}

/// Every enemy of the wave is gone.
#[derive(Event, Debug, Clone, Copy)]
pub struct WaveCompleted {
    pub wave_index: u32,
}

/// Reward kinds a reward table can drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RewardType {
    Gold,
    Item,
    Material,
    Consumable,
}

/// One dropped reward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardDrop {
    pub reward_type: RewardType,
    /// Item or material id; zero for gold
    pub item_id: u32,
    pub amount: i32,
}

/// Rewards for a cleared wave.
#[derive(Event, Debug, Clone)]
pub struct RewardsDropped {
    pub wave_index: u32,
    pub rewards: Vec<RewardDrop>,
    pub drop_point: Vec3,
}

/// No further wave is defined; the wave loop has ended.
#[derive(Event, Debug, Clone, Copy)]
pub struct AllWavesCleared {
    pub waves_cleared: u32,
}

/// Input signal asking the current prep phase to end early.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct EarlyStartRequested;
