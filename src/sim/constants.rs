//! Combat Constants
//!
//! Centralized location for the tuning numbers used throughout the simulation.

// ============================================================================
// Elemental Side Effects
// ============================================================================

/// Duration of the slow applied by ice hits.
pub const ICE_SLOW_DURATION: f32 = 3.0;

/// Duration of the ignite stacks applied by fire hits.
pub const IGNITE_DURATION: f32 = 6.0;

/// Armor-shred value applied by every poison hit.
pub const CORRODE_VALUE: f32 = 0.08;

/// Duration of the corrode applied by poison hits.
pub const CORRODE_DURATION: f32 = 6.0;

/// Duration of the chain mark applied by lightning hits.
pub const CHAIN_MARK_DURATION: f32 = 3.0;

/// Probability that a lightning packet deals double damage.
pub const LIGHTNING_DOUBLE_CHANCE: f32 = 0.25;

// ============================================================================
// Casting
// ============================================================================

/// Lower bound on attack speed when scaling cast phases.
pub const MIN_ATTACK_SPEED: f32 = 0.01;

/// Keyframe position within cast-lock when none is configured.
pub const DEFAULT_KEYFRAME_OFFSET: f32 = 0.5;

// ============================================================================
// Spatial Queries
// ============================================================================

/// Height above an actor's feet that projectile rays start from.
pub const PROJECTILE_RAY_HEIGHT: f32 = 0.5;

/// Radius of the collision volume rays test against.
pub const ACTOR_HIT_RADIUS: f32 = 0.5;

// ============================================================================
// AI and Movement
// ============================================================================

/// Default radius the AI scans for targets.
pub const DEFAULT_SCAN_RADIUS: f32 = 8.0;

/// Default distance at which the AI stops approaching and starts casting.
pub const DEFAULT_ATTACK_RANGE: f32 = 2.5;

/// Default movement speed in units per second.
pub const DEFAULT_MOVE_SPEED: f32 = 3.5;

/// Default distance at which `move_to` considers the destination reached.
pub const DEFAULT_STOPPING_DISTANCE: f32 = 0.5;

/// Slack on range and stop-ring checks so an actor parked on the ring by
/// float rounding still counts as in range.
pub const RANGE_TOLERANCE: f32 = 1e-3;

// ============================================================================
// Lifecycle
// ============================================================================

/// Seconds a dead actor lingers before it is removed from the world.
pub const CORPSE_DURATION: f32 = 1.0;
