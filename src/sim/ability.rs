//! Ability Descriptors
//!
//! Immutable ability configuration built from skill rows, plus the transient
//! damage packet that flows through hit resolution.
//!
//! ## Enums
//!
//! - `AbilityShape`: spatial targeting shape (cone, projectile, chain, ...)
//! - `DamageType`: physical or magical, selects the type resist
//! - `Element`: elemental channel, selects the element resist and side effects
//!
//! Enum names in data rows are matched case-insensitively and fall back to a
//! default variant when unrecognized.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Spatial shape an ability uses to pick its targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum AbilityShape {
    Cone,
    Projectile,
    Chain,
    TargetPoint,
    #[default]
    TargetActor,
    SelfAoe,
}

/// Damage category, selects which type resist applies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum DamageType {
    Physical,
    #[default]
    Magical,
}

/// Elemental channel of a hit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Element {
    #[default]
    None,
    Ice,
    Fire,
    Lightning,
    Poison,
}

/// Parse an enum name leniently: trimmed, case-insensitive, falling back to
/// the type's default when the name is empty or unknown.
pub fn parse_or_default<T>(raw: &str) -> T
where
    T: std::str::FromStr + Default,
{
    raw.trim().parse().unwrap_or_default()
}

/// Runtime ability descriptor. Built once from a data row and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityConfig {
    pub id: String,
    pub name: String,
    pub shape: AbilityShape,
    pub damage_type: DamageType,
    pub element: Element,
    pub base_value: f32,
    pub crit_bonus: f32,
    pub crit_multiplier: f32,
    pub mana_cost: f32,
    /// Seconds before the ability can be selected again after a cast finishes
    pub cooldown: f32,
    pub pre_cast: f32,
    pub cast_lock: f32,
    pub post_cast: f32,
    pub radius: f32,
    /// Full cone angle in degrees
    pub angle: f32,
    /// Maximum targets hit by area shapes (0 or negative = unlimited)
    pub max_targets: i32,
    pub chain_count: u32,
    pub knockback_force: f32,
    pub ignite_bonus: f32,
    pub slow_amount: f32,
}

impl Default for AbilityConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            shape: AbilityShape::TargetActor,
            damage_type: DamageType::Physical,
            element: Element::None,
            base_value: 0.0,
            crit_bonus: 0.0,
            crit_multiplier: 2.0,
            mana_cost: 0.0,
            cooldown: 0.0,
            pre_cast: 0.0,
            cast_lock: 0.0,
            post_cast: 0.0,
            radius: 3.0,
            angle: 90.0,
            max_targets: 1,
            chain_count: 0,
            knockback_force: 0.0,
            ignite_bonus: 0.0,
            slow_amount: 0.0,
        }
    }
}

impl AbilityConfig {
    /// Build the damage packet for one hit application.
    pub fn to_packet(&self) -> DamagePacket {
        DamagePacket {
            damage_type: self.damage_type,
            element: self.element,
            base_value: self.base_value,
            crit_chance: self.crit_bonus,
            crit_multiplier: self.crit_multiplier,
            ignite_bonus_stack: self.ignite_bonus,
            slow_amount: self.slow_amount,
            allow_lightning_double: self.element == Element::Lightning,
            chain_count: self.chain_count,
            knockback_force: self.knockback_force,
        }
    }

    /// Total cast duration at attack speed 1.0.
    pub fn total_cast_time(&self) -> f32 {
        self.pre_cast + self.cast_lock + self.post_cast
    }
}

/// Ephemeral value carried through hit resolution; one per hit application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamagePacket {
    pub damage_type: DamageType,
    pub element: Element,
    pub base_value: f32,
    /// Added to the attacker's own crit chance
    pub crit_chance: f32,
    /// Used when no attacker stat block is available
    pub crit_multiplier: f32,
    pub ignite_bonus_stack: f32,
    pub slow_amount: f32,
    pub allow_lightning_double: bool,
    pub chain_count: u32,
    pub knockback_force: f32,
}

impl Default for DamagePacket {
    fn default() -> Self {
        AbilityConfig::default().to_packet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(parse_or_default::<AbilityShape>("cone"), AbilityShape::Cone);
        assert_eq!(parse_or_default::<AbilityShape>("SELFAOE"), AbilityShape::SelfAoe);
        assert_eq!(parse_or_default::<Element>(" Fire "), Element::Fire);
        assert_eq!(parse_or_default::<DamageType>("physical"), DamageType::Physical);
    }

    #[test]
    fn test_parse_falls_back_to_defaults() {
        assert_eq!(parse_or_default::<AbilityShape>("Meteor"), AbilityShape::TargetActor);
        assert_eq!(parse_or_default::<DamageType>(""), DamageType::Magical);
        assert_eq!(parse_or_default::<Element>("Shadow"), Element::None);
    }

    #[test]
    fn test_packet_derives_lightning_double() {
        let lightning = AbilityConfig {
            element: Element::Lightning,
            ..default_config()
        };
        assert!(lightning.to_packet().allow_lightning_double);

        let fire = AbilityConfig {
            element: Element::Fire,
            ..default_config()
        };
        assert!(!fire.to_packet().allow_lightning_double);
    }

    #[test]
    fn test_packet_copies_crit_bonus_into_crit_chance() {
        let config = AbilityConfig {
            crit_bonus: 0.15,
            crit_multiplier: 3.0,
            ..default_config()
        };
        let packet = config.to_packet();
        assert_eq!(packet.crit_chance, 0.15);
        assert_eq!(packet.crit_multiplier, 3.0);
    }

    #[test]
    fn test_config_defaults() {
        let config = default_config();
        assert_eq!(config.crit_multiplier, 2.0);
        assert_eq!(config.radius, 3.0);
        assert_eq!(config.angle, 90.0);
        assert_eq!(config.max_targets, 1);
    }

    fn default_config() -> AbilityConfig {
        AbilityConfig::default()
    }
}
