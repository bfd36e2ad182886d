//! Data Tables
//!
//! Flat row records keyed by integer id, one table per row type. Rows are
//! plain data; every field has a default so sparse RON rows load.
//!
//! ## Tables
//!
//! | Row | Table name |
//! |-----|-----------|
//! | `SkillRow` | `SkillData` |
//! | `HeroRow` | `HeroData` |
//! | `EnemyRow` | `EnemyData` |
//! | `WaveRow` | `WaveData` |
//! | `WaveEntryRow` | `WaveEntryData` |
//! | `WaveRewardRow` | `WaveRewardData` |
//! | `ResistProfileRow` | `ResistProfileData` |

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{DataError, Result};

/// A row type with a table name and an integer id.
pub trait TableRow: DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE_NAME: &'static str;

    fn id(&self) -> u32;
}

/// Ordered rows of one table.
#[derive(Debug, Clone)]
pub struct DataTable<R> {
    rows: Vec<R>,
}

impl<R> Default for DataTable<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: TableRow> DataTable<R> {
    /// Build a table, rejecting duplicate ids.
    pub fn new(rows: Vec<R>) -> Result<Self> {
        let mut seen = HashSet::new();
        for row in &rows {
            if !seen.insert(row.id()) {
                return Err(DataError::DuplicateId {
                    table: R::TABLE_NAME.to_string(),
                    id: row.id(),
                });
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn get_by_id(&self, id: u32) -> Option<&R> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Rows
// ============================================================================

/// One ability/skill definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRow {
    pub id: u32,
    pub name: String,
    pub element: String,
    pub damage_type: String,
    pub shape: String,
    pub base_value: f32,
    pub crit_bonus: f32,
    pub crit_multiplier: f32,
    pub mana_cost: f32,
    pub cooldown: f32,
    pub pre_cast: f32,
    pub cast_lock: f32,
    pub post_cast: f32,
    pub radius: f32,
    pub angle: f32,
    pub max_targets: i32,
    pub chain_count: u32,
    pub knockback_force: f32,
    pub ignite_bonus: f32,
    pub slow_amount: f32,
    pub notes: String,
}

impl Default for SkillRow {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            element: String::new(),
            damage_type: String::new(),
            shape: String::new(),
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
            notes: String::new(),
        }
    }
}

/// Stat columns shared by hero and enemy rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorStatColumns {
    pub base_hp: f32,
    pub base_mp: f32,
    pub armor: f32,
    pub physical_resist: f32,
    pub magical_resist: f32,
    pub ice_resist: f32,
    pub fire_resist: f32,
    pub lightning_resist: f32,
    pub poison_resist: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub dodge: f32,
    pub attack_speed: f32,
    /// Zero means "use the resist columns directly"
    pub resist_profile_id: u32,
}

impl Default for ActorStatColumns {
    fn default() -> Self {
        Self {
            base_hp: 100.0,
            base_mp: 0.0,
            armor: 0.0,
            physical_resist: 0.0,
            magical_resist: 0.0,
            ice_resist: 0.0,
            fire_resist: 0.0,
            lightning_resist: 0.0,
            poison_resist: 0.0,
            crit_chance: 0.0,
            crit_multiplier: 2.0,
            dodge: 0.0,
            attack_speed: 1.0,
            resist_profile_id: 0,
        }
    }
}

/// A playable hero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroRow {
    pub id: u32,
    pub name: String,
    pub role: String,
    pub primary_element: String,
    pub stats: ActorStatColumns,
    /// Skill ids separated by `;` or `,`
    pub base_skills: String,
    pub ai_behavior_id: u32,
    pub prefab_path: String,
}

/// An enemy type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyRow {
    pub id: u32,
    pub name: String,
    pub role: String,
    pub primary_element: String,
    pub stats: ActorStatColumns,
    /// The enemy's single skill id
    pub base_skills: u32,
    pub ai_behavior_id: u32,
    pub prefab_path: String,
}

/// One wave of an encounter, looked up by `wave_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveRow {
    pub id: u32,
    pub name: String,
    pub wave_index: u32,
    pub is_boss_wave: bool,
    pub difficulty_scalar: f32,
    pub prep_time: f32,
    pub auto_start: bool,
    /// Gold bonus fraction when the wave was started early
    pub early_start_bonus: f32,
    pub reward_table_id: String,
    pub spawn_point_group_name: String,
    pub center_point_name: String,
    pub enemy_prefab_path: String,
}

impl Default for WaveRow {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            wave_index: 0,
            is_boss_wave: false,
            difficulty_scalar: 1.0,
            prep_time: 0.0,
            auto_start: true,
            early_start_bonus: 0.0,
            reward_table_id: String::new(),
            spawn_point_group_name: String::new(),
            center_point_name: String::new(),
            enemy_prefab_path: String::new(),
        }
    }
}

/// A batch of identical enemies within a wave.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveEntryRow {
    pub id: u32,
    pub wave_id: u32,
    pub enemy_id: u32,
    pub count: u32,
    /// `circle`, `arc`, `center` or anything else for a random spawn point
    pub spawn_pattern: String,
    pub spawn_delay: f32,
    pub is_elite: bool,
    pub affix_tags: u32,
}

/// Rewards granted for clearing a wave.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveRewardRow {
    pub id: u32,
    pub reward_table_id: String,
    pub rarity_bias: f32,
    pub gold_min: i32,
    pub gold_max: i32,
    pub material_pool: u32,
    pub consumable_pool: u32,
    pub item_pool_id: String,
    pub score_to_loot_scalar: f32,
}

/// Reusable elemental resist bundle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResistProfileRow {
    pub id: u32,
    pub ice_resist: f32,
    pub fire_resist: f32,
    pub lightning_resist: f32,
    pub poison_resist: f32,
    pub immunity_flags: String,
}

macro_rules! table_row {
    ($($row:ty => $name:literal),* $(,)?) => {
        $(
            impl TableRow for $row {
                const TABLE_NAME: &'static str = $name;

                fn id(&self) -> u32 {
                    self.id
                }
            }
        )*
    };
}

table_row! {
    SkillRow => "SkillData",
    HeroRow => "HeroData",
    EnemyRow => "EnemyData",
    WaveRow => "WaveData",
    WaveEntryRow => "WaveEntryData",
    WaveRewardRow => "WaveRewardData",
    ResistProfileRow => "ResistProfileData",
}

// ============================================================================
// Table Set
// ============================================================================

/// Every table the combat core reads.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    pub skills: DataTable<SkillRow>,
    pub heroes: DataTable<HeroRow>,
    pub enemies: DataTable<EnemyRow>,
    pub waves: DataTable<WaveRow>,
    pub wave_entries: DataTable<WaveEntryRow>,
    pub wave_rewards: DataTable<WaveRewardRow>,
    pub resist_profiles: DataTable<ResistProfileRow>,
}

/// Typed access to one table of a `TableSet`.
pub trait HasTable<R: TableRow> {
    fn table(&self) -> &DataTable<R>;
}

macro_rules! has_table {
    ($($row:ty => $field:ident),* $(,)?) => {
        $(
            impl HasTable<$row> for TableSet {
                fn table(&self) -> &DataTable<$row> {
                    &self.$field
                }
            }
        )*
    };
}

has_table! {
    SkillRow => skills,
    HeroRow => heroes,
    EnemyRow => enemies,
    WaveRow => waves,
    WaveEntryRow => wave_entries,
    WaveRewardRow => wave_rewards,
    ResistProfileRow => resist_profiles,
}

/// Split a `;`/`,` separated id list, skipping blanks and non-numbers.
pub fn parse_id_list(raw: &str) -> Vec<u32> {
    raw.split([';', ','])
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(id: u32) -> SkillRow {
        SkillRow {
            id,
            name: format!("skill {id}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_get_by_id() {
        let table = DataTable::new(vec![skill(1), skill(7)]).unwrap();
        assert_eq!(table.get_by_id(7).map(|r| r.name.as_str()), Some("skill 7"));
        assert!(table.get_by_id(3).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = DataTable::new(vec![skill(1), skill(1)]).unwrap_err();
        assert!(matches!(err, DataError::DuplicateId { id: 1, .. }));
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("1;2,3"), vec![1, 2, 3]);
        assert_eq!(parse_id_list(" 4 ; ;x; 5 "), vec![4, 5]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn test_sparse_rows_take_defaults() {
        let rows: Vec<SkillRow> = ron::from_str("[(id: 3, name: \"Jab\")]").unwrap();
        assert_eq!(rows[0].radius, 3.0);
        assert_eq!(rows[0].max_targets, 1);

        let heroes: Vec<HeroRow> = ron::from_str("[(id: 1, stats: (base_hp: 250.0), base_skills: \"1;2\")]").unwrap();
        assert_eq!(heroes[0].stats.base_hp, 250.0);
        assert_eq!(heroes[0].stats.attack_speed, 1.0);
    }

    #[test]
    fn test_table_names() {
        assert_eq!(SkillRow::TABLE_NAME, "SkillData");
        assert_eq!(ResistProfileRow::TABLE_NAME, "ResistProfileData");
    }
}
