//! Combat Data Registry
//!
//! Read-only lookup over the loaded tables, plus the mapping from raw rows
//! into runtime `AbilityConfig` and `StatBlock` values.
//!
//! Tables load at most once. `initialize` loads eagerly and reports errors;
//! any lookup before that loads lazily and falls back to empty tables on
//! failure, with a warning.

use std::sync::OnceLock;

use bevy::prelude::*;

use crate::sim::ability::{parse_or_default, AbilityConfig};
use crate::sim::components::{ResistanceProfile, StatBlock};

use super::error::Result;
use super::source::{InMemorySource, TableSource};
use super::tables::{
    parse_id_list, ActorStatColumns, DataTable, EnemyRow, HasTable, HeroRow, ResistProfileRow,
    SkillRow, TableRow, TableSet, WaveEntryRow, WaveRewardRow, WaveRow,
};

/// HP multiplier for elite enemies.
pub const ELITE_HP_SCALE: f32 = 1.5;
/// Armor multiplier for elite enemies.
pub const ELITE_ARMOR_SCALE: f32 = 1.3;

#[derive(Resource)]
pub struct CombatDataRegistry {
    source: Box<dyn TableSource>,
    tables: OnceLock<TableSet>,
}

impl CombatDataRegistry {
    /// Registry that loads from `source` on first use.
    pub fn new(source: impl TableSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            tables: OnceLock::new(),
        }
    }

    /// Registry over tables that are already loaded.
    pub fn from_tables(tables: TableSet) -> Self {
        Self {
            source: Box::new(InMemorySource::new()),
            tables: OnceLock::from(tables),
        }
    }

    /// Load the tables now. Calling again after a successful load is a no-op.
    pub fn initialize(&self) -> Result<&TableSet> {
        if let Some(tables) = self.tables.get() {
            return Ok(tables);
        }
        let loaded = TableSet::load(self.source.as_ref())?;
        Ok(self.tables.get_or_init(|| loaded))
    }

    pub fn is_initialized(&self) -> bool {
        self.tables.get().is_some()
    }

    pub fn tables(&self) -> &TableSet {
        self.tables.get_or_init(|| {
            TableSet::load(self.source.as_ref()).unwrap_or_else(|e| {
                warn!("Failed to load combat data: {}", e);
                TableSet::default()
            })
        })
    }

    pub fn get_table<R: TableRow>(&self) -> &DataTable<R>
    where
        TableSet: HasTable<R>,
    {
        self.tables().table()
    }

    pub fn get_by_id<R: TableRow>(&self, id: u32) -> Option<&R>
    where
        TableSet: HasTable<R>,
    {
        self.get_table::<R>().get_by_id(id)
    }

    // ------------------------------------------------------------------
    // Abilities
    // ------------------------------------------------------------------

    /// Convert a skill row into a runtime config. Unknown enum text falls
    /// back to TargetActor / Magical / no element.
    pub fn to_config(row: &SkillRow) -> AbilityConfig {
        AbilityConfig {
            id: row.id.to_string(),
            name: row.name.clone(),
            shape: parse_or_default(&row.shape),
            damage_type: parse_or_default(&row.damage_type),
            element: parse_or_default(&row.element),
            base_value: row.base_value,
            crit_bonus: row.crit_bonus,
            crit_multiplier: row.crit_multiplier,
            mana_cost: row.mana_cost,
            cooldown: row.cooldown,
            pre_cast: row.pre_cast,
            cast_lock: row.cast_lock,
            post_cast: row.post_cast,
            radius: row.radius,
            angle: row.angle,
            max_targets: row.max_targets,
            chain_count: row.chain_count,
            knockback_force: row.knockback_force,
            ignite_bonus: row.ignite_bonus,
            slow_amount: row.slow_amount,
        }
    }

    pub fn ability_config(&self, id: u32) -> Option<AbilityConfig> {
        self.get_by_id::<SkillRow>(id).map(Self::to_config)
    }

    pub fn ability_configs(&self) -> Vec<AbilityConfig> {
        self.tables().skills.iter().map(Self::to_config).collect()
    }

    /// Configs for a list of skill ids, skipping unknown ids.
    pub fn ability_configs_for(&self, ids: &[u32]) -> Vec<AbilityConfig> {
        ids.iter()
            .filter_map(|&id| {
                let config = self.ability_config(id);
                if config.is_none() {
                    warn!("Unknown skill id {}", id);
                }
                config
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Actors
    // ------------------------------------------------------------------

    pub fn hero(&self, id: u32) -> Option<&HeroRow> {
        self.get_by_id(id)
    }

    pub fn enemy(&self, id: u32) -> Option<&EnemyRow> {
        self.get_by_id(id)
    }

    pub fn resist_profile(&self, id: u32) -> Option<&ResistProfileRow> {
        self.get_by_id(id)
    }

    /// Element resists come from the referenced profile when one exists;
    /// physical and magical always come from the row.
    pub fn resolve_resists(&self, columns: &ActorStatColumns) -> ResistanceProfile {
        let mut resist = ResistanceProfile {
            physical: columns.physical_resist,
            magical: columns.magical_resist,
            ice: columns.ice_resist,
            fire: columns.fire_resist,
            lightning: columns.lightning_resist,
            poison: columns.poison_resist,
        };

        if columns.resist_profile_id > 0 {
            match self.resist_profile(columns.resist_profile_id) {
                Some(profile) => {
                    resist.ice = profile.ice_resist;
                    resist.fire = profile.fire_resist;
                    resist.lightning = profile.lightning_resist;
                    resist.poison = profile.poison_resist;
                }
                None => warn!(
                    "Resist profile {} not found, using row resists",
                    columns.resist_profile_id
                ),
            }
        }

        resist
    }

    fn base_stats(&self, columns: &ActorStatColumns) -> StatBlock {
        let mut stats = StatBlock::with_pools(columns.base_hp, columns.base_mp);
        stats.armor = columns.armor;
        stats.crit_chance = columns.crit_chance;
        stats.crit_multiplier = columns.crit_multiplier;
        stats.dodge_chance = columns.dodge;
        stats.attack_speed = columns.attack_speed;
        stats.resist = self.resolve_resists(columns);
        stats
    }

    pub fn hero_stats(&self, row: &HeroRow) -> StatBlock {
        self.base_stats(&row.stats)
    }

    /// Enemy stats scaled by the wave's difficulty, with the elite bonus.
    pub fn enemy_stats(&self, row: &EnemyRow, difficulty: f32, elite: bool) -> StatBlock {
        let mut stats = self.base_stats(&row.stats);
        let mut max_hp = row.stats.base_hp * difficulty;
        if elite {
            max_hp *= ELITE_HP_SCALE;
            stats.armor *= ELITE_ARMOR_SCALE;
        }
        stats.max_hp = max_hp;
        stats.hp = max_hp;
        stats
    }

    pub fn hero_abilities(&self, row: &HeroRow) -> Vec<AbilityConfig> {
        self.ability_configs_for(&parse_id_list(&row.base_skills))
    }

    /// Skill id 0 means the enemy has no ability.
    pub fn enemy_abilities(&self, row: &EnemyRow) -> Vec<AbilityConfig> {
        if row.base_skills == 0 {
            return Vec::new();
        }
        self.ability_configs_for(&[row.base_skills])
    }

    // ------------------------------------------------------------------
    // Waves
    // ------------------------------------------------------------------

    pub fn wave_by_index(&self, wave_index: u32) -> Option<&WaveRow> {
        self.tables().waves.iter().find(|w| w.wave_index == wave_index)
    }

    pub fn wave_entries(&self, wave_id: u32) -> Vec<&WaveEntryRow> {
        self.tables()
            .wave_entries
            .iter()
            .filter(|e| e.wave_id == wave_id)
            .collect()
    }

    pub fn reward_table(&self, reward_table_id: &str) -> Option<&WaveRewardRow> {
        self.tables()
            .wave_rewards
            .iter()
            .find(|r| r.reward_table_id == reward_table_id)
    }
}
