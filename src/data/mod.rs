//! Data-driven configuration: row tables, their sources, the lookup
//! registry and the prefab catalog.

pub mod error;
pub mod prefabs;
pub mod registry;
pub mod source;
pub mod tables;

pub use error::DataError;
pub use prefabs::{ActorTemplate, PrefabCatalog};
pub use registry::CombatDataRegistry;
pub use source::{InMemorySource, RonDirectory, TableSource};
pub use tables::{
    DataTable, EnemyRow, HeroRow, ResistProfileRow, SkillRow, TableRow, TableSet, WaveEntryRow,
    WaveRewardRow, WaveRow,
};
