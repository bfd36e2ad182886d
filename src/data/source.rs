//! Where table text comes from.
//!
//! Tables are RON lists of rows. `RonDirectory` reads `<root>/<TableName>.ron`
//! from disk; `InMemorySource` serves strings, mainly for tests. A table that
//! does not exist loads as empty with a warning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bevy::prelude::*;

use super::error::{DataError, Result};
use super::tables::{DataTable, TableRow, TableSet};

/// Supplier of raw table text by table name.
pub trait TableSource: Send + Sync {
    /// RON text of the table, or `None` when the table does not exist.
    fn read_table(&self, name: &str) -> Result<Option<String>>;

    /// Human-readable location, for log lines.
    fn describe(&self) -> String;
}

/// Tables stored as `<TableName>.ron` files in one directory.
#[derive(Debug, Clone)]
pub struct RonDirectory {
    root: PathBuf,
}

impl RonDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.ron"))
    }
}

impl TableSource for RonDirectory {
    fn read_table(&self, name: &str) -> Result<Option<String>> {
        let path = self.table_path(name);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(DataError::Io {
                table: name.to_string(),
                path,
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Tables held as strings.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tables: HashMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, ron_text: impl Into<String>) -> Self {
        self.tables.insert(name.into(), ron_text.into());
        self
    }
}

impl TableSource for InMemorySource {
    fn read_table(&self, name: &str) -> Result<Option<String>> {
        Ok(self.tables.get(name).cloned())
    }

    fn describe(&self) -> String {
        format!("in-memory ({} tables)", self.tables.len())
    }
}

/// Load and parse one table. Missing tables come back empty.
pub fn load_table<R: TableRow>(source: &dyn TableSource) -> Result<DataTable<R>> {
    let Some(text) = source.read_table(R::TABLE_NAME)? else {
        warn!("Table {} not found in {}, using an empty table", R::TABLE_NAME, source.describe());
        return Ok(DataTable::default());
    };

    let rows: Vec<R> = ron::from_str(&text).map_err(|e| DataError::Parse {
        table: R::TABLE_NAME.to_string(),
        message: e.to_string(),
    })?;

    DataTable::new(rows)
}

impl TableSet {
    /// Load every table from `source`.
    pub fn load(source: &dyn TableSource) -> Result<Self> {
        let tables = Self {
            skills: load_table(source)?,
            heroes: load_table(source)?,
            enemies: load_table(source)?,
            waves: load_table(source)?,
            wave_entries: load_table(source)?,
            wave_rewards: load_table(source)?,
            resist_profiles: load_table(source)?,
        };

        info!(
            "Loaded combat data from {}: {} skills, {} heroes, {} enemies, {} waves",
            source.describe(),
            tables.skills.len(),
            tables.heroes.len(),
            tables.enemies.len(),
            tables.waves.len()
        );

        Ok(tables)
    }
}
