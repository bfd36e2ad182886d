//! Error types raised while loading data tables.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by table sources and the registry.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read table {table} from {path}: {source}")]
    Io {
        table: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse table {table}: {message}")]
    Parse { table: String, message: String },

    #[error("duplicate id {id} in table {table}")]
    DuplicateId { table: String, id: u32 },
}

pub type Result<T> = std::result::Result<T, DataError>;
