//! Error types for loading and sampling.

use std::path::PathBuf;
use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A raw external table (or the data root itself) is absent
    #[error("Missing raw table: {}", path.display())]
    MissingReference { path: PathBuf },

    /// A foreign key in an extract does not resolve within the extract
    #[error("Unresolvable foreign key {table}.{column} = {value:?} (no such row in {target})")]
    UnresolvableForeignKey {
        table: &'static str,
        column: &'static str,
        value: String,
        target: &'static str,
    },

    /// Some writes of a batch failed; every write was still attempted
    #[error("Failed to write {} table(s): {}", failed.len(), describe_failures(failed))]
    PartialWrite { failed: Vec<(&'static str, String)> },

    /// Table store failure, surfaced unchanged
    #[error("Store error on {table}: {source}")]
    Store {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A raw record that cannot be mapped onto the canonical schema
    #[error("Invalid record in {source_name} line {line}: {message}")]
    InvalidRecord {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("{name} must be within [0, 1], got {value}")]
    InvalidFraction { name: &'static str, value: f64 },

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown environment: {0}")]
    UnknownEnv(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

impl Error {
    pub fn store(table: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Store {
            table: table.into(),
            source,
        }
    }

    pub fn invalid_record(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            source_name: source_name.to_string(),
            line,
            message: message.into(),
        }
    }
}

fn describe_failures(failed: &[(&'static str, String)]) -> String {
    failed
        .iter()
        .map(|(table, message)| format!("{table} ({message})"))
        .collect::<Vec<_>>()
        .join(", ")
}
