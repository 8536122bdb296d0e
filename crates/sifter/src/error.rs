//! Error types for the sifter library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sifter operations.
#[derive(Debug, Error)]
pub enum SifterError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no header to build a dataset from.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A dataset invariant was violated (duplicate names, ragged columns).
    #[error("Schema error: {0}")]
    Schema(String),

    /// A stage referenced columns that are not present in the dataset.
    #[error("Missing columns in {stage}: {}", columns.join(", "))]
    MissingColumns { stage: String, columns: Vec<String> },

    /// More than one column matched a rename prefix under the strict policy.
    #[error("Prefix '{prefix}' matches more than one column: {}", matches.join(", "))]
    AmbiguousRename { prefix: String, matches: Vec<String> },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Relational store error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A background write task panicked or was cancelled.
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Invalid connection URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl SifterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SifterError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for sifter operations.
pub type Result<T> = std::result::Result<T, SifterError>;
