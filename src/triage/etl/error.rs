use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool loads, cleans, or persists the message tables.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a delimited file cannot be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the SQLite writer.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Raised when the pipeline report cannot be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a table lacks a column the pipeline depends on.
    #[error("column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    /// Raised when a packed category string does not split into the expected
    /// number of fields.
    #[error("row {row}: expected {expected} category fields, found {found}")]
    MalformedCategories {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Raised when a row carries no packed category string at all.
    #[error("row {row}: packed category value is empty")]
    MissingCategories { row: usize },

    /// Raised when a category field does not carry a 0/1 flag.
    #[error("row {row}: invalid value '{value}' for category {column}")]
    InvalidCategoryValue {
        column: String,
        row: usize,
        value: String,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
