//! Common error types for the CBC results store

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for store, loader and translation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every component of the store
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed row in one of the tabular sources
    #[error("Malformed source row at {}:{line}: {message}", path.display())]
    Source {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Same (kind, name, qualifier) triple ingested twice with different values
    #[error(
        "Conflicting value for ({kind}, {name}, {qualifier}): stored '{existing}', incoming '{incoming}'"
    )]
    DuplicateFact {
        kind: String,
        name: String,
        qualifier: String,
        existing: String,
        incoming: String,
    },

    /// Non-numeric input where a number is required
    #[error("Value '{value}' for {field} is not a finite number")]
    ValueFormat { field: String, value: String },

    /// Destination needs a value that cannot be resolved from the observations
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
}

impl Error {
    pub(crate) fn value_format(field: impl Into<String>, value: impl Into<String>) -> Self {
        Error::ValueFormat {
            field: field.into(),
            value: value.into(),
        }
    }
}
