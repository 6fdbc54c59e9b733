//! Error types for opening and closing the credential store.
//!
//! Failures during `get`/`set`/`remove`/`list` never surface here; they are
//! shaped into [`Outcome`](pw_core::Outcome)s. This type covers what happens
//! around them: the engine gate, opening the file, and closing it.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while acquiring or releasing a store handle.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The store file could not be opened.
    #[error("failed to open store at '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The linked engine failed the minimum version gate.
    #[error(transparent)]
    Engine(#[from] pw_core::Error),

    /// Table name contains invalid characters.
    #[error("invalid table name '{0}': must contain only alphanumeric characters and underscores")]
    InvalidTableName(String),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
