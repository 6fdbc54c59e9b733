//! Error types for the engine compatibility gate.
//!
//! These are the only errors that escape the store's operation boundary:
//! everything else is shaped into an [`Outcome`](crate::Outcome).

use thiserror::Error;

/// Errors raised before any store operation is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The linked SQLite library is older than the minimum supported version.
    #[error("sqlite version {required} or higher required. installed version is {installed}")]
    IncompatibleEngine { installed: String, required: String },

    /// A version string did not split into three numeric parts.
    #[error("malformed version '{0}': must have 3 numeric parts: major, minor, patch")]
    MalformedVersion(String),
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
