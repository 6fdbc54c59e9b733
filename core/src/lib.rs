//! Core types for the `pw` credential store.
//!
//! This crate holds the storage-independent pieces of the store:
//!
//! - [`EngineVersion`] and [`check_engine_version`]: the minimum engine
//!   version gate, compared numerically per component.
//! - [`Outcome`]: the three-state (`success` / `empty` / `failed`) result of
//!   every store operation.
//! - [`Record`]: one result row, keeping the column order of the query.
//!
//! # Example
//!
//! ```
//! use pw_core::*;
//!
//! let installed = check_engine_version("3.45.1", REQUIRED_ENGINE_VERSION).unwrap();
//! assert!(installed.is_at_least(&EngineVersion::new(3, 24, 0)));
//!
//! let outcome = Outcome::empty("no data found");
//! assert_eq!(outcome.status, Status::Empty);
//! assert!(outcome.records().is_empty());
//! ```

mod error;
mod types;
mod version;

pub use error::{Error, Result};
pub use types::*;
pub use version::{
    EngineVersion, REQUIRED_ENGINE_VERSION, check_engine_version, version_at_least,
};
