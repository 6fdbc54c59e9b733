//! SQLite persistence for the `pw` credential store.
//!
//! This crate stores one username/password pair per application in a single
//! SQLite table and exposes get/set/remove/list operations that always
//! resolve to a three-state [`Outcome`](pw_core::Outcome).
//!
//! # Architecture
//!
//! - **`gate`**: minimum engine version check, run before any connection opens
//! - **`connection`**: [`Handle`], the scoped owner of one connection
//! - **`schema`**: [`PasswordTable`], the fixed SQL statement catalog
//! - **`executor`**: runs statements, creating a missing table once and retrying
//! - **`mapper`**: turns rows and change counts into records and outcomes
//! - **`query`**: [`CredentialStore`], the CRUD entry points
//!
//! # Quick start
//!
//! ```no_run
//! use pw_sqlite::{CredentialStore, with_handle};
//!
//! let outcome = with_handle("store", |handle| {
//!     let store = CredentialStore::new(handle);
//!     store.set("github", "alice", "secretpw1");
//!     store.get("github")
//! })
//! .unwrap();
//!
//! println!("{}", serde_json::to_string(&outcome).unwrap());
//! ```
//!
//! The table is created lazily: the first statement against a fresh store
//! fails with "no such table", the executor creates the table, and the
//! statement is retried exactly once.

mod connection;
mod error;
mod executor;
pub mod gate;
mod mapper;
mod query;
mod schema;

pub use connection::{Handle, RowCursor, with_handle};
pub use error::{Result, StoreError};
pub use executor::{is_missing_table, run};
pub use mapper::{FailureKind, Operation, classify};
pub use query::CredentialStore;
pub use schema::{DEFAULT_TABLE, PasswordTable};
