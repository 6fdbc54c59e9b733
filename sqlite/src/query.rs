//! Credential CRUD entry points.
//!
//! Provides [`CredentialStore`] for reading and writing credentials through
//! a borrowed [`Handle`]. Every operation returns an [`Outcome`]: engine
//! errors are shaped into `failed` outcomes instead of propagating. Writes
//! run in their own transaction, so a failed statement is rolled back.
//!
//! # Example
//!
//! ```no_run
//! use pw_sqlite::{CredentialStore, Handle};
//!
//! let handle = Handle::open("store").unwrap();
//! let store = CredentialStore::new(&handle);
//!
//! store.set("github", "alice", "secretpw1");
//! let outcome = store.get("github");
//! assert_eq!(outcome.record().unwrap().get_str("user"), Some("alice"));
//!
//! store.remove("github");
//! assert!(store.get("github").is_empty());
//! ```

use pw_core::Outcome;
use rusqlite::{ToSql, params};
use tracing::debug;

use crate::connection::{Handle, RowCursor};
use crate::error::Result;
use crate::executor;
use crate::mapper::{self, Operation};
use crate::schema::PasswordTable;

/// Query interface for one credential table.
///
/// Wraps a handle and a statement catalog. `app` keys are used verbatim;
/// callers normalize case before calling in.
pub struct CredentialStore<'a> {
    handle: &'a Handle,
    table: PasswordTable,
}

impl<'a> CredentialStore<'a> {
    /// Creates a store over the default `password` table.
    pub fn new(handle: &'a Handle) -> Self {
        Self {
            handle,
            table: PasswordTable::default(),
        }
    }

    /// Creates a store over a custom table name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTableName`](crate::StoreError::InvalidTableName)
    /// if the name is invalid.
    pub fn with_table(handle: &'a Handle, table: impl Into<String>) -> Result<Self> {
        Ok(Self {
            handle,
            table: PasswordTable::new(table)?,
        })
    }

    /// Looks up the `user` and `password` stored for `app`.
    ///
    /// `success` carries one record with `user` and `password` columns;
    /// `empty` means no credential is stored for `app`.
    pub fn get(&self, app: &str) -> Outcome {
        debug!(app, "get");
        let result = self.read(&self.table.get_sql(), params![app]);
        mapper::shape(Operation::Get(app), result)
    }

    /// Inserts or updates the credential for `app`.
    ///
    /// An existing row keeps its `createtime`; `user`, `password` and
    /// `updatetime` are replaced.
    pub fn set(&self, app: &str, user: &str, password: &str) -> Outcome {
        debug!(app, user, "set");
        let result = self.write(&self.table.upsert_sql(), params![app, user, password]);
        mapper::shape(Operation::Set(app), result)
    }

    /// Deletes the credential for `app`. `empty` if there was none.
    pub fn remove(&self, app: &str) -> Outcome {
        debug!(app, "remove");
        let result = self.write(&self.table.delete_sql(), params![app]);
        mapper::shape(Operation::Remove(app), result)
    }

    /// Lists stored apps in insertion order.
    ///
    /// With `all_columns`, each record carries all five columns instead of
    /// just `app`.
    pub fn list(&self, all_columns: bool) -> Outcome {
        debug!(all_columns, "list");
        let result = self.read(&self.table.list_sql(all_columns), &[]);
        mapper::shape(Operation::List, result)
    }

    fn read(&self, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<RowCursor> {
        executor::run(self.handle.connection(), &self.table, sql, params)
    }

    fn write(&self, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<RowCursor> {
        let tx = self.handle.connection().unchecked_transaction()?;
        let cursor = executor::run(&tx, &self.table, sql, params)?;
        tx.commit()?;
        Ok(cursor)
    }
}
