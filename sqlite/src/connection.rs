//! Store connection management.
//!
//! A [`Handle`] owns exactly one SQLite connection for one command
//! invocation. Opening a handle always runs the engine version gate first.

use std::path::Path;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{Connection, ToSql};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::gate;

/// Output of one statement execution, consumable once.
///
/// Queries yield their rows through [`Iterator`]; mutations report the
/// number of affected rows through [`changes`](Self::changes).
#[derive(Debug)]
pub struct RowCursor {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<Value>>,
    changes: usize,
}

impl RowCursor {
    fn rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
            changes: 0,
        }
    }

    fn changes_only(changes: usize) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new().into_iter(),
            changes,
        }
    }

    /// Column names in the order reported by the query.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows affected by a mutation; zero for queries.
    pub fn changes(&self) -> usize {
        self.changes
    }
}

impl Iterator for RowCursor {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

/// Prepares and runs one statement with positional parameters.
///
/// Statements that produce columns are read to completion; everything else
/// is executed as a mutation.
pub fn execute(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<RowCursor> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    if columns.is_empty() {
        let changes = stmt.execute(params)?;
        return Ok(RowCursor::changes_only(changes));
    }

    let width = columns.len();
    let rows = stmt
        .query_map(params, |row| {
            (0..width)
                .map(|idx| row.get::<_, Value>(idx))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(RowCursor::rows(columns, rows))
}

/// Exclusive owner of one store connection.
///
/// The connection is released by [`close`](Self::close). If the enclosing
/// operation exits early, dropping the handle drops the inner
/// [`Connection`], which closes it.
pub struct Handle {
    conn: Connection,
}

impl Handle {
    /// Opens (creating if needed) the store file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] if the linked SQLite library fails the
    /// version gate, or [`StoreError::Open`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        gate::validate()?;
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| StoreError::Open {
            path: path.to_owned(),
            source: e,
        })?;
        let handle = Self::configure(conn)?;
        debug!("Opened store at {}", path.display());
        Ok(handle)
    }

    /// Opens a private in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        gate::validate()?;
        let handle = Self::configure(Connection::open_in_memory()?)?;
        debug!("Opened in-memory store");
        Ok(handle)
    }

    /// Lock contention must fail immediately rather than wait.
    fn configure(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::ZERO)?;
        Ok(Self { conn })
    }

    /// Executes one statement without schema recovery.
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> rusqlite::Result<RowCursor> {
        execute(&self.conn, sql, params)
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, reporting any error from SQLite.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| StoreError::Database(e))?;
        debug!("Closed store");
        Ok(())
    }
}

/// Runs `f` with a freshly opened handle and closes it afterwards.
///
/// The version gate runs before the file is touched. The handle is closed
/// whether `f` returns normally or unwinds.
///
/// # Examples
///
/// ```no_run
/// use pw_sqlite::{CredentialStore, with_handle};
///
/// let outcome = with_handle("store", |handle| CredentialStore::new(handle).get("github")).unwrap();
/// println!("{}", outcome.status.as_str());
/// ```
pub fn with_handle<P, T, F>(path: P, f: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce(&Handle) -> T,
{
    let handle = Handle::open(path)?;
    let value = f(&handle);
    handle.close()?;
    Ok(value)
}
