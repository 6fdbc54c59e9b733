//! Self-healing statement execution.
//!
//! The credential table is created lazily: the first statement against a
//! fresh store fails with "no such table", at which point the executor
//! creates the table and re-runs the statement once. Only that error kind
//! triggers recovery; every other failure is returned as-is.

use rusqlite::{Connection, ErrorCode, ToSql};
use tracing::info;

use crate::connection::{self, RowCursor};
use crate::schema::PasswordTable;

/// Extracts the primary SQLite result code and message from an error.
///
/// Prepare-time errors carry a token offset and arrive as
/// [`rusqlite::Error::SqlInputError`] rather than `SqliteFailure`.
pub(crate) fn sqlite_failure(err: &rusqlite::Error) -> Option<(ErrorCode, Option<&str>)> {
    match err {
        rusqlite::Error::SqliteFailure(failure, msg) => Some((failure.code, msg.as_deref())),
        rusqlite::Error::SqlInputError { error, msg, .. } => Some((error.code, Some(msg.as_str()))),
        _ => None,
    }
}

/// Returns `true` if the error is SQLite reporting an unknown table.
pub fn is_missing_table(err: &rusqlite::Error) -> bool {
    matches!(
        sqlite_failure(err),
        Some((ErrorCode::Unknown, Some(msg))) if msg.starts_with("no such table")
    )
}

/// Executes `sql`, creating `table` and retrying exactly once if it is missing.
///
/// # Errors
///
/// Returns the first error unchanged unless it is a missing-table error.
/// Errors from creating the table, or from the retried execution, are also
/// returned unchanged; there is no second retry.
pub fn run(
    conn: &Connection,
    table: &PasswordTable,
    sql: &str,
    params: &[&dyn ToSql],
) -> rusqlite::Result<RowCursor> {
    match connection::execute(conn, sql, params) {
        Err(err) if is_missing_table(&err) => {
            info!(table = table.name(), "creating missing credential table");
            conn.execute_batch(&table.create_table_sql())?;
            connection::execute(conn, sql, params)
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count > 0
    }

    #[test]
    fn test_missing_table_is_created_and_statement_retried() {
        let conn = Connection::open_in_memory().unwrap();
        let table = PasswordTable::default();
        assert!(!table_exists(&conn, "password"));

        let cursor = run(&conn, &table, &table.get_sql(), params!["github"]).unwrap();
        assert_eq!(cursor.columns(), ["user", "password"]);
        assert_eq!(cursor.count(), 0);
        assert!(table_exists(&conn, "password"));
    }

    #[test]
    fn test_write_against_missing_table_succeeds() {
        let conn = Connection::open_in_memory().unwrap();
        let table = PasswordTable::default();
        let cursor = run(
            &conn,
            &table,
            &table.upsert_sql(),
            params!["github", "alice", "secretpw1"],
        )
        .unwrap();
        assert_eq!(cursor.changes(), 1);
    }

    #[test]
    fn test_syntax_error_is_not_retried() {
        let conn = Connection::open_in_memory().unwrap();
        let table = PasswordTable::default();
        let err = run(&conn, &table, "SELEC app FROM password", &[]).unwrap_err();
        assert!(!is_missing_table(&err));
        // Recovery never ran, so the table was not created.
        assert!(!table_exists(&conn, "password"));
    }

    #[test]
    fn test_retry_failure_propagates_unchanged() {
        let conn = Connection::open_in_memory().unwrap();
        let table = PasswordTable::default();
        // Creating `password` cannot make `other_table` appear.
        let err = run(&conn, &table, "SELECT * FROM other_table", &[]).unwrap_err();
        assert!(is_missing_table(&err));
        assert!(err.to_string().contains("other_table"));
        assert!(table_exists(&conn, "password"));
    }

    #[test]
    fn test_is_missing_table_ignores_other_errors() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER PRIMARY KEY)")
            .unwrap();
        conn.execute("INSERT INTO t (x) VALUES (1)", []).unwrap();
        let err = conn
            .execute("INSERT INTO t (x) VALUES (1)", [])
            .unwrap_err();
        assert!(!is_missing_table(&err));
        assert!(!is_missing_table(&rusqlite::Error::QueryReturnedNoRows));
    }
}
