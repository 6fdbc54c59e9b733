//! Result shaping: raw cursor output to caller-facing [`Outcome`]s.
//!
//! Rows become [`Record`]s that keep the query's column order. Statement
//! results become one of three states:
//!
//! - `success`: rows were returned, or a write affected at least one row
//! - `empty`: the statement ran cleanly but touched nothing
//! - `failed`: execution raised an error, classified as a concurrency
//!   failure (busy/locked) or a generic one

use pw_core::{Outcome, Payload, Record};
use rusqlite::ErrorCode;
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use tracing::{error, warn};

use crate::connection::RowCursor;
use crate::executor::{is_missing_table, sqlite_failure};

const CONCURRENCY_HINT: &str = "ensure no other processes are running pw concurrently";

/// The store operation whose result is being shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    Get(&'a str),
    Set(&'a str),
    Remove(&'a str),
    List,
}

impl Operation<'_> {
    fn empty_message(&self) -> String {
        match self {
            Operation::Get(app) => format!("no results found for '{app}'"),
            Operation::Set(app) | Operation::Remove(app) => {
                format!("no updates made. ensure '{app}' exists")
            }
            Operation::List => "no data found".to_string(),
        }
    }

    fn failure_message(&self) -> String {
        match self {
            Operation::Get(app) => format!("unable to get password for '{app}'"),
            Operation::Set(app) => format!("unable to set password for '{app}'"),
            Operation::Remove(app) => format!("unable to delete '{app}' password"),
            Operation::List => "unable to list stored apps".to_string(),
        }
    }
}

/// Failure sub-kinds distinguished for messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The store is busy or locked by another process, or the table was
    /// still missing after the schema was applied.
    Concurrency,
    /// Anything else.
    Generic,
}

/// Classifies an execution error.
pub fn classify(err: &rusqlite::Error) -> FailureKind {
    if is_missing_table(err) {
        return FailureKind::Concurrency;
    }
    match sqlite_failure(err) {
        Some((ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked, _)) => FailureKind::Concurrency,
        _ => FailureKind::Generic,
    }
}

/// Converts one SQLite value to JSON.
///
/// Blobs are not expected in the credential table; they are rendered as
/// lossy UTF-8 text.
pub fn to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => Value::from(f),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Pairs each value of `row` with its column name, in column order.
pub fn to_record(columns: &[String], row: Vec<SqlValue>) -> Record {
    columns
        .iter()
        .cloned()
        .zip(row.into_iter().map(to_json))
        .collect()
}

/// Drains the cursor into records.
pub fn records(cursor: RowCursor) -> Vec<Record> {
    let columns = cursor.columns().to_vec();
    cursor.map(|row| to_record(&columns, row)).collect()
}

/// Builds the `failed` outcome for an error, logging the underlying cause.
pub fn failed(op: Operation<'_>, err: &rusqlite::Error) -> Outcome {
    let msg = op.failure_message();
    match classify(err) {
        FailureKind::Concurrency => {
            warn!(error = %err, "{msg}: store is busy");
            Outcome::failed(format!("{msg}. {CONCURRENCY_HINT}"))
        }
        FailureKind::Generic => {
            error!(error = %err, "{msg}");
            Outcome::failed(msg)
        }
    }
}

/// Shapes the result of executing the statement for `op`.
///
/// Reads are `success` when at least one row came back; writes are
/// `success` when at least one row changed.
pub fn shape(op: Operation<'_>, result: rusqlite::Result<RowCursor>) -> Outcome {
    let cursor = match result {
        Ok(cursor) => cursor,
        Err(err) => return failed(op, &err),
    };

    match op {
        Operation::Get(_) => match records(cursor).into_iter().next() {
            Some(record) => Outcome::success_with(Payload::Record(record)),
            None => Outcome::empty(op.empty_message()),
        },
        Operation::List => {
            let rows = records(cursor);
            if rows.is_empty() {
                Outcome::empty(op.empty_message())
            } else {
                Outcome::success_with(Payload::Records(rows))
            }
        }
        Operation::Set(_) | Operation::Remove(_) => {
            if cursor.changes() == 0 {
                Outcome::empty(op.empty_message())
            } else {
                Outcome::success()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::execute;
    use pw_core::Status;
    use rusqlite::Connection;
    use rusqlite::ffi;
    use serde_json::json;

    fn busy() -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        )
    }

    fn cursor(conn: &Connection, sql: &str) -> RowCursor {
        execute(conn, sql, &[]).unwrap()
    }

    #[test]
    fn test_to_record_keeps_column_order() {
        let columns = vec!["password".to_string(), "app".to_string()];
        let record = to_record(
            &columns,
            vec![SqlValue::Text("pw".into()), SqlValue::Text("github".into())],
        );
        assert_eq!(record.columns().collect::<Vec<_>>(), ["password", "app"]);
    }

    #[test]
    fn test_to_json_values() {
        assert_eq!(to_json(SqlValue::Null), Value::Null);
        assert_eq!(to_json(SqlValue::Integer(7)), json!(7));
        assert_eq!(to_json(SqlValue::Real(1.5)), json!(1.5));
        assert_eq!(to_json(SqlValue::Text("x".into())), json!("x"));
        assert_eq!(to_json(SqlValue::Blob(b"ab".to_vec())), json!("ab"));
    }

    #[test]
    fn test_get_with_row_is_success() {
        let conn = Connection::open_in_memory().unwrap();
        let outcome = shape(
            Operation::Get("github"),
            Ok(cursor(&conn, "SELECT 'alice' AS user, 'secretpw1' AS password")),
        );
        assert_eq!(outcome.status, Status::Success);
        let record = outcome.record().unwrap();
        assert_eq!(record.get_str("user"), Some("alice"));
        assert_eq!(record.get_str("password"), Some("secretpw1"));
    }

    #[test]
    fn test_get_without_rows_is_empty() {
        let conn = Connection::open_in_memory().unwrap();
        let outcome = shape(
            Operation::Get("github"),
            Ok(cursor(&conn, "SELECT 'alice' AS user WHERE 0")),
        );
        assert_eq!(outcome.status, Status::Empty);
        assert_eq!(outcome.msg.as_deref(), Some("no results found for 'github'"));
    }

    #[test]
    fn test_list_without_rows_is_empty() {
        let conn = Connection::open_in_memory().unwrap();
        let outcome = shape(Operation::List, Ok(cursor(&conn, "SELECT 1 AS app WHERE 0")));
        assert_eq!(outcome.status, Status::Empty);
        assert_eq!(outcome.msg.as_deref(), Some("no data found"));
    }

    #[test]
    fn test_write_with_zero_changes_is_empty() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (app TEXT)").unwrap();
        let outcome = shape(
            Operation::Remove("github"),
            Ok(cursor(&conn, "DELETE FROM t")),
        );
        assert_eq!(outcome.status, Status::Empty);
        assert_eq!(
            outcome.msg.as_deref(),
            Some("no updates made. ensure 'github' exists")
        );
    }

    #[test]
    fn test_write_with_changes_is_success_without_payload() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (app TEXT)").unwrap();
        let outcome = shape(
            Operation::Set("github"),
            Ok(cursor(&conn, "INSERT INTO t VALUES ('github')")),
        );
        assert_eq!(outcome, Outcome::success());
    }

    #[test]
    fn test_busy_error_is_concurrency_failure() {
        assert_eq!(classify(&busy()), FailureKind::Concurrency);
        let outcome = shape(Operation::Set("github"), Err(busy()));
        assert_eq!(outcome.status, Status::Failed);
        assert_eq!(
            outcome.msg.as_deref(),
            Some(
                "unable to set password for 'github'. \
                 ensure no other processes are running pw concurrently"
            )
        );
    }

    #[test]
    fn test_other_error_is_generic_failure() {
        let conn = Connection::open_in_memory().unwrap();
        let err = execute(&conn, "SELEC 1", &[]).unwrap_err();
        assert_eq!(classify(&err), FailureKind::Generic);

        let outcome = shape(Operation::Remove("github"), Err(err));
        assert_eq!(outcome.msg.as_deref(), Some("unable to delete 'github' password"));
    }

    #[test]
    fn test_missing_table_after_recovery_is_concurrency_failure() {
        let conn = Connection::open_in_memory().unwrap();
        let err = execute(&conn, "SELECT * FROM password", &[]).unwrap_err();
        assert_eq!(classify(&err), FailureKind::Concurrency);
    }
}
