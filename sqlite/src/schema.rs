//! SQL statement catalog for the credential table.
//!
//! Every statement is a pure function of the table name; none of them branch
//! on the data being stored. Parameters are positional (`?1`, `?2`, ...).
//!
//! # Table structure
//!
//! | column       | type | notes                                      |
//! |--------------|------|--------------------------------------------|
//! | `app`        | TEXT | primary key                                |
//! | `user`       | TEXT |                                            |
//! | `password`   | TEXT | plaintext                                  |
//! | `createtime` | TEXT | set on insert, never updated               |
//! | `updatetime` | TEXT | defaults to now, refreshed on every update |
//!
//! Timestamps are local time with millisecond precision
//! (`YYYY-MM-DD HH:MM:SS.SSS`).

use crate::error::{Result, StoreError};

/// Name of the credential table used by the CLI.
pub const DEFAULT_TABLE: &str = "password";

/// Current local time, as stored in `createtime` / `updatetime`.
const LOCAL_NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now', 'localtime')";

/// Validates that a table name contains only alphanumeric characters and underscores.
pub(crate) fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidTableName(name.to_string()));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidTableName(name.to_string()));
    }
    Ok(())
}

/// Statement catalog for one credential table.
///
/// # Examples
///
/// ```
/// use pw_sqlite::PasswordTable;
///
/// let table = PasswordTable::default();
/// assert_eq!(table.name(), "password");
/// assert!(table.delete_sql().starts_with("DELETE FROM password"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordTable {
    name: String,
}

impl Default for PasswordTable {
    fn default() -> Self {
        Self {
            name: DEFAULT_TABLE.to_string(),
        }
    }
}

impl PasswordTable {
    /// Creates a catalog for the given table name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTableName`] if the name is empty or
    /// contains characters other than ASCII alphanumerics and underscores.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_table_name(&name)?;
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `CREATE TABLE IF NOT EXISTS` for the five credential columns.
    pub fn create_table_sql(&self) -> String {
        format!(
            r#"CREATE TABLE IF NOT EXISTS {table} (
    app TEXT PRIMARY KEY,
    user TEXT,
    password TEXT,
    createtime TEXT NOT NULL,
    updatetime TEXT NOT NULL DEFAULT ({now})
)"#,
            table = self.name,
            now = LOCAL_NOW
        )
    }

    /// Selects `user, password` for `app = ?1`.
    pub fn get_sql(&self) -> String {
        format!("SELECT user, password FROM {} WHERE app = ?1", self.name)
    }

    /// Inserts `(?1 app, ?2 user, ?3 password)`, updating `user`, `password`
    /// and `updatetime` when the app already exists.
    pub fn upsert_sql(&self) -> String {
        format!(
            r#"INSERT INTO {table} (app, user, password, createtime)
VALUES (?1, ?2, ?3, {now})
ON CONFLICT(app) DO UPDATE SET
    password = excluded.password,
    user = excluded.user,
    updatetime = {now}"#,
            table = self.name,
            now = LOCAL_NOW
        )
    }

    /// Deletes the row for `app = ?1`.
    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE app = ?1", self.name)
    }

    /// Lists apps, or every column when `all_columns` is set, in insertion order.
    pub fn list_sql(&self, all_columns: bool) -> String {
        let columns = if all_columns { "*" } else { "app" };
        format!("SELECT {columns} FROM {} ORDER BY rowid", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::{Connection, params};

    fn create(conn: &Connection, table: &PasswordTable) {
        conn.execute_batch(&table.create_table_sql()).unwrap();
    }

    #[test]
    fn test_valid_table_name() {
        assert!(validate_table_name("password").is_ok());
        assert!(validate_table_name("test123").is_ok());
        assert!(validate_table_name("pw_store").is_ok());
    }

    #[test]
    fn test_invalid_table_name() {
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("drop;--").is_err());
        assert!(validate_table_name("two words").is_err());
        assert!(PasswordTable::new("test-table").is_err());
    }

    #[test]
    fn test_statements_use_table_name() {
        let table = PasswordTable::new("creds").unwrap();
        assert!(table.create_table_sql().contains("CREATE TABLE IF NOT EXISTS creds"));
        assert!(table.get_sql().contains("FROM creds"));
        assert!(table.upsert_sql().contains("INSERT INTO creds"));
        assert!(table.delete_sql().contains("DELETE FROM creds"));
        assert!(table.list_sql(false).contains("FROM creds"));
    }

    #[test]
    fn test_list_sql_columns() {
        let table = PasswordTable::default();
        assert_eq!(
            table.list_sql(false),
            "SELECT app FROM password ORDER BY rowid"
        );
        assert_eq!(table.list_sql(true), "SELECT * FROM password ORDER BY rowid");
    }

    #[test]
    fn test_create_table_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        let table = PasswordTable::default();
        create(&conn, &table);
        create(&conn, &table);

        let columns: Vec<String> = conn
            .prepare("SELECT * FROM password")
            .unwrap()
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            columns,
            ["app", "user", "password", "createtime", "updatetime"]
        );
    }

    #[test]
    fn test_upsert_updates_existing_row_in_place() {
        let conn = Connection::open_in_memory().unwrap();
        let table = PasswordTable::default();
        create(&conn, &table);

        let first = conn
            .execute(&table.upsert_sql(), params!["github", "alice", "secretpw1"])
            .unwrap();
        let second = conn
            .execute(&table.upsert_sql(), params!["github", "bob", "secretpw2"])
            .unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 1);

        let (count, user, password): (i64, String, String) = conn
            .query_row(
                "SELECT COUNT(*), user, password FROM password",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(user, "bob");
        assert_eq!(password, "secretpw2");
    }

    #[test]
    fn test_insert_sets_both_timestamps() {
        let conn = Connection::open_in_memory().unwrap();
        let table = PasswordTable::default();
        create(&conn, &table);
        conn.execute(&table.upsert_sql(), params!["github", "alice", "secretpw1"])
            .unwrap();

        let (created, updated): (String, String) = conn
            .query_row("SELECT createtime, updatetime FROM password", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        // 'now' is fixed for the duration of one statement.
        assert_eq!(created, updated);
        assert_eq!(created.len(), "2024-01-15 10:30:00.000".len());
    }

    #[test]
    fn test_delete_affects_zero_or_one_row() {
        let conn = Connection::open_in_memory().unwrap();
        let table = PasswordTable::default();
        create(&conn, &table);
        conn.execute(&table.upsert_sql(), params!["github", "alice", "secretpw1"])
            .unwrap();

        assert_eq!(conn.execute(&table.delete_sql(), params!["gitlab"]).unwrap(), 0);
        assert_eq!(conn.execute(&table.delete_sql(), params!["github"]).unwrap(), 1);
    }
}
