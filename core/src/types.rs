//! Outcome and record types returned by store operations.
//!
//! Every store operation resolves to an [`Outcome`] in one of three states:
//! [`Status::Success`], [`Status::Empty`] or [`Status::Failed`]. Reads carry
//! their rows as [`Record`]s, which keep the column order reported by the
//! query.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Three-state status of a store operation.
///
/// # Examples
///
/// ```
/// use pw_core::Status;
///
/// assert_eq!(Status::Empty.as_str(), "empty");
/// assert_eq!(serde_json::to_string(&Status::Failed).unwrap(), "\"failed\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The write affected rows, or the read returned rows.
    Success,
    /// The statement ran cleanly but touched no rows.
    Empty,
    /// Execution raised an error.
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Empty => "empty",
            Status::Failed => "failed",
        }
    }
}

/// One result row: column names paired with values, in query order.
///
/// Serializes as a JSON object whose keys follow the column order.
///
/// # Examples
///
/// ```
/// use pw_core::Record;
/// use serde_json::json;
///
/// let mut record = Record::new();
/// record.push("user", json!("alice"));
/// record.push("password", json!("secretpw1"));
///
/// assert_eq!(record.get_str("user"), Some("alice"));
/// assert_eq!(record.columns().collect::<Vec<_>>(), ["user", "password"]);
/// assert_eq!(
///     serde_json::to_string(&record).unwrap(),
///     r#"{"user":"alice","password":"secretpw1"}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column. Order of calls is the order of serialization.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.fields.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns the column value if it is a string.
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Row data carried by a successful read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// A single row (`get`).
    Record(Record),
    /// Zero or more rows (`list`).
    Records(Vec<Record>),
}

/// Result of a store operation.
///
/// `set` and `remove` never carry data; `get` and `list` carry rows only on
/// success. `empty` and `failed` outcomes always carry a message.
///
/// # Examples
///
/// ```
/// use pw_core::{Outcome, Status};
///
/// let outcome = Outcome::empty("no results found for 'github'");
/// assert_eq!(outcome.status, Status::Empty);
/// assert_eq!(
///     serde_json::to_string(&outcome).unwrap(),
///     r#"{"status":"empty","msg":"no results found for 'github'"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
}

impl Outcome {
    /// Success without payload (writes).
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            msg: None,
            data: None,
        }
    }

    /// Success carrying row data (reads).
    pub fn success_with(data: Payload) -> Self {
        Self {
            status: Status::Success,
            msg: None,
            data: Some(data),
        }
    }

    pub fn empty(msg: impl Into<String>) -> Self {
        Self {
            status: Status::Empty,
            msg: Some(msg.into()),
            data: None,
        }
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            msg: Some(msg.into()),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn is_empty(&self) -> bool {
        self.status == Status::Empty
    }

    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }

    /// The single record of a successful `get`.
    pub fn record(&self) -> Option<&Record> {
        match &self.data {
            Some(Payload::Record(record)) => Some(record),
            _ => None,
        }
    }

    /// The rows of a successful `list`; empty for every other outcome.
    pub fn records(&self) -> &[Record] {
        match &self.data {
            Some(Payload::Records(records)) => records,
            _ => &[],
        }
    }
}
