//! Output formatting for store outcomes.

use pw_core::{Outcome, Record, Status};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

/// Formats the outcome of `get`, `set` or `rm`.
pub fn format_outcome(outcome: &Outcome, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => to_json(outcome),
        OutputFormat::Csv => match outcome.record() {
            Some(record) => records_to_csv(std::slice::from_ref(record)),
            None => status_to_csv(outcome),
        },
    }
}

/// Formats the outcome of `dump`: the bare records on success, the outcome
/// itself otherwise.
pub fn format_listing(outcome: &Outcome, format: OutputFormat) -> Result<String, String> {
    if outcome.status != Status::Success {
        return format_outcome(outcome, format);
    }
    match format {
        OutputFormat::Json => to_json(outcome.records()),
        OutputFormat::Csv => records_to_csv(outcome.records()),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

fn status_to_csv(outcome: &Outcome) -> Result<String, String> {
    let mut writer = csv_writer();
    writer.write_record(["status", "msg"]).map_err(csv_error)?;
    writer
        .write_record([outcome.status.as_str(), outcome.msg.as_deref().unwrap_or("")])
        .map_err(csv_error)?;
    finish(writer)
}

/// Header from the first record's columns, then one line per record.
fn records_to_csv(records: &[Record]) -> Result<String, String> {
    let Some(first) = records.first() else {
        return Ok(String::new());
    };

    let mut writer = csv_writer();
    writer.write_record(first.columns()).map_err(csv_error)?;
    for record in records {
        let row: Vec<String> = record.iter().map(|(_, value)| cell(value)).collect();
        writer.write_record(&row).map_err(csv_error)?;
    }
    finish(writer)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![])
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| format!("CSV output failed: {}", e.error()))?;
    String::from_utf8(bytes).map_err(|e| format!("CSV output failed: {e}"))
}

fn csv_error(err: csv::Error) -> String {
    format!("CSV output failed: {err}")
}
