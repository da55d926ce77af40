//! Format converter.
//!
//! Turns an in-memory record set into the text committed to the repository.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use erpsync_core::{ExportFormat, Record};
use serde::Serialize;
use serde_json::Value;

use crate::error::ConvertError;

/// Envelope written for the json format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEnvelope<'a> {
    export_timestamp: String,
    entity_name: &'a str,
    record_count: usize,
    data: &'a [Record],
}

/// Converts records to the given format.
pub fn convert(
    format: ExportFormat,
    records: &[Record],
    entity_name: &str,
    timestamp: DateTime<Utc>,
) -> Result<String, ConvertError> {
    match format {
        ExportFormat::Csv => to_csv(records),
        ExportFormat::Json => to_json(records, entity_name, timestamp),
    }
}

/// Column order: keys of the first record, then unseen keys in first-seen order.
pub fn header_columns(records: &[Record]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }
    columns
}

fn render_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Renders records as fully quoted, CRLF-terminated delimited text.
///
/// An empty record set renders as an empty string, with no header.
pub fn to_csv(records: &[Record]) -> Result<String, ConvertError> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let columns = header_columns(records);
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|c| render_field(record.get(*c))))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConvertError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|_| ConvertError::Encoding)
}

/// Renders records inside a pretty-printed metadata envelope.
pub fn to_json(
    records: &[Record],
    entity_name: &str,
    timestamp: DateTime<Utc>,
) -> Result<String, ConvertError> {
    let envelope = JsonEnvelope {
        export_timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        entity_name,
        record_count: records.len(),
        data: records,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

// ============================================================================
// Tests
// ============================================================================
