use crate::error::{GhmapError, Result};
use crate::model::{Event, EventKind};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Timestamp fields across the record shapes GitHub hands back: GraphQL
/// commit nodes, GraphQL PR nodes, REST objects.
const TIMESTAMP_FIELDS: &[&str] = &["committedDate", "createdAt", "created_at"];

/// Normalize a batch of raw records into events of the given kind. Records
/// that fail to normalize are logged and skipped; the batch always survives.
pub fn normalize_events(records: &[Value], kind: EventKind) -> Vec<Event> {
    records
        .iter()
        .filter_map(|record| match normalize_record(record, kind) {
            Ok(event) => Some(event),
            Err(e) => {
                log::warn!("Skipping malformed {kind} record: {e}");
                None
            }
        })
        .collect()
}

/// The kind comes from the fetch call that produced the record, not from the
/// record itself.
pub fn normalize_record(record: &Value, kind: EventKind) -> Result<Event> {
    let timestamp = extract_timestamp(record)
        .ok_or_else(|| GhmapError::MalformedEvent("no parseable timestamp field".to_string()))?;
    let language = extract_language(record).unwrap_or_else(|| "Unknown".to_string());
    let size = extract_size(record)?;

    Ok(Event {
        timestamp,
        language,
        kind,
        size,
    })
}

fn extract_timestamp(record: &Value) -> Option<DateTime<Utc>> {
    let candidates = TIMESTAMP_FIELDS
        .iter()
        .filter_map(|field| record.get(*field))
        .chain(record.pointer("/commit/author/date"));

    for value in candidates {
        if let Some(s) = value.as_str() {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
        }
    }
    None
}

fn extract_language(record: &Value) -> Option<String> {
    record
        .get("language")
        .and_then(Value::as_str)
        .or_else(|| {
            record
                .pointer("/repository/primaryLanguage/name")
                .and_then(Value::as_str)
        })
        .or_else(|| record.pointer("/primaryLanguage/name").and_then(Value::as_str))
        .map(str::to_string)
}

/// Added plus removed lines, 0 when the record carries no line counts.
fn extract_size(record: &Value) -> Result<u64> {
    Ok(size_component(record, "additions")? + size_component(record, "deletions")?)
}

fn size_component(record: &Value, field: &str) -> Result<u64> {
    let value = record
        .get(field)
        .or_else(|| record.pointer(&format!("/stats/{field}")));

    match value {
        None | Some(Value::Null) => Ok(0),
        Some(v) => match v.as_i64() {
            Some(n) if n < 0 => Err(GhmapError::MalformedEvent(format!(
                "negative {field}: {n}"
            ))),
            Some(n) => Ok(n as u64),
            None => Ok(0),
        },
    }
}
