//! Decoder implementations

use super::types::RecordDecoder;
use crate::error::{Error, Result};
use crate::pagination::lookup;
use crate::types::JsonObject;
use serde_json::Value;

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder with optional record path extraction
///
/// Plain dotted paths (`$.data.items`) are resolved directly; paths with
/// wildcards or filters go through `jsonpath-rust`.
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    record_path: Option<String>,
}

impl JsonDecoder {
    /// Create a new JSON decoder; the whole body is the record set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON decoder with a record path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            record_path: Some(path.into()),
        }
    }

    /// Select records from a parsed body
    pub fn extract_records(&self, value: Value) -> Result<Vec<JsonObject>> {
        let selected = match &self.record_path {
            Some(path) if is_simple_path(path) => {
                lookup(&value, path).cloned().unwrap_or(Value::Null)
            }
            Some(path) => extract_with_jsonpath(&value, path)?,
            None => value,
        };

        match selected {
            Value::Array(items) => items.into_iter().map(into_record).collect(),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![into_record(other)?]),
        }
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode(&self, body: &[u8]) -> Result<Vec<JsonObject>> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
        self.extract_records(value)
    }
}

// ============================================================================
// JSONL Decoder
// ============================================================================

/// JSON Lines decoder (one JSON object per line)
#[derive(Debug, Clone, Default)]
pub struct JsonlDecoder;

impl JsonlDecoder {
    /// Create a new JSONL decoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for JsonlDecoder {
    fn decode(&self, body: &[u8]) -> Result<Vec<JsonObject>> {
        let body = std::str::from_utf8(body)
            .map_err(|e| Error::decode(format!("JSONL body is not UTF-8: {e}")))?;

        body.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_num, line)| {
                let value: Value = serde_json::from_str(line).map_err(|e| {
                    Error::decode(format!("Failed to parse JSONL at line {}: {e}", line_num + 1))
                })?;
                into_record(value)
            })
            .collect()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn is_simple_path(path: &str) -> bool {
    !path.contains(['*', '[', '?', '('])
}

fn into_record(value: Value) -> Result<JsonObject> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::decode(format!(
            "Expected a JSON object record, got {other}"
        ))),
    }
}

/// Extract records using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Value> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath {path}: {e}")))?;

    Ok(jp.find(value))
}
