//! Cursor comparison and monotonic state merging

use crate::types::{JsonObject, JsonValue};
use chrono::DateTime;
use std::cmp::Ordering;

/// Compare two cursor values.
///
/// Numbers compare numerically, including numeric strings such as
/// `"1600000000.000100"`. RFC 3339 timestamps compare chronologically. Other
/// strings compare lexicographically. Anything else is incomparable.
pub fn compare_cursor_values(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Some(x.cmp(&y));
            }
            x.as_f64()?.partial_cmp(&y.as_f64()?)
        }
        (JsonValue::String(x), JsonValue::String(y)) => {
            if let (Ok(x), Ok(y)) = (x.parse::<f64>(), y.parse::<f64>()) {
                return x.partial_cmp(&y);
            }
            if let (Ok(x), Ok(y)) = (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                return Some(x.cmp(&y));
            }
            Some(x.cmp(y))
        }
        (JsonValue::Number(x), JsonValue::String(y)) => {
            x.as_f64()?.partial_cmp(&y.parse::<f64>().ok()?)
        }
        (JsonValue::String(x), JsonValue::Number(y)) => {
            x.parse::<f64>().ok()?.partial_cmp(&y.as_f64()?)
        }
        _ => None,
    }
}

/// Pick the larger of the current and candidate cursor values.
///
/// A null side always loses. When the values are incomparable the current
/// value is kept, so the tracked cursor never regresses.
pub fn max_cursor_value<'a>(current: &'a JsonValue, candidate: &'a JsonValue) -> &'a JsonValue {
    if current.is_null() {
        return candidate;
    }
    if candidate.is_null() {
        return current;
    }
    match compare_cursor_values(candidate, current) {
        Some(Ordering::Greater) => candidate,
        _ => current,
    }
}

/// Merge a record's cursor value into a stream state.
///
/// Returns a new state object where `cursor_field` holds the max of the old
/// value and the record's value. Other keys of the state are preserved.
pub fn merge_cursor(current: &JsonValue, record: &JsonObject, cursor_field: &str) -> JsonValue {
    let mut merged = match current {
        JsonValue::Object(map) => map.clone(),
        _ => JsonObject::new(),
    };

    let old = merged.get(cursor_field).unwrap_or(&JsonValue::Null);
    let new = record.get(cursor_field).unwrap_or(&JsonValue::Null);
    let winner = max_cursor_value(old, new).clone();

    if !winner.is_null() {
        merged.insert(cursor_field.to_string(), winner);
    }
    JsonValue::Object(merged)
}
