//! Pagination types and traits
//!
//! A paginator inspects one buffered response and decides whether another
//! page exists. Paginators keep no mutable state: offsets and page numbers
//! are recovered from the URL of the response being inspected, so one
//! paginator can serve every slice of a stream.

use crate::error::Result;
use crate::http::HttpResponse;
use serde_json::Value;
use std::collections::HashMap;

/// Continuation for the next page of a slice
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageToken {
    /// Query parameters to send with the next request
    pub query_params: HashMap<String, String>,
    /// Absolute URL replacing the stream's path, when the API hands one out
    pub next_url: Option<String>,
}

impl PageToken {
    /// Token carrying a single query parameter
    pub fn param(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut query_params = HashMap::new();
        query_params.insert(key.into(), value.into());
        Self {
            query_params,
            next_url: None,
        }
    }

    /// Token carrying a set of query parameters
    pub fn params(query_params: HashMap<String, String>) -> Self {
        Self {
            query_params,
            next_url: None,
        }
    }

    /// Token pointing at an absolute URL
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            query_params: HashMap::new(),
            next_url: Some(url.into()),
        }
    }
}

/// Stop conditions for pagination
#[derive(Debug, Clone, Default)]
pub enum StopCondition {
    /// Stop when page is empty (no records)
    #[default]
    EmptyPage,

    /// Stop when a field has a specific value
    Field {
        /// Dotted path to the field
        path: String,
        /// Value that ends pagination
        value: Value,
    },

    /// Stop when offset plus page size reaches the total count
    TotalCount {
        /// Dotted path to total count field
        path: String,
    },

    /// Stop when the current page reaches the total number of pages
    TotalPages {
        /// Dotted path to total pages field
        path: String,
    },

    /// Never stop on this condition; rely on the token being absent
    Never,
}

impl StopCondition {
    /// Create a field-based stop condition
    pub fn field(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Field {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a total count stop condition
    pub fn total_count(path: impl Into<String>) -> Self {
        Self::TotalCount { path: path.into() }
    }

    /// Create a total pages stop condition
    pub fn total_pages(path: impl Into<String>) -> Self {
        Self::TotalPages { path: path.into() }
    }

    /// Whether pagination should stop
    ///
    /// `position` is the offset or page number of the response being
    /// inspected, `records` the number of records it carried.
    pub(crate) fn should_stop(&self, body: &Value, position: u64, records: usize) -> bool {
        match self {
            Self::EmptyPage => records == 0,
            Self::Field { path, value } => lookup(body, path) == Some(value),
            Self::TotalCount { path } => lookup_u64(body, path)
                .is_some_and(|total| position.saturating_add(records as u64) >= total),
            Self::TotalPages { path } => {
                lookup_u64(body, path).is_some_and(|total| position >= total)
            }
            Self::Never => false,
        }
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Query parameters for the first page of a slice
    fn initial_params(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Token for the page after `response`, or `None` when exhausted
    fn next_page(&self, response: &HttpResponse) -> Result<Option<PageToken>>;
}

/// Resolve a dotted path (`$.a.b` or `a.b`) inside a JSON value
pub(crate) fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, part| match current {
        Value::Object(map) => map.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Resolve a dotted path to a non-empty string; numbers are stringified
pub(crate) fn lookup_string(value: &Value, path: &str) -> Option<String> {
    match lookup(value, path)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lookup_u64(value: &Value, path: &str) -> Option<u64> {
    match lookup(value, path)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Number of records on a page: the array at `records_path`, or the body
/// itself when it is an array
pub(crate) fn count_records(body: &Value, records_path: Option<&str>) -> usize {
    let records = match records_path {
        Some(path) => lookup(body, path),
        None => Some(body),
    };
    records.and_then(Value::as_array).map_or(0, Vec::len)
}

/// Read a numeric query parameter from the URL that produced `response`
pub(crate) fn current_param(response: &HttpResponse, name: &str) -> Option<u64> {
    response
        .url()
        .query_pairs()
        .find(|(key, _)| key == name)
        .and_then(|(_, value)| value.parse().ok())
}
