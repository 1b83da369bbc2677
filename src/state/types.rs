//! State types for tracking sync progress
//!
//! The connector state serializes as a plain JSON object keyed by stream name,
//! which is exactly the `data` payload of a STATE message.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Complete state for a connector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectorState {
    streams: BTreeMap<String, JsonValue>,
}

impl ConnectorState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from a JSON object
    pub fn from_value(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Null => Ok(Self::new()),
            JsonValue::Object(map) => Ok(Self {
                streams: map.into_iter().collect(),
            }),
            other => Err(Error::state(format!(
                "State must be a JSON object keyed by stream name, got {other}"
            ))),
        }
    }

    /// Parse a state from an inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json).map_err(|e| Error::State {
            message: format!("Failed to parse state JSON: {e}"),
        })?;
        Self::from_value(value)
    }

    /// Load a seed state from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|e| Error::State {
            message: format!("Failed to read state file: {e}"),
        })?;
        Self::from_json(&contents)
    }

    /// Get state for a stream
    pub fn get(&self, stream: &str) -> Option<&JsonValue> {
        self.streams.get(stream)
    }

    /// Get state for a stream, defaulting to an empty object
    pub fn stream_state(&self, stream: &str) -> JsonValue {
        self.streams
            .get(stream)
            .cloned()
            .unwrap_or_else(|| JsonValue::Object(JsonObject::new()))
    }

    /// Replace the state of a stream
    pub fn set(&mut self, stream: impl Into<String>, state: JsonValue) {
        self.streams.insert(stream.into(), state);
    }

    /// Remove the state of a stream
    pub fn remove(&mut self, stream: &str) -> Option<JsonValue> {
        self.streams.remove(stream)
    }

    /// Check whether any stream has state
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Number of streams with state
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Iterate over stream states in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.streams.iter().map(|(k, v)| (k.as_str(), v))
    }
}
