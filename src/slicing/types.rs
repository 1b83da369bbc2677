//! Slice types and traits

use crate::error::Result;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// One sub-range of a stream read
///
/// The empty slice is the trivial slice of a stream that does not split
/// its reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamSlice {
    values: JsonObject,
}

impl StreamSlice {
    /// Create the trivial (empty) slice
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value to the slice
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    /// Get a string value by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(JsonValue::as_str)
    }

    /// Whether this is the trivial slice
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The slice as a JSON object
    pub fn as_object(&self) -> &JsonObject {
        &self.values
    }
}

impl From<JsonObject> for StreamSlice {
    fn from(values: JsonObject) -> Self {
        Self { values }
    }
}

/// Lazily generated slices, produced one at a time as they are pulled
pub type Slices<'a> = Box<dyn Iterator<Item = StreamSlice> + Send + 'a>;

/// Trait for slice generators
pub trait Slicer: Send + Sync {
    /// Enumerate slices for a read, given this stream's state blob
    ///
    /// Full refresh reads pass `JsonValue::Null`. Configuration errors are
    /// reported here, before the first slice is produced.
    fn slices(&self, stream_state: &JsonValue) -> Result<Slices<'_>>;
}
