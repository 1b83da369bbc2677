//! Schema loader trait

use crate::error::Result;
use crate::types::JsonValue;

/// Source of JSON schemas for streams
pub trait SchemaLoader: Send + Sync {
    /// Load the JSON schema of the named stream
    fn load(&self, stream: &str) -> Result<JsonValue>;
}
