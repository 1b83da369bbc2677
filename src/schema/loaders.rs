//! Schema loader implementations

use super::types::SchemaLoader;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads `<root>/<stream>.json`
///
/// Connectors conventionally ship a `schemas/` directory next to their
/// manifest with one file per stream.
#[derive(Debug, Clone)]
pub struct DirSchemaLoader {
    root: PathBuf,
}

impl DirSchemaLoader {
    /// Create a loader rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the loader reads from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, stream: &str) -> PathBuf {
        self.root.join(format!("{stream}.json"))
    }
}

impl SchemaLoader for DirSchemaLoader {
    fn load(&self, stream: &str) -> Result<JsonValue> {
        let path = self.path_for(stream);
        debug!("Loading schema for {} from {}", stream, path.display());

        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound {
                path: path.display().to_string(),
            },
            _ => Error::Io(e),
        })?;

        let schema: JsonValue = serde_json::from_str(&content)
            .map_err(|e| Error::schema(stream, format!("{}: {e}", path.display())))?;
        ensure_object(stream, schema)
    }
}

/// Schemas held in memory, keyed by stream name
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaLoader {
    schemas: HashMap<String, JsonValue>,
}

impl StaticSchemaLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema
    #[must_use]
    pub fn with_schema(mut self, stream: impl Into<String>, schema: JsonValue) -> Self {
        self.schemas.insert(stream.into(), schema);
        self
    }
}

impl SchemaLoader for StaticSchemaLoader {
    fn load(&self, stream: &str) -> Result<JsonValue> {
        let schema = self
            .schemas
            .get(stream)
            .cloned()
            .ok_or_else(|| Error::schema(stream, "no schema registered"))?;
        ensure_object(stream, schema)
    }
}

/// A permissive schema for streams that do not describe their records
pub fn empty_schema() -> JsonValue {
    serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {}
    })
}

fn ensure_object(stream: &str, schema: JsonValue) -> Result<JsonValue> {
    if schema.is_object() {
        Ok(schema)
    } else {
        Err(Error::schema(stream, "schema must be a JSON object"))
    }
}
