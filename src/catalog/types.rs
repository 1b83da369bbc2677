//! Catalog types
//!
//! Serialized in the same shape the protocol uses on the wire, so a configured
//! catalog file can be deserialized directly.

use crate::error::{Error, Result};
use crate::types::{DestinationSyncMode, JsonValue, SyncMode};
use serde::{Deserialize, Serialize};

// ============================================================================
// Discovered Catalog
// ============================================================================

/// Catalog of all streams a source can produce
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Find a stream by name
    pub fn get(&self, name: &str) -> Option<&CatalogStream> {
        self.streams.iter().find(|s| s.name == name)
    }
}

/// A single discovered stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub json_schema: JsonValue,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Whether the source decides the cursor field
    #[serde(default)]
    pub source_defined_cursor: bool,

    /// Default cursor field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_cursor_field: Vec<String>,

    /// Source-defined primary key
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_defined_primary_key: Vec<Vec<String>>,
}

impl CatalogStream {
    /// Create a full-refresh-only catalog entry
    pub fn new(name: impl Into<String>, json_schema: JsonValue) -> Self {
        Self {
            name: name.into(),
            json_schema,
            supported_sync_modes: vec![SyncMode::FullRefresh],
            source_defined_cursor: false,
            default_cursor_field: Vec::new(),
            source_defined_primary_key: Vec::new(),
        }
    }

    /// Check whether the stream supports a sync mode
    pub fn supports(&self, mode: SyncMode) -> bool {
        self.supported_sync_modes.contains(&mode)
    }
}

// ============================================================================
// Configured Catalog
// ============================================================================

/// The caller's per-sync selection of streams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    /// Selected streams, in sync order
    pub streams: Vec<ConfiguredStream>,
}

impl ConfiguredCatalog {
    /// Select every stream of a catalog.
    ///
    /// Streams that do not support `preferred` fall back to full refresh.
    pub fn from_catalog(catalog: &Catalog, preferred: SyncMode) -> Self {
        let streams = catalog
            .streams
            .iter()
            .map(|stream| {
                let sync_mode = if stream.supports(preferred) {
                    preferred
                } else {
                    SyncMode::FullRefresh
                };
                ConfiguredStream::new(stream.clone(), sync_mode)
            })
            .collect();
        Self { streams }
    }

    /// Keep only the streams configured for incremental sync
    #[must_use]
    pub fn incremental_only(mut self) -> Self {
        self.streams.retain(|s| s.sync_mode == SyncMode::Incremental);
        self
    }

    /// Names of the configured streams, in order
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.iter().map(ConfiguredStream::name).collect()
    }
}

/// A stream selected for a sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguredStream {
    /// Stream reference
    pub stream: CatalogStream,

    /// Selected sync mode
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Destination sync mode
    #[serde(default)]
    pub destination_sync_mode: DestinationSyncMode,

    /// Cursor field to use
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cursor_field: Vec<String>,

    /// Primary key to use
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<Vec<String>>,

    /// Override for the number of records between checkpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_checkpoint_interval: Option<u64>,
}

impl ConfiguredStream {
    /// Configure a catalog stream, inheriting its default cursor and primary key
    pub fn new(stream: CatalogStream, sync_mode: SyncMode) -> Self {
        let cursor_field = stream.default_cursor_field.clone();
        let primary_key = stream.source_defined_primary_key.clone();
        Self {
            stream,
            sync_mode,
            destination_sync_mode: DestinationSyncMode::default(),
            cursor_field,
            primary_key,
            state_checkpoint_interval: None,
        }
    }

    /// Set the cursor field
    #[must_use]
    pub fn with_cursor_field(mut self, path: Vec<String>) -> Self {
        self.cursor_field = path;
        self
    }

    /// Set the primary key
    #[must_use]
    pub fn with_primary_key(mut self, key: Vec<Vec<String>>) -> Self {
        self.primary_key = key;
        self
    }

    /// Override the checkpoint interval
    #[must_use]
    pub fn with_checkpoint_interval(mut self, interval: u64) -> Self {
        self.state_checkpoint_interval = Some(interval);
        self
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.stream.name
    }

    /// Resolve the configured cursor field to a top-level property name
    pub fn cursor_field_name(&self) -> Result<Option<&str>> {
        resolve_top_level(self.name(), "cursor field", &self.cursor_field)
    }

    /// Resolve every primary-key component to a top-level property name
    pub fn primary_key_fields(&self) -> Result<Vec<&str>> {
        let mut fields = Vec::with_capacity(self.primary_key.len());
        for component in &self.primary_key {
            if let Some(field) = resolve_top_level(self.name(), "primary key", component)? {
                fields.push(field);
            }
        }
        Ok(fields)
    }
}

/// Resolve a property path to a single top-level field.
///
/// An empty path resolves to `None`; a multi-segment path is rejected.
pub fn resolve_top_level<'a>(
    stream: &str,
    kind: &'static str,
    path: &'a [String],
) -> Result<Option<&'a str>> {
    match path {
        [] => Ok(None),
        [field] => Ok(Some(field.as_str())),
        _ => Err(Error::NestedFieldPath {
            stream: stream.to_string(),
            kind,
            path: path.to_vec(),
        }),
    }
}
