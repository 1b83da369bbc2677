//! Stream contract

use crate::catalog::CatalogStream;
use crate::error::Result;
use crate::logger::SyncLogger;
use crate::schema::empty_schema;
use crate::slicing::StreamSlice;
use crate::state::merge_cursor;
use crate::types::{JsonObject, JsonValue, SyncMode};
use futures::stream::{self, BoxStream, StreamExt};

/// Lazy sequence of records
pub type RecordStream<'a> = BoxStream<'a, Result<JsonObject>>;

/// Lazy sequence of slices
pub type SliceStream<'a> = BoxStream<'a, Result<StreamSlice>>;

/// Arguments of one `Stream::stream_slices` call
#[derive(Debug, Clone)]
pub struct SliceRequest {
    /// Effective sync mode
    pub sync_mode: SyncMode,
    /// Effective cursor field, if any
    pub cursor_field: Option<String>,
    /// This stream's state blob (`Null` for full refresh)
    pub stream_state: JsonValue,
    /// Logger scoped to the stream
    pub logger: SyncLogger,
}

impl SliceRequest {
    /// Slices for a full-refresh read
    pub fn full_refresh(cursor_field: Option<String>, logger: SyncLogger) -> Self {
        Self {
            sync_mode: SyncMode::FullRefresh,
            cursor_field,
            stream_state: JsonValue::Null,
            logger,
        }
    }

    /// Slices for an incremental read resuming from `stream_state`
    pub fn incremental(stream_state: JsonValue, cursor_field: String, logger: SyncLogger) -> Self {
        Self {
            sync_mode: SyncMode::Incremental,
            cursor_field: Some(cursor_field),
            stream_state,
            logger,
        }
    }
}

/// Arguments of one `Stream::read_records` call
#[derive(Debug, Clone)]
pub struct ReadRequest {
    /// Effective sync mode
    pub sync_mode: SyncMode,
    /// Effective cursor field, if any
    pub cursor_field: Option<String>,
    /// Slice to read
    pub slice: StreamSlice,
    /// This stream's state blob (`Null` for full refresh)
    pub stream_state: JsonValue,
    /// Logger scoped to the stream
    pub logger: SyncLogger,
}

impl ReadRequest {
    /// Full-refresh read of one slice
    pub fn full_refresh(slice: StreamSlice, logger: SyncLogger) -> Self {
        Self {
            sync_mode: SyncMode::FullRefresh,
            cursor_field: None,
            slice,
            stream_state: JsonValue::Null,
            logger,
        }
    }

    /// Incremental read of one slice
    pub fn incremental(
        slice: StreamSlice,
        stream_state: JsonValue,
        cursor_field: Option<String>,
        logger: SyncLogger,
    ) -> Self {
        Self {
            sync_mode: SyncMode::Incremental,
            cursor_field,
            slice,
            stream_state,
            logger,
        }
    }
}

/// A named, schema-bearing sequence of records
///
/// Streams are registered with a source and read one slice at a time. The
/// returned sequences are lazy: nothing is fetched until they are polled,
/// and dropping them stops the read.
pub trait Stream: Send + Sync {
    /// Stream name, unique within a source
    fn name(&self) -> &str;

    /// JSON schema of the records
    fn json_schema(&self) -> Result<JsonValue> {
        Ok(empty_schema())
    }

    /// Source-defined primary key
    fn primary_key(&self) -> Vec<Vec<String>> {
        Vec::new()
    }

    /// Enumerate slices for a read
    ///
    /// Defaults to a single trivial slice. Incremental streams usually
    /// start their first slice from `stream_state`.
    fn stream_slices(&self, _request: SliceRequest) -> SliceStream<'_> {
        stream::iter([Ok(StreamSlice::new())]).boxed()
    }

    /// Read the records of one slice
    fn read_records(&self, request: ReadRequest) -> RecordStream<'_>;

    /// Incremental capability, if the stream supports it
    fn as_incremental(&self) -> Option<&dyn IncrementalStream> {
        None
    }

    /// Whether the stream can be read incrementally
    fn supports_incremental(&self) -> bool {
        self.as_incremental().is_some()
    }

    /// Catalog entry describing this stream
    fn as_catalog_stream(&self) -> Result<CatalogStream> {
        let mut entry = CatalogStream::new(self.name(), self.json_schema()?);
        entry.source_defined_primary_key = self.primary_key();

        if let Some(incremental) = self.as_incremental() {
            entry.supported_sync_modes.push(SyncMode::Incremental);
            entry.source_defined_cursor = true;
            entry.default_cursor_field = vec![incremental.cursor_field().to_string()];
        }

        Ok(entry)
    }
}

/// Incremental capability of a stream
pub trait IncrementalStream: Send + Sync {
    /// Top-level record field that orders records
    fn cursor_field(&self) -> &str;

    /// Fold one record into the stream state
    ///
    /// Must be pure and must never move a tracked cursor backwards. The
    /// default keeps the max cursor value seen.
    fn get_updated_state(
        &self,
        current_state: &JsonValue,
        latest_record: &JsonObject,
    ) -> JsonValue {
        merge_cursor(current_state, latest_record, self.cursor_field())
    }

    /// Records between checkpoints; `None` checkpoints once per slice
    fn state_checkpoint_interval(&self) -> Option<u64> {
        None
    }
}
