//! Engine types
//!
//! Configuration and counters for the read loop.

use crate::error::Result;
use crate::protocol::Message;
use futures::stream::BoxStream;

/// Lazy sequence of protocol messages produced by a read
pub type MessageStream<'a> = BoxStream<'a, Result<Message>>;

/// Configuration for sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Checkpoint interval for incremental streams that neither declare one
    /// nor have one configured; `None` checkpoints once per slice
    pub default_checkpoint_interval: Option<u64>,
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback checkpoint interval
    #[must_use]
    pub fn with_default_checkpoint_interval(mut self, interval: u64) -> Self {
        self.default_checkpoint_interval = Some(interval);
        self
    }
}

/// Counters kept while a read runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records emitted across all streams
    pub records_read: u64,
    /// STATE messages emitted
    pub checkpoints: u64,
    /// Slices read
    pub slices_read: u64,
    /// Streams read to completion
    pub streams_completed: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one record
    pub fn add_record(&mut self) {
        self.records_read += 1;
    }

    /// Count one checkpoint
    pub fn add_checkpoint(&mut self) {
        self.checkpoints += 1;
    }

    /// Count one slice
    pub fn add_slice(&mut self) {
        self.slices_read += 1;
    }

    /// Count one finished stream
    pub fn add_stream(&mut self) {
        self.streams_completed += 1;
    }
}
