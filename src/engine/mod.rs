//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Reads a configured catalog into RECORD and STATE messages
//! - `SyncConfig` - Configuration for sync operations
//! - `MessageStream` - The lazy message sequence a read produces
//!
//! Streams are read one after another in catalog order. Incremental streams
//! fold every record into the connector state and checkpoint it as a STATE
//! message carrying the whole state map.

mod plan;
mod read_loop;
mod types;

pub use types::{MessageStream, SyncConfig, SyncStats};

use crate::catalog::ConfiguredCatalog;
use crate::error::Result;
use crate::logger::SyncLogger;
use crate::source::StreamRegistry;
use crate::state::ConnectorState;
use futures::stream::{self, StreamExt};
use read_loop::ReadLoop;

/// Sync engine for orchestrating data extraction
///
/// Borrows the registry a source built, so every message stream it returns
/// lives no longer than the registry.
pub struct SyncEngine<'a> {
    /// Streams available to read
    registry: &'a StreamRegistry,
    /// Logger handed to every stream
    logger: SyncLogger,
    /// Sync configuration
    config: SyncConfig,
}

impl<'a> SyncEngine<'a> {
    /// Create a new sync engine
    pub fn new(registry: &'a StreamRegistry, logger: SyncLogger) -> Self {
        Self {
            registry,
            logger,
            config: SyncConfig::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the sync configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Read every stream of `catalog`, resuming from `seed_state`
    ///
    /// Configuration errors (unknown streams, nested cursor or primary key
    /// paths, incremental streams without a cursor field, a zero checkpoint
    /// interval) are returned here, before any stream is touched. Errors
    /// raised while reading end the returned stream after being yielded.
    pub fn read(
        &self,
        catalog: &ConfiguredCatalog,
        seed_state: &ConnectorState,
    ) -> Result<MessageStream<'a>> {
        let plans = plan::plan_read(self.registry, catalog, &self.config).inspect_err(|e| {
            self.logger.error(format!("Invalid read configuration: {e}"));
        })?;

        let read_loop = ReadLoop::new(plans, seed_state.clone(), self.logger.clone());
        Ok(stream::unfold(read_loop, |mut read_loop| async move {
            read_loop
                .next_message()
                .await
                .map(|message| (message, read_loop))
        })
        .boxed())
    }
}

/// Read `catalog` from `registry` with the default configuration
pub fn read<'a>(
    registry: &'a StreamRegistry,
    logger: SyncLogger,
    catalog: &ConfiguredCatalog,
    seed_state: &ConnectorState,
) -> Result<MessageStream<'a>> {
    SyncEngine::new(registry, logger).read(catalog, seed_state)
}
