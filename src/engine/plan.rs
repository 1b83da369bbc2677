//! Read planning
//!
//! Resolves every configured stream against the registry and validates
//! its configuration before a single request is made.

use super::types::SyncConfig;
use crate::catalog::{ConfiguredCatalog, ConfiguredStream};
use crate::error::{Error, Result};
use crate::source::StreamRegistry;
use crate::stream::{IncrementalStream, Stream};
use crate::types::SyncMode;

/// How one configured stream will be read
pub(crate) struct StreamPlan<'a> {
    pub stream: &'a dyn Stream,
    pub name: String,
    /// Cursor field from the configured catalog, used for full-refresh slicing
    pub configured_cursor: Option<String>,
    /// `Some` when the stream is read incrementally
    pub incremental: Option<IncrementalPlan<'a>>,
}

pub(crate) struct IncrementalPlan<'a> {
    pub capability: &'a dyn IncrementalStream,
    pub cursor_field: String,
    pub checkpoint_interval: Option<u64>,
}

/// Build read plans in catalog order
///
/// Fails with `StreamsNotFound` listing every unknown stream, or with the
/// first configuration error of a known stream. An incremental stream's
/// configured cursor, when given, must match the stream's own cursor field.
pub(crate) fn plan_read<'a>(
    registry: &'a StreamRegistry,
    catalog: &ConfiguredCatalog,
    config: &SyncConfig,
) -> Result<Vec<StreamPlan<'a>>> {
    let missing: Vec<String> = catalog
        .streams
        .iter()
        .filter(|configured| !registry.contains(configured.name()))
        .map(|configured| configured.name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::StreamsNotFound { streams: missing });
    }

    catalog
        .streams
        .iter()
        .map(|configured| {
            let stream = registry
                .get(configured.name())
                .ok_or_else(|| Error::StreamsNotFound {
                    streams: vec![configured.name().to_string()],
                })?;
            plan_stream(stream, configured, config)
        })
        .collect()
}

fn plan_stream<'a>(
    stream: &'a dyn Stream,
    configured: &ConfiguredStream,
    config: &SyncConfig,
) -> Result<StreamPlan<'a>> {
    let name = configured.name().to_string();
    let configured_cursor = configured.cursor_field_name()?.map(str::to_string);
    configured.primary_key_fields()?;

    if configured.state_checkpoint_interval == Some(0) {
        return Err(Error::InvalidCheckpointInterval { stream: name });
    }

    let incremental = match (configured.sync_mode, stream.as_incremental()) {
        (SyncMode::Incremental, Some(capability)) => {
            let defined = capability.cursor_field();
            if defined.is_empty() {
                return Err(Error::MissingCursorField { stream: name });
            }
            // cursors are source-defined: state is merged on the stream's own field
            if let Some(requested) = configured_cursor.as_deref() {
                if requested != defined {
                    return Err(Error::CursorFieldMismatch {
                        stream: name,
                        configured: requested.to_string(),
                        defined: defined.to_string(),
                    });
                }
            }
            let cursor_field = defined.to_string();

            let checkpoint_interval = configured
                .state_checkpoint_interval
                .or_else(|| capability.state_checkpoint_interval())
                .or(config.default_checkpoint_interval);
            if checkpoint_interval == Some(0) {
                return Err(Error::InvalidCheckpointInterval { stream: name });
            }

            Some(IncrementalPlan {
                capability,
                cursor_field,
                checkpoint_interval,
            })
        }
        _ => None,
    };

    Ok(StreamPlan {
        stream,
        name,
        configured_cursor,
        incremental,
    })
}
