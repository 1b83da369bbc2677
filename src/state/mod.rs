//! State module
//!
//! Connector state and the rules for merging new observations into it.
//!
//! # Overview
//!
//! The state module provides:
//! - `ConnectorState` - stream name → opaque per-stream state blob
//! - Cursor comparison and the monotonic max-merge used by incremental streams
//!
//! State is only ever snapshotted into checkpoint messages; persisting the
//! final snapshot between runs is the caller's job.

mod cursor;
mod types;

pub use cursor::{compare_cursor_values, max_cursor_value, merge_cursor};
pub use types::ConnectorState;
