//! Stream slicing module
//!
//! Supports: Single, List, DateTime ranges
//!
//! # Overview
//!
//! Slices split one stream read into sequential sub-reads. Incremental
//! streams usually derive the first slice from their state so a resumed
//! sync skips ranges that were already checkpointed. Slicing by the records
//! of a parent stream lives with the stream contract, see
//! `crate::stream::parent_slices`.

mod slicers;
mod types;

pub use slicers::{
    datetime_from_value, parse_datetime, parse_duration, DatetimeFormat, DatetimeSlicer,
    ListSlicer, SingleSlicer,
};
pub use types::{Slicer, Slices, StreamSlice};

#[cfg(test)]
mod tests;
