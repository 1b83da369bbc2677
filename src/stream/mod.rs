//! Stream module
//!
//! The contracts a connector implements to expose data.
//!
//! # Overview
//!
//! - `Stream` - a named record sequence, read one slice at a time
//! - `IncrementalStream` - capability for streams that can resume from state
//! - `HttpStream` - a stream backed by a paginated HTTP API, with retries
//! - `parent_slices` - slices derived from another stream's records

mod http;
mod parent;
mod types;

pub use http::{HttpStream, RequestContext, StreamRetryPolicy};
pub use parent::parent_slices;
pub use types::{
    IncrementalStream, ReadRequest, RecordStream, SliceRequest, SliceStream, Stream,
};
