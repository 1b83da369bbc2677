//! Response decoder module
//!
//! Supports: JSON, JSONL
//!
//! Decoders turn one buffered page body into the records it carries. HTTP
//! streams typically call a decoder from `parse_response`.

mod decoders;
mod types;

pub use decoders::{JsonDecoder, JsonlDecoder};
pub use types::{DecoderFormat, RecordDecoder};
