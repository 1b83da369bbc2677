//! Decoder types and traits

use super::decoders::{JsonDecoder, JsonlDecoder};
use crate::error::Result;
use crate::types::JsonObject;
use serde::{Deserialize, Serialize};

/// Format of the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoderFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

impl DecoderFormat {
    /// Build a decoder for this format; `record_path` only applies to JSON
    pub fn decoder(self, record_path: Option<&str>) -> Box<dyn RecordDecoder> {
        match (self, record_path) {
            (Self::Json, Some(path)) => Box::new(JsonDecoder::with_path(path)),
            (Self::Json, None) => Box::new(JsonDecoder::new()),
            (Self::Jsonl, _) => Box::new(JsonlDecoder::new()),
        }
    }
}

/// Trait for decoding one page body into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the body into records
    ///
    /// Every record must be a JSON object.
    fn decode(&self, body: &[u8]) -> Result<Vec<JsonObject>>;
}
