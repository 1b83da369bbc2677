//! Stream registration table

use crate::error::{Error, Result};
use crate::stream::Stream;

/// Streams of a source, keyed by name, in registration order
#[derive(Default)]
pub struct StreamRegistry {
    streams: Vec<Box<dyn Stream>>,
}

impl StreamRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stream; names must be unique
    pub fn register(&mut self, stream: impl Stream + 'static) -> Result<()> {
        self.register_boxed(Box::new(stream))
    }

    /// Register an already boxed stream
    pub fn register_boxed(&mut self, stream: Box<dyn Stream>) -> Result<()> {
        if self.contains(stream.name()) {
            return Err(Error::config(format!(
                "Stream '{}' is registered twice",
                stream.name()
            )));
        }
        self.streams.push(stream);
        Ok(())
    }

    /// Builder-style registration
    pub fn with_stream(mut self, stream: impl Stream + 'static) -> Result<Self> {
        self.register(stream)?;
        Ok(self)
    }

    /// Look up a stream by name
    pub fn get(&self, name: &str) -> Option<&dyn Stream> {
        self.streams
            .iter()
            .find(|s| s.name() == name)
            .map(AsRef::as_ref)
    }

    /// Check whether a stream is registered
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Stream names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name()).collect()
    }

    /// Iterate streams in registration order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Stream> {
        self.streams.iter().map(AsRef::as_ref)
    }

    /// Number of registered streams
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Check if no streams are registered
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl std::fmt::Debug for StreamRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamRegistry")
            .field("streams", &self.names())
            .finish()
    }
}
