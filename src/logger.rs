//! Explicit logging handle
//!
//! A `SyncLogger` is created once per source invocation and handed to the
//! read loop and to every stream call, so log lines carry the source name
//! without any process-wide logger state.

use tracing::Span;

/// Logging handle scoped to one source
#[derive(Debug, Clone)]
pub struct SyncLogger {
    span: Span,
}

impl SyncLogger {
    /// Create a logger for the named source
    pub fn new(source: &str) -> Self {
        Self {
            span: tracing::info_span!("source", name = %source),
        }
    }

    /// Create a logger that inherits the caller's current span
    pub fn current() -> Self {
        Self {
            span: Span::current(),
        }
    }

    /// Derive a child logger for one stream
    #[must_use]
    pub fn for_stream(&self, stream: &str) -> Self {
        Self {
            span: tracing::info_span!(parent: &self.span, "stream", name = %stream),
        }
    }

    /// The underlying span
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Log at debug level
    pub fn debug(&self, message: impl AsRef<str>) {
        tracing::debug!(parent: &self.span, "{}", message.as_ref());
    }

    /// Log at info level
    pub fn info(&self, message: impl AsRef<str>) {
        tracing::info!(parent: &self.span, "{}", message.as_ref());
    }

    /// Log at warn level
    pub fn warn(&self, message: impl AsRef<str>) {
        tracing::warn!(parent: &self.span, "{}", message.as_ref());
    }

    /// Log at error level
    pub fn error(&self, message: impl AsRef<str>) {
        tracing::error!(parent: &self.span, "{}", message.as_ref());
    }
}

impl Default for SyncLogger {
    fn default() -> Self {
        Self::current()
    }
}
