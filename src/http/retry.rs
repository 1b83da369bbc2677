//! Retry policy
//!
//! The client owns the retry loop; a `RetryPolicy` decides how many times a
//! request may be retried and how long to wait before each retry. Returning
//! `None` from `backoff_time` falls back to the client's configured backoff.

use super::response::HttpResponse;
use crate::error::is_retryable_status;
use std::time::Duration;

/// Per-request retry decisions
pub trait RetryPolicy: Send + Sync {
    /// Maximum number of retries after the first attempt
    fn max_retries(&self) -> u32;

    /// Whether a non-success response should be retried
    fn should_retry(&self, response: &HttpResponse) -> bool {
        is_retryable_status(response.status())
    }

    /// Explicit wait before retrying `response`, or `None` for the default backoff
    fn backoff_time(&self, _response: &HttpResponse) -> Option<Duration> {
        None
    }
}

/// Policy driven only by client configuration
///
/// Honors a numeric `Retry-After` header on 429 responses.
#[derive(Debug, Clone, Copy)]
pub struct DefaultRetryPolicy {
    max_retries: u32,
}

impl DefaultRetryPolicy {
    /// Create a policy allowing `max_retries` retries
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn backoff_time(&self, response: &HttpResponse) -> Option<Duration> {
        if response.status() == 429 {
            response.retry_after()
        } else {
            None
        }
    }
}
