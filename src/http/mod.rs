//! HTTP client module
//!
//! Provides the request layer under every HTTP stream.
//!
//! # Features
//!
//! - **Bounded Retries**: 429 and 5xx responses retried under a `RetryPolicy`
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Authentication**: Integration with auth module

mod client;
mod rate_limit;
mod response;
mod retry;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use response::HttpResponse;
pub use retry::{DefaultRetryPolicy, RetryPolicy};
