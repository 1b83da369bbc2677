//! Buffered HTTP response
//!
//! The retry loop reads each response body fully before deciding what to
//! do with it, so streams receive a plain value they can inspect as many
//! times as they need (pagination, parsing, backoff hints).

use crate::error::{Error, Result};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// A fully read HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Bytes,
}

impl HttpResponse {
    /// Assemble a response from its parts
    pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            url,
            body: body.into(),
        }
    }

    /// Drain a reqwest response into memory
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            headers,
            url,
            body,
        })
    }

    /// Numeric status code
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Look up a header as a string, ignoring non-UTF8 values
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The final URL after redirects
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Raw body bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| Error::decode(format!("Response body is not UTF-8: {e}")))
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as an untyped JSON value
    pub fn json_value(&self) -> Result<Value> {
        self.json()
    }

    /// `Retry-After` expressed in seconds, if present, numeric and
    /// representable as a `Duration`
    pub fn retry_after(&self) -> Option<Duration> {
        self.header("retry-after")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Lossy body text for error messages
    pub(crate) fn body_snippet(&self) -> String {
        const LIMIT: usize = 512;
        let text = String::from_utf8_lossy(&self.body);
        if text.len() > LIMIT {
            let mut end = LIMIT;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &text[..end])
        } else {
            text.into_owned()
        }
    }
}
