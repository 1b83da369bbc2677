//! Paginated HTTP stream contract

use super::types::{RecordStream, Stream};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpResponse, RequestConfig, RetryPolicy};
use crate::pagination::PageToken;
use crate::slicing::StreamSlice;
use crate::types::{JsonObject, JsonValue, Method};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Inputs shared by the request-building hooks of an `HttpStream`
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// This stream's state blob
    pub stream_state: &'a JsonValue,
    /// Slice being read
    pub slice: &'a StreamSlice,
    /// Continuation from the previous page, `None` on the first page
    pub page_token: Option<&'a PageToken>,
}

/// A stream backed by a paginated HTTP API
///
/// Implementors describe one request and how to read its response; the
/// provided `read_pages` drives pagination and retries. A stream's
/// `Stream::read_records` normally just calls `read_pages`.
pub trait HttpStream: Stream {
    /// Client used for every request of this stream
    fn client(&self) -> &HttpClient;

    /// Base URL, e.g. `https://slack.com/api/`
    fn url_base(&self) -> &str;

    /// Path of the request, relative to `url_base`
    fn path(&self, ctx: RequestContext<'_>) -> String;

    /// HTTP method
    fn http_method(&self) -> Method {
        Method::GET
    }

    /// Query parameters; defaults to the page token's parameters
    fn request_params(&self, ctx: RequestContext<'_>) -> HashMap<String, String> {
        ctx.page_token
            .map(|token| token.query_params.clone())
            .unwrap_or_default()
    }

    /// Extra request headers
    fn request_headers(&self, _ctx: RequestContext<'_>) -> HashMap<String, String> {
        HashMap::new()
    }

    /// JSON request body
    fn request_body_json(&self, _ctx: RequestContext<'_>) -> Option<JsonValue> {
        None
    }

    /// Records of one page
    fn parse_response(
        &self,
        response: &HttpResponse,
        ctx: RequestContext<'_>,
    ) -> Result<Vec<JsonObject>>;

    /// Continuation for the next page, `None` when the slice is exhausted
    fn next_page_token(&self, response: &HttpResponse) -> Result<Option<PageToken>>;

    /// Whether a failed response should be retried; 429 and 5xx by default
    fn should_retry(&self, response: &HttpResponse) -> bool {
        crate::error::is_retryable_status(response.status())
    }

    /// Wait before retrying `response`
    ///
    /// Defaults to the `Retry-After` header of a 429; `None` falls back to
    /// the client's exponential backoff.
    fn backoff_time(&self, response: &HttpResponse) -> Option<Duration> {
        if response.status() == 429 {
            response.retry_after()
        } else {
            None
        }
    }

    /// Retries allowed for one request
    fn max_retries(&self) -> u32 {
        5
    }

    /// Read every page of a slice
    ///
    /// One request is issued per pull once the previous page's records have
    /// been consumed. Retryable failures are retried in place; any other
    /// failure ends the sequence with an error.
    fn read_pages(&self, stream_state: JsonValue, slice: StreamSlice) -> RecordStream<'_> {
        let pages = stream::try_unfold(Some(None::<PageToken>), move |next| {
            let stream_state = stream_state.clone();
            let slice = slice.clone();
            async move {
                let Some(token) = next else {
                    return Ok::<_, Error>(None);
                };
                let ctx = RequestContext {
                    stream_state: &stream_state,
                    slice: &slice,
                    page_token: token.as_ref(),
                };

                let (url, config) = page_request(self, ctx);
                let policy = StreamRetryPolicy::new(self);
                let response = self
                    .client()
                    .send(self.http_method(), &url, &config, &policy)
                    .await?;
                let records = self.parse_response(&response, ctx)?;
                let next_token = self.next_page_token(&response)?;
                debug!(
                    "Stream {} fetched page with {} records, more pages: {}",
                    self.name(),
                    records.len(),
                    next_token.is_some()
                );

                Ok(Some((records, next_token.map(Some))))
            }
        });

        pages
            .map_ok(|records| stream::iter(records.into_iter().map(Ok::<_, Error>)))
            .try_flatten()
            .boxed()
    }
}

/// Retry policy delegating to an `HttpStream`'s hooks
pub struct StreamRetryPolicy<'a, S: ?Sized> {
    stream: &'a S,
}

impl<'a, S: HttpStream + ?Sized> StreamRetryPolicy<'a, S> {
    /// Wrap a stream
    pub fn new(stream: &'a S) -> Self {
        Self { stream }
    }
}

impl<S: HttpStream + ?Sized> RetryPolicy for StreamRetryPolicy<'_, S> {
    fn max_retries(&self) -> u32 {
        self.stream.max_retries()
    }

    fn should_retry(&self, response: &HttpResponse) -> bool {
        self.stream.should_retry(response)
    }

    fn backoff_time(&self, response: &HttpResponse) -> Option<Duration> {
        self.stream.backoff_time(response)
    }
}

/// URL and request options for one page
fn page_request<S: HttpStream + ?Sized>(
    stream: &S,
    ctx: RequestContext<'_>,
) -> (String, RequestConfig) {
    let url = match ctx.page_token.and_then(|token| token.next_url.as_deref()) {
        Some(next_url) => next_url.to_string(),
        None => join_url(stream.url_base(), &stream.path(ctx)),
    };
    let mut config = RequestConfig::new()
        .queries(stream.request_params(ctx))
        .headers(stream.request_headers(ctx));
    if let Some(body) = stream.request_body_json(ctx) {
        config = config.json(body);
    }
    (url, config)
}

/// Join a base URL and a relative path with exactly one slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}
