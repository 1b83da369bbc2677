//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{
    count_records, current_param, lookup_string, PageToken, Paginator, StopCondition,
};
use crate::error::Result;
use crate::http::HttpResponse;
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based pagination (e.g., Slack, Stripe)
///
/// Uses a cursor value from the response to fetch the next page.
/// Common patterns:
/// - `?cursor=dXNlcjpVMDYxTkZUVDI=` with `response_metadata.next_cursor`
/// - `?starting_after=obj_123`
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
    /// Dotted path to the cursor in the response body
    pub cursor_path: String,
    /// Stop condition checked before the cursor
    pub stop_condition: StopCondition,
    /// Optional page size parameter sent with every request
    pub page_size: Option<(String, u32)>,
}

impl CursorPaginator {
    /// Create a new cursor paginator; an empty or missing cursor ends pagination
    pub fn new(cursor_param: impl Into<String>, cursor_path: impl Into<String>) -> Self {
        Self {
            cursor_param: cursor_param.into(),
            cursor_path: cursor_path.into(),
            stop_condition: StopCondition::Never,
            page_size: None,
        }
    }

    /// Set stop condition
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }

    /// Send a page size parameter with every request
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.page_size = Some((param.into(), size));
        self
    }

    fn size_params(&self) -> HashMap<String, String> {
        self.page_size
            .iter()
            .map(|(param, size)| (param.clone(), size.to_string()))
            .collect()
    }
}

impl Paginator for CursorPaginator {
    fn initial_params(&self) -> HashMap<String, String> {
        self.size_params()
    }

    fn next_page(&self, response: &HttpResponse) -> Result<Option<PageToken>> {
        let body: Value = response.json()?;

        if self.stop_condition.should_stop(&body, 0, usize::MAX) {
            return Ok(None);
        }

        Ok(lookup_string(&body, &self.cursor_path).map(|cursor| {
            let mut params = self.size_params();
            params.insert(self.cursor_param.clone(), cursor);
            PageToken::params(params)
        }))
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// Uses offset and limit parameters to paginate. The current offset is
/// read back from the request URL.
/// Common patterns:
/// - `?offset=100&limit=50`
/// - `?skip=100&take=50`
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for limit
    pub limit_param: String,
    /// Number of records per page
    pub limit_value: u32,
    /// Dotted path to the records array (body root when `None`)
    pub records_path: Option<String>,
    /// Extra stop condition
    pub stop_condition: StopCondition,
}

impl OffsetPaginator {
    /// Create a new offset paginator
    pub fn new(
        offset_param: impl Into<String>,
        limit_param: impl Into<String>,
        limit_value: u32,
    ) -> Self {
        Self {
            offset_param: offset_param.into(),
            limit_param: limit_param.into(),
            limit_value,
            records_path: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    /// Set the records path used to count a page
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    /// Set stop condition
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }

    fn params(&self, offset: u64) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert(self.offset_param.clone(), offset.to_string());
        params.insert(self.limit_param.clone(), self.limit_value.to_string());
        params
    }
}

impl Paginator for OffsetPaginator {
    fn initial_params(&self) -> HashMap<String, String> {
        self.params(0)
    }

    fn next_page(&self, response: &HttpResponse) -> Result<Option<PageToken>> {
        let body: Value = response.json()?;
        let offset = current_param(response, &self.offset_param).unwrap_or(0);
        let records = count_records(&body, self.records_path.as_deref());

        // a short page is the last page
        if records < self.limit_value as usize
            || self.stop_condition.should_stop(&body, offset, records)
        {
            return Ok(None);
        }

        Ok(Some(PageToken::params(
            self.params(offset + u64::from(self.limit_value)),
        )))
    }
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination
///
/// Uses a page number parameter to paginate.
/// Common patterns:
/// - `?page=2`
/// - `?page=2&per_page=50`
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    /// Query parameter name for page number
    pub page_param: String,
    /// First page number (usually 0 or 1)
    pub start_page: u64,
    /// Optional page size parameter name and value
    pub page_size: Option<(String, u32)>,
    /// Dotted path to the records array (body root when `None`)
    pub records_path: Option<String>,
    /// Stop condition
    pub stop_condition: StopCondition,
}

impl PageNumberPaginator {
    /// Create a new page number paginator
    pub fn new(page_param: impl Into<String>, start_page: u64) -> Self {
        Self {
            page_param: page_param.into(),
            start_page,
            page_size: None,
            records_path: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    /// Set page size parameter
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.page_size = Some((param.into(), size));
        self
    }

    /// Set the records path used to count a page
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    /// Set stop condition
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }

    fn params(&self, page: u64) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert(self.page_param.clone(), page.to_string());
        if let Some((param, size)) = &self.page_size {
            params.insert(param.clone(), size.to_string());
        }
        params
    }
}

impl Paginator for PageNumberPaginator {
    fn initial_params(&self) -> HashMap<String, String> {
        self.params(self.start_page)
    }

    fn next_page(&self, response: &HttpResponse) -> Result<Option<PageToken>> {
        let body: Value = response.json()?;
        let page = current_param(response, &self.page_param).unwrap_or(self.start_page);
        let records = count_records(&body, self.records_path.as_deref());

        if self.stop_condition.should_stop(&body, page, records) {
            return Ok(None);
        }
        if let Some((_, size)) = &self.page_size {
            if records < *size as usize {
                return Ok(None);
            }
        }

        Ok(Some(PageToken::params(self.params(page + 1))))
    }
}

// ============================================================================
// Link Header Pagination
// ============================================================================

/// Link header pagination (RFC 5988)
///
/// Extracts next page URL from the Link header.
/// Format: `Link: <https://api.github.com/...?page=2>; rel="next", ...`
#[derive(Debug, Clone)]
pub struct LinkHeaderPaginator {
    /// Rel value to follow (default: "next")
    pub rel: String,
}

impl Default for LinkHeaderPaginator {
    fn default() -> Self {
        Self::new("next")
    }
}

impl LinkHeaderPaginator {
    /// Create a new link header paginator
    pub fn new(rel: impl Into<String>) -> Self {
        Self { rel: rel.into() }
    }
}

impl Paginator for LinkHeaderPaginator {
    fn next_page(&self, response: &HttpResponse) -> Result<Option<PageToken>> {
        Ok(response
            .header("link")
            .and_then(|link| parse_link_header(link, &self.rel))
            .map(PageToken::url))
    }
}

/// Parse a Link header and extract the URL for the given rel
pub(crate) fn parse_link_header(header: &str, target_rel: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut url = None;
        let mut rel = None;

        for segment in part.split(';').map(str::trim) {
            if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                url = Some(inner);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches(|c| c == '"' || c == '\''));
            }
        }

        match (url, rel) {
            (Some(u), Some(r)) if r.split_whitespace().any(|r| r == target_rel) => {
                Some(u.to_string())
            }
            _ => None,
        }
    })
}

// ============================================================================
// Next URL Pagination
// ============================================================================

/// Next URL pagination (URL in response body)
///
/// Common patterns:
/// - `{ "next": "https://api.example.com/items?page=2" }`
/// - `{ "pagination": { "next_url": "..." } }`
#[derive(Debug, Clone)]
pub struct NextUrlPaginator {
    /// Dotted path to the next URL in the response body
    pub path: String,
}

impl NextUrlPaginator {
    /// Create a new next URL paginator
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Paginator for NextUrlPaginator {
    fn next_page(&self, response: &HttpResponse) -> Result<Option<PageToken>> {
        let body: Value = response.json()?;
        Ok(lookup_string(&body, &self.path).map(PageToken::url))
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request per slice
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn next_page(&self, _response: &HttpResponse) -> Result<Option<PageToken>> {
        Ok(None)
    }
}
