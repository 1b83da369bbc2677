//! Pagination module
//!
//! Supports: Cursor, Offset, Page Number, Link Header, Next URL
//!
//! # Overview
//!
//! An HTTP stream turns each response into an optional `PageToken`. These
//! strategies cover the common token shapes so streams can delegate
//! `next_page_token` to a paginator instead of parsing responses by hand.

mod strategies;
mod types;

pub use strategies::{
    CursorPaginator, LinkHeaderPaginator, NextUrlPaginator, NoPaginator, OffsetPaginator,
    PageNumberPaginator,
};
pub use types::{PageToken, Paginator, StopCondition};

pub(crate) use types::lookup;
