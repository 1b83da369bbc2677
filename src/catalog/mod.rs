//! Catalog module
//!
//! Discovered catalogs and the caller's configured selection of streams.
//!
//! # Overview
//!
//! - `Catalog` / `CatalogStream` - produced once per source at discovery time
//! - `ConfiguredCatalog` / `ConfiguredStream` - per-sync selection of streams,
//!   sync modes, cursor fields and primary keys
//! - Field-path resolution: cursor fields and primary-key components must be
//!   single top-level properties

mod types;

pub use types::{
    resolve_top_level, Catalog, CatalogStream, ConfiguredCatalog, ConfiguredStream,
};

#[cfg(test)]
mod tests;
