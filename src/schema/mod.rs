//! Stream schema loading
//!
//! Streams report their record schema through a `SchemaLoader`, either from
//! `schemas/<stream>.json` files or from schemas compiled into the binary.

mod loaders;
mod types;

pub use loaders::{empty_schema, DirSchemaLoader, StaticSchemaLoader};
pub use types::SchemaLoader;
