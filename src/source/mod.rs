//! Source module
//!
//! A source bundles a connection check with the streams it exposes. The
//! launcher and the engine only talk to connectors through this trait.

mod registry;
mod types;

pub use registry::StreamRegistry;
pub use types::Source;
