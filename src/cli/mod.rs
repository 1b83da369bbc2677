//! CLI module
//!
//! Command-line launcher for connectors built on this crate.
//!
//! # Commands
//!
//! - `spec` - Print the connector specification
//! - `check` - Test connection to the API
//! - `discover` - List available streams
//! - `read` - Extract data from streams
//!
//! Protocol messages go to stdout, one JSON document per line; logs go to
//! stderr.

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{launch, load_catalog, load_config, Runner};
