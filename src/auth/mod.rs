//! Authentication module
//!
//! Supports: API Key, Basic, Bearer token, Custom Headers
//!
//! The `Authenticator` applies the configured credentials to every outgoing
//! request built by the HTTP client.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, Location};
