//! Authenticator implementation
//!
//! Applies static credentials to outgoing requests.

use super::types::{AuthConfig, Location};
use reqwest::RequestBuilder;

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config {
            AuthConfig::None => req,

            AuthConfig::ApiKey {
                location,
                header_name,
                query_param,
                prefix,
                value,
            } => {
                let val = format!("{}{}", prefix.as_deref().unwrap_or(""), value);
                match location {
                    Location::Header => {
                        let header = header_name.as_deref().unwrap_or("Authorization");
                        req.header(header, val)
                    }
                    Location::Query => {
                        let param = query_param.as_deref().unwrap_or("api_key");
                        req.query(&[(param, val)])
                    }
                }
            }

            AuthConfig::Basic { username, password } => req.basic_auth(username, Some(password)),

            AuthConfig::Bearer { token } => req.bearer_auth(token),

            AuthConfig::CustomHeaders { headers } => headers
                .iter()
                .fold(req, |req, (key, value)| req.header(key.as_str(), value.as_str())),
        }
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}
