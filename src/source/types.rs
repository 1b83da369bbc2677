//! Source trait

use super::registry::StreamRegistry;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::logger::SyncLogger;
use crate::protocol::{ConnectionStatus, ConnectorSpec};
use crate::types::JsonValue;
use async_trait::async_trait;

/// A connector: a named set of streams plus a connection check
///
/// Reading is done by the engine over the registry returned from
/// `streams`, see `crate::engine::read`.
#[async_trait]
pub trait Source: Send + Sync {
    /// Source name, used for logging
    fn name(&self) -> &str;

    /// Connector specification (configuration schema)
    fn spec(&self) -> ConnectorSpec;

    /// Verify that `config` can reach the upstream system
    ///
    /// Return `ConnectionStatus::failed` for an expected failure such as a
    /// rejected token; an `Err` is reported as a failure as well.
    async fn check_connection(
        &self,
        logger: &SyncLogger,
        config: &JsonValue,
    ) -> Result<ConnectionStatus>;

    /// Build the streams for `config`
    fn streams(&self, config: &JsonValue) -> Result<StreamRegistry>;

    /// Run the connection check, folding errors into a failed status
    async fn check(&self, logger: &SyncLogger, config: &JsonValue) -> ConnectionStatus {
        match self.check_connection(logger, config).await {
            Ok(status) => {
                if !status.is_success() {
                    logger.warn(format!(
                        "Connection check failed: {}",
                        status.message.as_deref().unwrap_or("no reason given")
                    ));
                }
                status
            }
            Err(e) => {
                logger.error(format!("Connection check raised an error: {e}"));
                ConnectionStatus::failed(e.to_string())
            }
        }
    }

    /// Describe every stream of the source
    fn discover(&self, config: &JsonValue) -> Result<Catalog> {
        let registry = self.streams(config)?;
        let streams = registry
            .iter()
            .map(|stream| stream.as_catalog_stream())
            .collect::<Result<Vec<_>>>()?;
        Ok(Catalog { streams })
    }
}
