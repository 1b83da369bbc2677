//! Message envelope
//!
//! Messages written at the process boundary. Every message is tagged by its
//! `type`; the read loop only produces `RECORD` and `STATE`, the launcher
//! writes the rest.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::state::ConnectorState;
use crate::types::{JsonObject, JsonValue, LogLevel};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// Envelope
// ============================================================================

/// A protocol message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// A single record
    Record {
        /// Record payload
        record: RecordMessage,
    },
    /// A checkpoint of the whole connector state
    State {
        /// State payload
        state: StateMessage,
    },
    /// Log line
    Log {
        /// Log payload
        log: LogMessage,
    },
    /// Result of a connection check
    ConnectionStatus {
        /// Check result
        connection_status: ConnectionStatus,
    },
    /// Discovered catalog
    Catalog {
        /// Catalog payload
        catalog: Catalog,
    },
    /// Connector specification
    Spec {
        /// Spec payload
        spec: ConnectorSpec,
    },
}

impl Message {
    /// Create a record message stamped with the current time
    pub fn record(stream: impl Into<String>, data: JsonObject) -> Self {
        Self::Record {
            record: RecordMessage {
                stream: stream.into(),
                data,
                emitted_at: Utc::now().timestamp_millis(),
            },
        }
    }

    /// Create a state message from a snapshot of the connector state
    pub fn state(data: ConnectorState) -> Self {
        Self::State {
            state: StateMessage { data },
        }
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            log: LogMessage {
                level,
                message: message.into(),
            },
        }
    }

    /// Create a connection status message
    pub fn connection_status(status: ConnectionStatus) -> Self {
        Self::ConnectionStatus {
            connection_status: status,
        }
    }

    /// Create a catalog message
    pub fn catalog(catalog: Catalog) -> Self {
        Self::Catalog { catalog }
    }

    /// Create a spec message
    pub fn spec(spec: ConnectorSpec) -> Self {
        Self::Spec { spec }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Record payload, if this is a record message
    pub fn as_record(&self) -> Option<&RecordMessage> {
        match self {
            Self::Record { record } => Some(record),
            _ => None,
        }
    }

    /// State payload, if this is a state message
    pub fn as_state(&self) -> Option<&ConnectorState> {
        match self {
            Self::State { state } => Some(&state.data),
            _ => None,
        }
    }

    /// Serialize as a single JSON line
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A record emitted for a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMessage {
    /// Stream name
    pub stream: String,
    /// Record data
    pub data: JsonObject,
    /// Emission time in epoch milliseconds
    pub emitted_at: i64,
}

/// A checkpoint carrying the entire connector state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    /// Connector state snapshot
    pub data: ConnectorState,
}

/// A log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    /// Severity
    pub level: LogLevel,
    /// Text
    pub message: String,
}

/// Outcome of a connection check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Credentials and configuration are usable
    Succeeded,
    /// The check failed
    Failed,
}

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Outcome
    pub status: Status,
    /// Human-readable reason, set on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConnectionStatus {
    /// Create a successful status
    pub fn succeeded() -> Self {
        Self {
            status: Status::Succeeded,
            message: None,
        }
    }

    /// Create a failed status
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            message: Some(message.into()),
        }
    }

    /// Check if the status is a success
    pub fn is_success(&self) -> bool {
        self.status == Status::Succeeded
    }
}

/// Connector specification returned by `spec`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Documentation link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    /// JSON schema of the connector configuration
    pub connection_specification: JsonValue,
    /// Whether any stream supports incremental sync
    #[serde(default)]
    pub supports_incremental: bool,
}
