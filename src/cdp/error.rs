//! Errors raised by the DevTools protocol layer.

use std::time::Duration;

use thiserror::Error;

/// Failures talking to a DevTools endpoint or one of its targets.
///
/// These are transport-level errors. The render pipeline maps them onto its
/// own taxonomy depending on which step was running.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The DevTools HTTP endpoint could not be reached or answered badly.
    #[error("DevTools endpoint {endpoint} failed: {reason}")]
    Endpoint { endpoint: String, reason: String },

    /// Failed to establish a WebSocket connection to a target.
    #[error("failed to connect to DevTools target at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// A command returned an error response.
    #[error("CDP error {code}: {message}")]
    Command {
        code: i64,
        message: String,
        data: Option<String>,
    },

    /// A command did not receive its response in time.
    #[error("CDP command '{method}' timed out after {duration:?}")]
    Timeout { method: String, duration: Duration },

    /// The channel was closed while a command or event was outstanding.
    #[error("CDP channel closed")]
    Closed,

    /// Serialization problems or unexpected message shapes.
    #[error("CDP protocol error: {detail}")]
    Protocol { detail: String },
}

impl ProtocolError {
    pub fn endpoint(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        ProtocolError::Endpoint {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub fn protocol(detail: impl Into<String>) -> Self {
        ProtocolError::Protocol {
            detail: detail.into(),
        }
    }
}
