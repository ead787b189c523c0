use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cdp::ProtocolError;

/// Distinguishable failure kinds of a render operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderErrorKind {
    InvalidRequest,
    EngineUnreachable,
    EmulationRejected,
    NavigationFailed,
    LoadTimeout,
    CaptureFailed,
    Cancelled,
}

/// Failures of the render pipeline. Every variant aborts the remaining steps;
/// none of them prevents the session from being closed.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid render request: {0}")]
    InvalidRequest(String),

    #[error("Browser engine unreachable: {0}")]
    EngineUnreachable(#[source] ProtocolError),

    #[error("Viewport emulation rejected: {0}")]
    EmulationRejected(#[source] ProtocolError),

    #[error("Navigation to {uri} failed: {reason}")]
    NavigationFailed { uri: String, reason: String },

    #[error("Document did not finish loading within {0:?}")]
    LoadTimeout(Duration),

    #[error("PDF capture failed: {0}")]
    CaptureFailed(String),

    #[error("Render cancelled")]
    Cancelled,
}

impl RenderError {
    pub fn kind(&self) -> RenderErrorKind {
        match self {
            RenderError::InvalidRequest(_) => RenderErrorKind::InvalidRequest,
            RenderError::EngineUnreachable(_) => RenderErrorKind::EngineUnreachable,
            RenderError::EmulationRejected(_) => RenderErrorKind::EmulationRejected,
            RenderError::NavigationFailed { .. } => RenderErrorKind::NavigationFailed,
            RenderError::LoadTimeout(_) => RenderErrorKind::LoadTimeout,
            RenderError::CaptureFailed(_) => RenderErrorKind::CaptureFailed,
            RenderError::Cancelled => RenderErrorKind::Cancelled,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        RenderError::InvalidRequest(message.into())
    }

    pub fn navigation_failed(uri: impl Into<String>, reason: impl ToString) -> Self {
        RenderError::NavigationFailed {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    pub fn capture_failed(reason: impl ToString) -> Self {
        RenderError::CaptureFailed(reason.to_string())
    }
}

/// Application-level error: everything the CLI and the HTTP layer can hit.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl PrintError {
    pub fn config(message: impl Into<String>) -> Self {
        PrintError::Config(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            PrintError::Io(e) => ErrorPayload::new(
                ErrorCategory::Io,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            PrintError::Render(e) => render_payload(e),
            PrintError::Protocol(e) => ErrorPayload::new(
                ErrorCategory::Engine,
                e.to_string(),
                "Check that Chrome is running with --remote-debugging-port and is reachable.",
            ),
            PrintError::Config(msg) => ErrorPayload::new(
                ErrorCategory::Config,
                msg.to_string(),
                "Check flags, environment overrides and the config file.",
            ),
            PrintError::Server(msg) => ErrorPayload::new(
                ErrorCategory::Server,
                msg.to_string(),
                "Check the listen address and that the port is free.",
            ),
        }
    }
}

fn render_payload(err: &RenderError) -> ErrorPayload {
    let remediation = match err.kind() {
        RenderErrorKind::InvalidRequest => {
            "Paper width/height must be positive and the document must be a file path or URL."
        }
        RenderErrorKind::EngineUnreachable => {
            "Start Chrome with --remote-debugging-port and check --engine-host/--engine-port."
        }
        RenderErrorKind::EmulationRejected => {
            "The engine refused the viewport; try a smaller paper size."
        }
        RenderErrorKind::NavigationFailed => {
            "Verify the document path/URL exists and is readable by the browser."
        }
        RenderErrorKind::LoadTimeout => {
            "Increase --nav-timeout or make sure the document stops loading."
        }
        RenderErrorKind::CaptureFailed => "Retry; if persistent, check the engine's logs.",
        RenderErrorKind::Cancelled => "The render was cancelled before it completed.",
    };
    let category = match err.kind() {
        RenderErrorKind::InvalidRequest => ErrorCategory::Request,
        RenderErrorKind::EngineUnreachable => ErrorCategory::Engine,
        _ => ErrorCategory::Render,
    };
    ErrorPayload::new(category, err.to_string(), remediation).with_kind(err.kind())
}

pub type Result<T> = std::result::Result<T, PrintError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Io,
    Request,
    Engine,
    Render,
    Server,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<RenderErrorKind>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            message,
            remediation: Some(remediation.into()),
        }
    }

    pub fn with_kind(mut self, kind: RenderErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }
}
