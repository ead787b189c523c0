//! DevTools HTTP endpoint: target creation and disposal.
//!
//! Chrome exposes `/json/new` and `/json/close/{id}` next to its WebSocket
//! debugger. Target creation must use `PUT` on current Chrome releases.

use std::time::Duration;

use serde::Deserialize;

use super::error::ProtocolError;

/// Host and port of a DevTools HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEndpoint {
    pub host: String,
    pub port: u16,
}

impl Default for EngineEndpoint {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9222,
        }
    }
}

impl EngineEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for EngineEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A target as described by `/json/new`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub id: String,
    #[serde(default)]
    pub web_socket_debugger_url: String,
    #[serde(default, rename = "type")]
    pub target_type: String,
}

/// Thin reqwest wrapper over the endpoint's JSON routes.
#[derive(Debug, Clone)]
pub struct EndpointClient {
    endpoint: EngineEndpoint,
    http: reqwest::Client,
}

impl EndpointClient {
    pub fn new(endpoint: EngineEndpoint, request_timeout: Duration) -> Result<Self, ProtocolError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProtocolError::endpoint(endpoint.to_string(), e))?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &EngineEndpoint {
        &self.endpoint
    }

    /// Allocate a new blank target.
    pub async fn new_target(&self) -> Result<TargetInfo, ProtocolError> {
        let url = format!("{}/json/new?about:blank", self.endpoint.base_url());
        let response = self
            .http
            .put(&url)
            .send()
            .await
            .map_err(|e| ProtocolError::endpoint(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProtocolError::endpoint(
                &url,
                format!("status {status}: {}", body.trim()),
            ));
        }

        let target: TargetInfo = response
            .json()
            .await
            .map_err(|e| ProtocolError::endpoint(&url, format!("invalid target JSON: {e}")))?;

        if target.web_socket_debugger_url.is_empty() {
            return Err(ProtocolError::endpoint(
                &url,
                format!("target {} has no webSocketDebuggerUrl", target.id),
            ));
        }
        Ok(target)
    }

    /// Dispose of a target.
    pub async fn close_target(&self, target_id: &str) -> Result<(), ProtocolError> {
        let url = format!("{}/json/close/{}", self.endpoint.base_url(), target_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProtocolError::endpoint(&url, e))?;

        if !response.status().is_success() {
            return Err(ProtocolError::endpoint(
                &url,
                format!("status {}", response.status()),
            ));
        }
        Ok(())
    }
}
