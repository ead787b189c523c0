//! Engine and channel abstractions.
//!
//! The render pipeline only talks to [`BrowserEngine`] and [`TargetChannel`].
//! [`CdpEngine`] implements them against a real DevTools endpoint; tests plug
//! in fakes that inject faults and count calls.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::client::CdpClient;
use super::endpoint::{EndpointClient, EngineEndpoint, TargetInfo};
use super::error::ProtocolError;

/// Allocates, connects to and disposes of browser targets.
#[async_trait]
pub trait BrowserEngine: Send + Sync + 'static {
    type Channel: TargetChannel;

    /// Ask the engine for a fresh target.
    async fn create_target(&self) -> Result<TargetInfo, ProtocolError>;

    /// Open the control channel to a target.
    async fn connect(&self, target: &TargetInfo) -> Result<Self::Channel, ProtocolError>;

    /// Release a target.
    async fn close_target(&self, target: &TargetInfo) -> Result<(), ProtocolError>;
}

/// Bidirectional control channel to one target.
#[async_trait]
pub trait TargetChannel: Send + Sync + 'static {
    /// Issue a command and wait for its result.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ProtocolError>;

    /// Wait for the next event named `method`. Unbounded; callers add timeouts.
    async fn wait_event(&mut self, method: &str) -> Result<Value, ProtocolError>;

    /// Release the channel. Must not fail.
    async fn shutdown(&mut self);
}

/// [`BrowserEngine`] backed by a remote Chrome DevTools endpoint.
#[derive(Debug, Clone)]
pub struct CdpEngine {
    endpoint: EndpointClient,
    command_timeout: Duration,
}

impl CdpEngine {
    pub fn new(endpoint: EngineEndpoint, command_timeout: Duration) -> Result<Self, ProtocolError> {
        Ok(Self {
            endpoint: EndpointClient::new(endpoint, command_timeout)?,
            command_timeout,
        })
    }

    pub fn endpoint(&self) -> &EngineEndpoint {
        self.endpoint.endpoint()
    }
}

#[async_trait]
impl BrowserEngine for CdpEngine {
    type Channel = CdpClient;

    async fn create_target(&self) -> Result<TargetInfo, ProtocolError> {
        self.endpoint.new_target().await
    }

    async fn connect(&self, target: &TargetInfo) -> Result<CdpClient, ProtocolError> {
        CdpClient::connect(&target.web_socket_debugger_url, self.command_timeout).await
    }

    async fn close_target(&self, target: &TargetInfo) -> Result<(), ProtocolError> {
        self.endpoint.close_target(&target.id).await
    }
}

#[async_trait]
impl TargetChannel for CdpClient {
    async fn call(&self, method: &str, params: Value) -> Result<Value, ProtocolError> {
        self.send_command(method, params).await
    }

    async fn wait_event(&mut self, method: &str) -> Result<Value, ProtocolError> {
        self.wait_for_event(method).await
    }

    async fn shutdown(&mut self) {
        self.close().await
    }
}
