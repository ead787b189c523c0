//! Chrome DevTools protocol plumbing.
//!
//! # Module Structure
//!
//! - [`endpoint`] - HTTP target creation/disposal (`/json/new`, `/json/close`)
//! - [`client`] - WebSocket command/response correlation and event queue
//! - [`engine`] - `BrowserEngine`/`TargetChannel` traits and the CDP implementation
//! - [`error`] - transport errors

pub mod client;
pub mod endpoint;
pub mod engine;
pub mod error;

pub use client::{CdpClient, CdpEvent, DEFAULT_COMMAND_TIMEOUT};
pub use endpoint::{EndpointClient, EngineEndpoint, TargetInfo};
pub use engine::{BrowserEngine, CdpEngine, TargetChannel};
pub use error::ProtocolError;
