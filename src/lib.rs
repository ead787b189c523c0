//! printd Library
//!
//! Converts HTML documents into PDF by driving a remote headless Chrome over
//! the DevTools protocol. Each render gets its own browser target, which is
//! always released, whether the render succeeds, fails or is cancelled.
//!
//! # Module Overview
//!
//! - [`render`] - the render pipeline and its steps
//! - [`cdp`] - DevTools endpoint/WebSocket client and the engine traits
//! - [`request`] - render requests and document URI resolution
//! - [`viewport`] - paper sizes and viewport emulation values
//! - [`config`] - configuration file and environment overrides
//! - [`server`] - the HTTP upload service
//! - [`output`] - JSON output schemas for the CLI
//!
//! # Example
//!
//! ```no_run
//! use printd_lib::cdp::{CdpEngine, EngineEndpoint};
//! use printd_lib::{Config, PipelineOptions, RenderPipeline, RenderRequest};
//!
//! # async fn example() -> printd_lib::Result<()> {
//! let config = Config::default();
//! let engine = CdpEngine::new(config.engine.endpoint(), config.timeouts.command)?;
//! let pipeline = RenderPipeline::new(engine, PipelineOptions::from(&config));
//!
//! let request = RenderRequest::builder("https://example.com")
//!     .width_inches(8.5)
//!     .height_inches(11.0)
//!     .settle_delay_ms(300)
//!     .build()?;
//! let pdf = pipeline.render(&request).await?;
//! assert!(pdf.starts_with(b"%PDF"));
//! # Ok(())
//! # }
//! ```

pub mod cdp;
pub mod config;
pub mod error;
pub mod output;
pub mod render;
pub mod request;
pub mod server;
pub mod viewport;

pub use config::{Config, ConfigError};
pub use error::{ErrorCategory, ErrorPayload, PrintError, RenderError, RenderErrorKind, Result};
pub use output::{ErrorOutput, PrintdOutput, RenderOutput, PRINTD_OUTPUT_VERSION};
pub use render::{
    PipelineOptions, ProtocolSession, RenderPipeline, SessionState, DEFAULT_NAVIGATION_TIMEOUT,
};
pub use request::{
    document_uri_for, RenderRequest, RenderRequestBuilder, DEFAULT_MAX_SETTLE_DELAY,
    DEFAULT_SETTLE_DELAY,
};
pub use viewport::{PaperSize, ViewportSpec};
