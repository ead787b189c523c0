//! HTML-to-PDF rendering over a browser engine.
//!
//! # Module Structure
//!
//! - [`session`] - target lifecycle (`Unopened -> Created -> Connected -> Active -> Closed`)
//! - [`emulation`] - device metrics, visible size and user agent overrides
//! - [`navigation`] - `Page.navigate` plus a bounded wait for the load event
//! - [`settle`] - fixed post-load delay
//! - [`capture`] - `Page.printToPDF` and payload decoding
//! - [`pipeline`] - sequencing, admission control, cancellation and cleanup
//!
//! # Example
//!
//! ```no_run
//! use printd_lib::cdp::{CdpEngine, EngineEndpoint, DEFAULT_COMMAND_TIMEOUT};
//! use printd_lib::{PipelineOptions, RenderPipeline, RenderRequest};
//!
//! # async fn example() -> printd_lib::Result<()> {
//! let engine = CdpEngine::new(EngineEndpoint::default(), DEFAULT_COMMAND_TIMEOUT)?;
//! let pipeline = RenderPipeline::new(engine, PipelineOptions::default());
//! let request = RenderRequest::builder("file:///printfiles/invoice.html").build()?;
//! let pdf = pipeline.render(&request).await?;
//! std::fs::write("invoice.pdf", pdf)?;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod emulation;
pub mod navigation;
pub mod pipeline;
pub mod session;
pub mod settle;

pub use pipeline::{PipelineOptions, RenderPipeline, DEFAULT_NAVIGATION_TIMEOUT};
pub use session::{ProtocolSession, SessionState};
