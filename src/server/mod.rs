//! HTTP upload service.
//!
//! `GET /` returns usage text, `POST /` takes a multipart form carrying an
//! HTML document (or the name of one already in the spool directory) and
//! answers with the rendered PDF.
//!
//! Uploaded documents are loaded by the browser through `file://` URLs, so
//! the spool directory must be visible to the engine at the same path.

mod handlers;
pub mod spool;

use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::cdp::BrowserEngine;
use crate::config::RenderDefaults;
use crate::error::PrintError;
use crate::render::RenderPipeline;

pub use spool::{Spool, SpoolError, SpoolFile};

/// Largest multipart body accepted on `POST /`.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared state behind every request.
pub struct AppState<E: BrowserEngine> {
    pipeline: RenderPipeline<E>,
    spool: Spool,
    defaults: RenderDefaults,
}

impl<E: BrowserEngine> AppState<E> {
    pub fn new(pipeline: RenderPipeline<E>, spool: Spool, defaults: RenderDefaults) -> Self {
        Self {
            pipeline,
            spool,
            defaults,
        }
    }

    pub fn pipeline(&self) -> &RenderPipeline<E> {
        &self.pipeline
    }

    pub fn spool(&self) -> &Spool {
        &self.spool
    }

    pub fn defaults(&self) -> &RenderDefaults {
        &self.defaults
    }
}

pub fn router<E: BrowserEngine>(state: Arc<AppState<E>>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::usage).post(handlers::print::<E>),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves.
pub async fn serve<E, S>(
    listener: TcpListener,
    state: Arc<AppState<E>>,
    shutdown: S,
) -> Result<(), PrintError>
where
    E: BrowserEngine,
    S: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, spool = %state.spool().dir().display(), "printd listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| PrintError::Server(e.to_string()))
}
