//! The render pipeline: open, configure, navigate, settle, capture, close.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::cdp::BrowserEngine;
use crate::config::Config;
use crate::error::RenderError;
use crate::request::RenderRequest;

use super::session::ProtocolSession;
use super::{capture, emulation, navigation, settle};

/// Default bound on the load-event wait.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub navigation_timeout: Duration,
    /// Renders allowed in flight at once; `0` is treated as `1`.
    pub max_concurrent_renders: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            max_concurrent_renders: 4,
        }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            navigation_timeout: config.timeouts.navigation,
            max_concurrent_renders: config.max_concurrent_renders,
        }
    }
}

/// Renders documents to PDF, one fresh session per call.
pub struct RenderPipeline<E: BrowserEngine> {
    engine: Arc<E>,
    options: PipelineOptions,
    permits: Arc<Semaphore>,
}

impl<E: BrowserEngine> RenderPipeline<E> {
    pub fn new(engine: E, options: PipelineOptions) -> Self {
        let permits = options.max_concurrent_renders.max(1);
        Self {
            engine: Arc::new(engine),
            options,
            permits: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Render `request` to PDF bytes.
    pub async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        self.render_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Render with cooperative cancellation. Cancelling skips the remaining
    /// steps; the session is still closed.
    pub async fn render_with_cancel(
        &self,
        request: &RenderRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, RenderError> {
        let _permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RenderError::Cancelled),
            permit = self.permits.acquire() => permit.map_err(|_| RenderError::Cancelled)?,
        };

        let start = Instant::now();
        let uri = request.document_uri();
        tracing::debug!(uri, paper = %request.paper(), "render started");

        let mut session = step(cancel, ProtocolSession::open(Arc::clone(&self.engine))).await?;
        let outcome = self.drive(&mut session, request, cancel).await;
        session.close().await;

        match &outcome {
            Ok(bytes) => tracing::info!(
                uri,
                bytes = bytes.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "render finished"
            ),
            Err(e) => tracing::warn!(
                uri,
                kind = ?e.kind(),
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "render failed"
            ),
        }
        outcome
    }

    async fn drive(
        &self,
        session: &mut ProtocolSession<E>,
        request: &RenderRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, RenderError> {
        let paper = request.paper();
        let viewport = paper.viewport();

        step(
            cancel,
            emulation::configure(session, &viewport, request.user_agent()),
        )
        .await?;
        step(
            cancel,
            navigation::navigate(
                session,
                request.document_uri(),
                self.options.navigation_timeout,
            ),
        )
        .await?;
        settle::settle(request.settle_delay()).await;
        step(cancel, capture::capture(session, &paper)).await
    }
}

/// Run one step unless `cancel` fires first.
async fn step<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, RenderError>
where
    F: Future<Output = Result<T, RenderError>>,
{
    if cancel.is_cancelled() {
        return Err(RenderError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RenderError::Cancelled),
        result = fut => result,
    }
}
