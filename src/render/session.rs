//! One remote target plus its control channel, with guaranteed teardown.

use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::json;

use crate::cdp::{BrowserEngine, ProtocolError, TargetChannel, TargetInfo};
use crate::error::RenderError;

/// Domains enabled on every session. Load detection depends on `Page`.
const ENABLE_COMMANDS: [&str; 3] = ["Page.enable", "DOM.enable", "Network.enable"];

/// Lifecycle of a [`ProtocolSession`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    /// The engine allocated a target.
    Created,
    /// Channel open and event domains enabled.
    Connected,
    /// Viewport emulation applied.
    Active,
    Closed,
}

/// Exclusive owner of one target for the duration of one render.
pub struct ProtocolSession<E: BrowserEngine> {
    engine: Arc<E>,
    state: SessionState,
    target: Option<TargetInfo>,
    channel: Option<E::Channel>,
}

impl<E: BrowserEngine> ProtocolSession<E> {
    /// A session that has not contacted the engine yet.
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            state: SessionState::Unopened,
            target: None,
            channel: None,
        }
    }

    /// Create a target, connect to it and enable the event domains.
    ///
    /// If the target was created but the channel could not be set up, the
    /// target is released before the error is returned.
    pub async fn open(engine: Arc<E>) -> Result<Self, RenderError> {
        let mut session = Self::new(engine);

        let target = session
            .engine
            .create_target()
            .await
            .map_err(RenderError::EngineUnreachable)?;
        tracing::debug!(target_id = %target.id, "target created");
        session.target = Some(target.clone());
        session.state = SessionState::Created;

        if let Err(e) = session.connect(&target).await {
            session.close().await;
            return Err(RenderError::EngineUnreachable(e));
        }
        Ok(session)
    }

    async fn connect(&mut self, target: &TargetInfo) -> Result<(), ProtocolError> {
        let channel: &E::Channel = self.channel.insert(self.engine.connect(target).await?);
        try_join_all(
            ENABLE_COMMANDS
                .iter()
                .map(|method| channel.call(method, json!({}))),
        )
        .await?;
        self.state = SessionState::Connected;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.id.as_str())
    }

    pub(crate) fn channel(&self) -> Result<&E::Channel, ProtocolError> {
        self.channel.as_ref().ok_or(ProtocolError::Closed)
    }

    pub(crate) fn channel_mut(&mut self) -> Result<&mut E::Channel, ProtocolError> {
        self.channel.as_mut().ok_or(ProtocolError::Closed)
    }

    pub(crate) fn mark_active(&mut self) {
        if self.state == SessionState::Connected {
            self.state = SessionState::Active;
        }
    }

    /// Release the channel and the target. Never fails; later calls are no-ops.
    ///
    /// The session only becomes `Closed` once the target is released, so a
    /// close interrupted by dropping its future still leaves the release to
    /// `Drop`.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Some(channel) = self.channel.as_mut() {
            channel.shutdown().await;
        }
        self.channel = None;

        if let Some(target) = self.target.clone() {
            match self.engine.close_target(&target).await {
                Ok(()) => tracing::debug!(target_id = %target.id, "target closed"),
                Err(e) => tracing::warn!(target_id = %target.id, error = %e, "failed to close target"),
            }
        }
        self.target = None;
        self.state = SessionState::Closed;
    }
}

impl<E: BrowserEngine> Drop for ProtocolSession<E> {
    fn drop(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        let Some(target) = self.target.take() else {
            return;
        };
        let channel = self.channel.take();
        let engine = Arc::clone(&self.engine);

        // Dropped mid-render (e.g. the caller's future was dropped): release
        // the target in the background.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Some(mut channel) = channel {
                        channel.shutdown().await;
                    }
                    if let Err(e) = engine.close_target(&target).await {
                        tracing::warn!(target_id = %target.id, error = %e, "failed to close abandoned target");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(target_id = %target.id, "session dropped outside a runtime; target leaked");
            }
        }
    }
}
