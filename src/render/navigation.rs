//! Navigation and load detection.

use std::time::Duration;

use serde_json::json;

use crate::cdp::{BrowserEngine, TargetChannel};
use crate::error::RenderError;

use super::session::{ProtocolSession, SessionState};

pub const LOAD_EVENT: &str = "Page.loadEventFired";

/// Navigate to `uri` and wait up to `bound` for the load event.
///
/// A load event that fires before the wait starts is still observed; the
/// channel queues events.
pub async fn navigate<E: BrowserEngine>(
    session: &mut ProtocolSession<E>,
    uri: &str,
    bound: Duration,
) -> Result<(), RenderError> {
    if session.state() != SessionState::Active {
        return Err(RenderError::navigation_failed(
            uri,
            format!("session not ready for navigation ({:?})", session.state()),
        ));
    }

    let channel = session
        .channel_mut()
        .map_err(|e| RenderError::navigation_failed(uri, e))?;

    let result = channel
        .call("Page.navigate", json!({ "url": uri }))
        .await
        .map_err(|e| RenderError::navigation_failed(uri, e))?;

    if let Some(error_text) = result
        .get("errorText")
        .and_then(|v| v.as_str())
        .filter(|text| !text.is_empty())
    {
        return Err(RenderError::navigation_failed(uri, error_text));
    }

    match tokio::time::timeout(bound, channel.wait_event(LOAD_EVENT)).await {
        Ok(Ok(_)) => {
            tracing::debug!(uri, "load event fired");
            Ok(())
        }
        Ok(Err(e)) => Err(RenderError::navigation_failed(uri, e)),
        Err(_) => Err(RenderError::LoadTimeout(bound)),
    }
}
