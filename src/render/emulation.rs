//! Viewport emulation, applied once between connecting and navigating.

use serde_json::{json, Value};

use crate::cdp::{BrowserEngine, ProtocolError, TargetChannel};
use crate::error::RenderError;
use crate::viewport::ViewportSpec;

use super::session::{ProtocolSession, SessionState};

pub fn device_metrics_params(spec: &ViewportSpec) -> Value {
    json!({
        "width": spec.width,
        "height": spec.height,
        "deviceScaleFactor": spec.device_scale_factor,
        "mobile": spec.mobile,
        "fitWindow": spec.fit_window,
    })
}

pub fn visible_size_params(spec: &ViewportSpec) -> Value {
    json!({
        "width": spec.width,
        "height": spec.height,
    })
}

/// Apply the device-metrics override, then the visible size, then the
/// optional user-agent override. Some engines only resize the surface on
/// `setVisibleSize`, so both emulation calls are issued.
pub async fn configure<E: BrowserEngine>(
    session: &mut ProtocolSession<E>,
    spec: &ViewportSpec,
    user_agent: Option<&str>,
) -> Result<(), RenderError> {
    if session.state() != SessionState::Connected {
        return Err(RenderError::EmulationRejected(ProtocolError::protocol(
            format!("viewport configured in state {:?}", session.state()),
        )));
    }

    let channel = session.channel().map_err(RenderError::EmulationRejected)?;
    channel
        .call(
            "Emulation.setDeviceMetricsOverride",
            device_metrics_params(spec),
        )
        .await
        .map_err(RenderError::EmulationRejected)?;
    channel
        .call("Emulation.setVisibleSize", visible_size_params(spec))
        .await
        .map_err(RenderError::EmulationRejected)?;

    if let Some(user_agent) = user_agent {
        channel
            .call(
                "Network.setUserAgentOverride",
                json!({ "userAgent": user_agent }),
            )
            .await
            .map_err(RenderError::EmulationRejected)?;
    }

    session.mark_active();
    tracing::debug!(width = spec.width, height = spec.height, "viewport configured");
    Ok(())
}
