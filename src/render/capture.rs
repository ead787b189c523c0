//! Print-to-PDF capture.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::cdp::{BrowserEngine, TargetChannel};
use crate::error::RenderError;
use crate::viewport::PaperSize;

use super::session::ProtocolSession;

/// Only the first page is ever captured.
pub const PAGE_RANGES: &str = "1-1";

/// `Page.printToPDF` parameters. Paper dimensions are in inches.
pub fn print_params(paper: &PaperSize) -> Value {
    json!({
        "paperWidth": paper.width_inches,
        "paperHeight": paper.height_inches,
        "scale": 1,
        "displayHeaderFooter": false,
        "printBackground": true,
        "marginTop": 0,
        "marginBottom": 0,
        "marginLeft": 0,
        "marginRight": 0,
        "pageRanges": PAGE_RANGES,
    })
}

/// Decode the base64 `data` field of a `printToPDF` result.
pub fn decode_payload(result: &Value) -> Result<Vec<u8>, RenderError> {
    let data = result
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| RenderError::capture_failed("printToPDF result has no data field"))?;

    let bytes = STANDARD
        .decode(data)
        .map_err(|e| RenderError::capture_failed(format!("invalid base64 payload: {e}")))?;

    if bytes.is_empty() {
        return Err(RenderError::capture_failed("engine returned an empty document"));
    }
    Ok(bytes)
}

pub async fn capture<E: BrowserEngine>(
    session: &ProtocolSession<E>,
    paper: &PaperSize,
) -> Result<Vec<u8>, RenderError> {
    let channel = session.channel().map_err(RenderError::capture_failed)?;
    let result = channel
        .call("Page.printToPDF", print_params(paper))
        .await
        .map_err(RenderError::capture_failed)?;
    let bytes = decode_payload(&result)?;
    tracing::debug!(bytes = bytes.len(), "captured PDF");
    Ok(bytes)
}
