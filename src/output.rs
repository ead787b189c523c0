use crate::error::ErrorPayload;
use crate::viewport::{PaperSize, ViewportSpec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Schema version for output payloads.
pub const PRINTD_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PrintdOutput {
    Render(RenderOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub version: String,
    pub document_uri: String,
    pub output_path: PathBuf,
    pub paper: PaperSize,
    pub viewport: ViewportSpec,
    pub bytes: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCategory, RenderErrorKind};

    #[test]
    fn render_output_serializes() {
        let paper = PaperSize::default();
        let output = PrintdOutput::Render(RenderOutput {
            version: PRINTD_OUTPUT_VERSION.to_string(),
            document_uri: "file:///tmp/in.html".to_string(),
            output_path: PathBuf::from("out.pdf"),
            paper,
            viewport: paper.viewport(),
            bytes: 2048,
            elapsed_ms: 812,
        });

        let json = serde_json::to_string(&output).expect("serialize render output");
        assert!(json.contains("\"mode\":\"render\""));
        assert!(json.contains("\"documentUri\":\"file:///tmp/in.html\""));
        assert!(json.contains("\"bytes\":2048"));
        assert!(json.contains("\"deviceScaleFactor\":0.0"));
    }

    #[test]
    fn error_output_serializes_kind() {
        let output = PrintdOutput::Error(ErrorOutput {
            version: PRINTD_OUTPUT_VERSION.to_string(),
            message: Some("Document did not finish loading within 30s".to_string()),
            error: ErrorPayload::new(
                ErrorCategory::Render,
                "Document did not finish loading within 30s".to_string(),
                "Increase --nav-timeout",
            )
            .with_kind(RenderErrorKind::LoadTimeout),
        });

        let json = serde_json::to_string(&output).expect("serialize error output");
        assert!(json.contains("\"mode\":\"error\""));
        assert!(json.contains("\"kind\":\"loadTimeout\""));
        assert!(json.contains("\"category\":\"render\""));
    }
}
