//! Render requests and document URI resolution.

use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::error::RenderError;
use crate::viewport::PaperSize;

/// Default post-load grace period.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

/// Longest settle delay accepted unless the builder is given another limit.
/// The delay holds a render slot and cannot be interrupted.
pub const DEFAULT_MAX_SETTLE_DELAY: Duration = Duration::from_secs(60);

/// Immutable description of one render. Build it with [`RenderRequest::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    document_uri: String,
    paper: PaperSize,
    settle_delay: Duration,
    user_agent: Option<String>,
    full_page: bool,
}

impl RenderRequest {
    pub fn builder(document_uri: impl Into<String>) -> RenderRequestBuilder {
        RenderRequestBuilder {
            document_uri: document_uri.into(),
            paper: PaperSize::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_settle_delay: DEFAULT_MAX_SETTLE_DELAY,
            user_agent: None,
            full_page: false,
        }
    }

    pub fn document_uri(&self) -> &str {
        &self.document_uri
    }

    pub fn paper(&self) -> PaperSize {
        self.paper
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Reserved for multi-page capture; capture always prints page 1.
    pub fn full_page(&self) -> bool {
        self.full_page
    }
}

#[derive(Debug, Clone)]
pub struct RenderRequestBuilder {
    document_uri: String,
    paper: PaperSize,
    settle_delay: Duration,
    max_settle_delay: Duration,
    user_agent: Option<String>,
    full_page: bool,
}

impl RenderRequestBuilder {
    pub fn paper(mut self, paper: PaperSize) -> Self {
        self.paper = paper;
        self
    }

    pub fn width_inches(mut self, width: f64) -> Self {
        self.paper.width_inches = width;
        self
    }

    pub fn height_inches(mut self, height: f64) -> Self {
        self.paper.height_inches = height;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn settle_delay_ms(self, delay_ms: u64) -> Self {
        self.settle_delay(Duration::from_millis(delay_ms))
    }

    /// Upper bound checked by [`build`](Self::build).
    pub fn max_settle_delay(mut self, limit: Duration) -> Self {
        self.max_settle_delay = limit;
        self
    }

    pub fn user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent.filter(|ua| !ua.trim().is_empty());
        self
    }

    pub fn full_page(mut self, full_page: bool) -> Self {
        self.full_page = full_page;
        self
    }

    /// Validate and freeze the request.
    pub fn build(self) -> Result<RenderRequest, RenderError> {
        let uri = self.document_uri.trim();
        if uri.is_empty() {
            return Err(RenderError::invalid_request("document URI is required"));
        }
        Url::parse(uri).map_err(|e| {
            RenderError::invalid_request(format!("document URI '{uri}' is not absolute: {e}"))
        })?;

        let PaperSize {
            width_inches,
            height_inches,
        } = self.paper;
        if !(width_inches.is_finite() && width_inches > 0.0) {
            return Err(RenderError::invalid_request(format!(
                "width must be positive, got {width_inches}"
            )));
        }
        if !(height_inches.is_finite() && height_inches > 0.0) {
            return Err(RenderError::invalid_request(format!(
                "height must be positive, got {height_inches}"
            )));
        }

        if self.settle_delay > self.max_settle_delay {
            return Err(RenderError::invalid_request(format!(
                "delay {}ms exceeds the {}ms limit",
                self.settle_delay.as_millis(),
                self.max_settle_delay.as_millis()
            )));
        }

        Ok(RenderRequest {
            document_uri: uri.to_string(),
            paper: self.paper,
            settle_delay: self.settle_delay,
            user_agent: self.user_agent,
            full_page: self.full_page,
        })
    }
}

/// Turn a CLI-style input into a document URI: URLs pass through, local paths
/// become absolute `file://` URLs.
pub fn document_uri_for(input: &str) -> crate::Result<String> {
    let trimmed = input.trim();
    if let Ok(url) = Url::parse(trimmed) {
        // Single-letter schemes are Windows drive letters, not URLs.
        if url.scheme().len() > 1 {
            return Ok(url.to_string());
        }
    }

    let path = Path::new(trimmed);
    if !path.exists() {
        return Err(crate::PrintError::config(format!(
            "Local file not found: {trimmed}. Hint: check the path relative to the current working directory or use an absolute path."
        )));
    }
    let absolute = std::fs::canonicalize(path)?;
    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .map_err(|_| {
            crate::PrintError::config(format!(
                "Cannot express {} as a file URL",
                absolute.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderErrorKind;

    #[test]
    fn defaults_match_letter_and_300ms() {
        let req = RenderRequest::builder("file:///printfiles/a.html")
            .build()
            .unwrap();
        assert_eq!(req.paper(), PaperSize::default());
        assert_eq!(req.settle_delay(), Duration::from_millis(300));
        assert!(req.user_agent().is_none());
        assert!(!req.full_page());
    }

    #[test]
    fn rejects_relative_uri() {
        let err = RenderRequest::builder("a.html").build().unwrap_err();
        assert_eq!(err.kind(), RenderErrorKind::InvalidRequest);
    }

    #[test]
    fn rejects_empty_uri() {
        let err = RenderRequest::builder("  ").build().unwrap_err();
        assert_eq!(err.kind(), RenderErrorKind::InvalidRequest);
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let zero_width = RenderRequest::builder("http://localhost/a.html")
            .width_inches(0.0)
            .build();
        assert!(zero_width.is_err());

        let nan_height = RenderRequest::builder("http://localhost/a.html")
            .height_inches(f64::NAN)
            .build();
        assert!(nan_height.is_err());
    }

    #[test]
    fn settle_delay_above_limit_is_rejected() {
        let err = RenderRequest::builder("http://localhost/a.html")
            .settle_delay_ms(u64::MAX / 4)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), RenderErrorKind::InvalidRequest);
        assert!(err.to_string().contains("limit"));

        let at_limit = RenderRequest::builder("http://localhost/a.html")
            .max_settle_delay(Duration::from_secs(2))
            .settle_delay_ms(2_000)
            .build();
        assert!(at_limit.is_ok());

        let over_custom = RenderRequest::builder("http://localhost/a.html")
            .max_settle_delay(Duration::from_secs(2))
            .settle_delay_ms(2_001)
            .build();
        assert!(over_custom.is_err());
    }

    #[test]
    fn blank_user_agent_is_dropped() {
        let req = RenderRequest::builder("http://localhost/a.html")
            .user_agent(Some("   ".to_string()))
            .build()
            .unwrap();
        assert!(req.user_agent().is_none());
    }

    #[test]
    fn urls_pass_through_unchanged() {
        let uri = document_uri_for("https://example.com/invoice.html").unwrap();
        assert_eq!(uri, "https://example.com/invoice.html");
    }

    #[test]
    fn local_files_become_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.html");
        std::fs::write(&path, "<p>hi</p>").unwrap();

        let uri = document_uri_for(path.to_str().unwrap()).unwrap();
        assert!(uri.starts_with("file:///"), "got {uri}");
        assert!(uri.ends_with("/doc.html"), "got {uri}");
    }

    #[test]
    fn missing_local_file_is_a_config_error() {
        let err = document_uri_for("/definitely/not/here.html").unwrap_err();
        assert!(err.to_string().contains("Local file not found"));
    }
}
