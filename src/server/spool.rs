//! Spool directory for documents awaiting a render.
//!
//! Every document handed to the pipeline is wrapped in a [`SpoolFile`] that
//! deletes it when dropped, so the source goes away once the render that
//! needed it has finished, whatever the outcome.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum SpoolError {
    #[error("spool I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid document name {0:?}: must be a plain file name")]
    InvalidName(String),
    #[error("document {0:?} not found in spool")]
    NotFound(String),
}

/// Directory holding uploaded documents.
#[derive(Debug, Clone)]
pub struct Spool {
    dir: PathBuf,
}

impl Spool {
    /// Create the directory if needed and resolve it to an absolute path.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, SpoolError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        let dir = tokio::fs::canonicalize(dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an uploaded document under a fresh unique name.
    pub async fn store(
        &self,
        data: Vec<u8>,
        original_name: Option<&str>,
    ) -> Result<SpoolFile, SpoolError> {
        let dir = self.dir.clone();
        let suffix = format!(".{}", document_extension(original_name));
        let path = tokio::task::spawn_blocking(move || -> std::io::Result<PathBuf> {
            let mut file = tempfile::Builder::new()
                .prefix("printd-")
                .suffix(&suffix)
                .tempfile_in(&dir)?;
            file.write_all(&data)?;
            file.flush()?;
            let (_, path) = file.keep().map_err(|e| e.error)?;
            Ok(path)
        })
        .await
        .map_err(|e| std::io::Error::other(format!("spool writer failed: {e}")))??;

        tracing::debug!(path = %path.display(), "stored uploaded document");
        Ok(SpoolFile { path })
    }

    /// Claim a document already placed in the spool by name.
    pub fn claim(&self, name: &str) -> Result<SpoolFile, SpoolError> {
        if !is_plain_file_name(name) {
            return Err(SpoolError::InvalidName(name.to_string()));
        }
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(SpoolError::NotFound(name.to_string()));
        }
        Ok(SpoolFile { path })
    }
}

/// A spooled document, removed from disk on drop.
#[derive(Debug)]
pub struct SpoolFile {
    path: PathBuf,
}

impl SpoolFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `file://` URI the browser loads the document from.
    pub fn uri(&self) -> Result<String, SpoolError> {
        Url::from_file_path(&self.path)
            .map(|url| url.to_string())
            .map_err(|_| SpoolError::InvalidName(self.path.display().to_string()))
    }
}

impl Drop for SpoolFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed spooled document"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove spooled document")
            }
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

/// Extension to store an upload under; the browser sniffs file:// documents
/// by extension.
fn document_extension(original_name: Option<&str>) -> &str {
    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| matches!(ext.to_ascii_lowercase().as_str(), "html" | "htm" | "xhtml" | "svg"))
        .unwrap_or("html")
}
