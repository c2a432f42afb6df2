//! Reference document ingestion.
//!
//! Uploaded files are stored under a caller-chosen directory and their text
//! is extracted for use as supplementary context in a generation request.
//! Only plain-text formats are extracted; every other format is reported as
//! unsupported rather than failing.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Extensions read as UTF-8 text.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

/// Failure to store an uploaded file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("filename {0:?} has no usable final component")]
    InvalidFilename(String),

    #[error("failed to create upload directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a text extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Success,
    Unsupported,
    Failed,
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Unsupported => "unsupported",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Text extracted from a reference document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub text: String,
    pub page_count: u32,
    pub status: ExtractionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Extraction {
    fn unsupported(extension: &str) -> Self {
        Self {
            text: String::new(),
            page_count: 0,
            status: ExtractionStatus::Unsupported,
            error: Some(format!("text extraction is not supported for {extension:?} files")),
        }
    }

    fn failed(error: impl fmt::Display) -> Self {
        Self {
            text: String::new(),
            page_count: 0,
            status: ExtractionStatus::Failed,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExtractionStatus::Success
    }
}

/// Store `bytes` under `dir` using the final component of `filename`.
///
/// Directory parts in `filename` are discarded, so uploads cannot escape
/// `dir`. The directory is created if it does not exist.
pub async fn save_file(dir: &Path, bytes: &[u8], filename: &str) -> Result<PathBuf, IngestError> {
    let name = Path::new(filename)
        .file_name()
        .ok_or_else(|| IngestError::InvalidFilename(filename.to_string()))?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| IngestError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = dir.join(name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| IngestError::Write {
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), bytes = bytes.len(), "saved reference document");
    Ok(path)
}

/// Extract the text of the document at `path`.
///
/// Never returns an error: unsupported formats and I/O failures are
/// reported through [`Extraction::status`].
pub async fn extract_text(path: &Path) -> Extraction {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !TEXT_EXTENSIONS.contains(&extension.as_str()) {
        debug!(path = %path.display(), extension = %extension, "unsupported document format");
        return Extraction::unsupported(&extension);
    }

    match tokio::fs::read(path).await {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Extraction {
                text,
                page_count: 1,
                status: ExtractionStatus::Success,
                error: None,
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "document is not valid UTF-8");
                Extraction::failed(e)
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read document");
            Extraction::failed(e)
        }
    }
}

/// Join successful extractions into one supplementary context block.
///
/// Returns `None` when nothing was extracted.
pub fn combine_extractions<'a, I>(extractions: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Extraction>,
{
    let parts: Vec<&str> = extractions
        .into_iter()
        .filter(|e| e.is_success())
        .map(|e| e.text.trim())
        .filter(|t| !t.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}
