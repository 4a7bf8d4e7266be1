//! Input resolution: turn the user's URL field and file field into exactly
//! one [`SubmissionInput`].
//!
//! A URL wins over a file when both are present. A blank URL field counts as
//! absent, so a form with an empty URL box and a chosen file submits the file.

use crate::error::{AnalyzerError, Failure};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An in-memory image file with the metadata the wire formats need.
#[derive(Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl std::fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBlob")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

impl FileBlob {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AnalyzerError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                AnalyzerError::FileReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_from_path(path).to_string();
        debug!(
            "Loaded {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            mime_type
        );

        Ok(Self {
            bytes,
            filename,
            mime_type,
        })
    }
}

/// What one submission sends: a URL, a file, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionInput {
    Url(String),
    File(FileBlob),
    None,
}

impl SubmissionInput {
    /// Pick the active input from the two form fields. URL first.
    pub fn resolve(url: Option<String>, file: Option<FileBlob>) -> Self {
        match (url.filter(|u| !u.trim().is_empty()), file) {
            (Some(url), _) => SubmissionInput::Url(url),
            (None, Some(file)) => SubmissionInput::File(file),
            (None, None) => SubmissionInput::None,
        }
    }

    /// Reject inputs that must never reach the network.
    ///
    /// `None` is always rejected; a file larger than `max_file_bytes` is
    /// rejected before any of its bytes are sent.
    pub fn validate(self, max_file_bytes: u64) -> Result<ValidatedInput, Failure> {
        match self {
            SubmissionInput::None => Err(Failure::missing_input()),
            SubmissionInput::File(blob) if blob.len() > max_file_bytes => {
                Err(Failure::payload_too_large(blob.len(), max_file_bytes))
            }
            SubmissionInput::File(blob) => Ok(ValidatedInput::File(blob)),
            SubmissionInput::Url(url) => Ok(ValidatedInput::Url(url)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionInput::Url(_) => "url",
            SubmissionInput::File(_) => "file",
            SubmissionInput::None => "none",
        }
    }
}

/// An input that passed [`SubmissionInput::validate`]. Encoders only accept
/// this, so nothing downstream has an empty case to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedInput {
    Url(String),
    File(FileBlob),
}

/// Resolve the CLI's `--url` and `--file` arguments, loading the file only
/// when it will actually be used.
pub async fn resolve_from_args(
    url: Option<String>,
    file: Option<PathBuf>,
) -> Result<SubmissionInput, AnalyzerError> {
    if url.as_deref().is_some_and(|u| !u.trim().is_empty()) {
        return Ok(SubmissionInput::resolve(url, None));
    }
    let blob = match file {
        Some(path) => Some(FileBlob::from_path(path).await?),
        None => None,
    };
    Ok(SubmissionInput::resolve(None, blob))
}

fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}
