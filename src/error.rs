//! Error types for the site-inspect library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`AnalyzerError`] (**setup**): the analyzer cannot be built or an input
//!   file cannot be loaded (bad base URL, unreadable file). Returned as
//!   `Err(AnalyzerError)` before any submission exists.
//!
//! * [`Failure`] (**per-submission**): one submission ended without a
//!   result. It is never propagated as `Err` out of
//!   [`crate::Analyzer::submit`]; it travels inside
//!   [`crate::output::AnalysisOutcome::Failure`] so every submission resolves
//!   to a value.
//!
//! Every [`FailureKind`] is terminal for its submission. Nothing here is
//! retried automatically.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fixed message for a request that was sent but never answered.
pub const NO_RESPONSE_MESSAGE: &str =
    "No response received from the analysis service. The request was sent but the connection closed or timed out.";

/// Fatal errors raised while configuring the analyzer or loading inputs.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be initialised.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Image file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Image file exists but could not be read.
    #[error("Failed to read image file '{path}': {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The category of a failed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// Neither a URL nor a file was supplied.
    MissingInput,
    /// The file exceeds the configured size cap. Checked before any I/O.
    PayloadTooLarge { size: u64, max: u64 },
    /// The upload phase of a two-phase submission failed.
    UploadFailed,
    /// The service answered with a non-success status.
    RemoteError { status: u16, detail: Option<String> },
    /// The request went out but no response came back.
    NoResponse,
    /// The request could not be built or sent at all.
    RequestConstructionError,
    /// The service answered 2xx without the expected text field.
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MissingInput => write!(f, "missing input"),
            FailureKind::PayloadTooLarge { size, max } => {
                write!(f, "payload too large ({size} > {max} bytes)")
            }
            FailureKind::UploadFailed => write!(f, "upload failed"),
            FailureKind::RemoteError { status, .. } => write!(f, "remote error {status}"),
            FailureKind::NoResponse => write!(f, "no response"),
            FailureKind::RequestConstructionError => write!(f, "request construction error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

/// A terminal, human-readable failure for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing_input() -> Self {
        Self::new(
            FailureKind::MissingInput,
            "Please provide an image URL or upload a file.",
        )
    }

    pub fn payload_too_large(size: u64, max: u64) -> Self {
        Self::new(
            FailureKind::PayloadTooLarge { size, max },
            format!("Image is {size} bytes; the maximum allowed is {max} bytes."),
        )
    }

    /// Build a remote error from the status line and the optional `error`
    /// field of the response body.
    pub fn remote(status: u16, reason: Option<&str>, detail: Option<String>) -> Self {
        let status_line = match reason {
            Some(r) if !r.is_empty() => format!("{status} {r}"),
            _ => status.to_string(),
        };
        let message = match &detail {
            Some(d) => format!("Analysis service returned {status_line}: {d}"),
            None => format!("Analysis service returned {status_line}"),
        };
        Self::new(FailureKind::RemoteError { status, detail }, message)
    }

    pub fn no_response() -> Self {
        Self::new(FailureKind::NoResponse, NO_RESPONSE_MESSAGE)
    }

    pub fn construction(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::RequestConstructionError, detail)
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::MalformedResponse, detail)
    }

    /// Wrap any failure of the upload phase, keeping its cause in the message.
    pub fn upload_failed(cause: &Failure) -> Self {
        Self::new(
            FailureKind::UploadFailed,
            format!("Upload failed: {}", cause.message),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_message_carries_status_and_detail() {
        let f = Failure::remote(500, Some("Internal Server Error"), Some("model offline".into()));
        assert!(f.message.contains("500"), "got: {}", f.message);
        assert!(f.message.contains("Internal Server Error"));
        assert!(f.message.contains("model offline"));
        assert_eq!(
            f.kind,
            FailureKind::RemoteError {
                status: 500,
                detail: Some("model offline".into())
            }
        );
    }

    #[test]
    fn remote_message_without_detail() {
        let f = Failure::remote(404, None, None);
        assert_eq!(f.message, "Analysis service returned 404");
    }

    #[test]
    fn payload_too_large_display() {
        let f = Failure::payload_too_large(11, 10);
        assert!(f.to_string().contains("11 bytes"));
        assert_eq!(f.kind.to_string(), "payload too large (11 > 10 bytes)");
    }

    #[test]
    fn upload_failed_keeps_cause() {
        let cause = Failure::no_response();
        let f = Failure::upload_failed(&cause);
        assert_eq!(f.kind, FailureKind::UploadFailed);
        assert!(f.message.contains("No response received"));
    }

    #[test]
    fn file_not_found_display() {
        let e = AnalyzerError::FileNotFound {
            path: PathBuf::from("/tmp/none.jpg"),
        };
        assert!(e.to_string().contains("/tmp/none.jpg"));
    }
}
