//! Configuration types for image submission and report classification.
//!
//! All analyzer behaviour is controlled through [`AnalyzerConfig`], built via
//! its [`AnalyzerConfigBuilder`]. The transport strategy and the splitting
//! policy are chosen here once, at construction time, and never re-derived
//! per submission.

use crate::error::AnalyzerError;
use serde::{Deserialize, Serialize};

/// Default base URL of the analysis service (its development address).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default client-side cap on uploaded file size: 20 MiB.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

/// Configuration for an [`crate::Analyzer`].
///
/// # Example
/// ```rust
/// use site_inspect::{AnalyzerConfig, SplitPolicy, TransportStrategy};
///
/// let config = AnalyzerConfig::builder()
///     .base_url("https://inspect.example.net")
///     .strategy(TransportStrategy::JsonWithDataUri)
///     .split_policy(SplitPolicy::Lines)
///     .max_file_bytes(5 * 1024 * 1024)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_file_bytes, 5 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Base URL of the analysis service. `/analyze`, `/upload` and `/test`
    /// are resolved against it. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Largest file accepted for submission, in bytes. Default: 20 MiB.
    ///
    /// Enforced before any bytes leave the process; the service is not
    /// relied on to reject oversized uploads.
    pub max_file_bytes: u64,

    /// Wire encoding used for every submission. Default: [`TransportStrategy::MultipartForm`].
    pub strategy: TransportStrategy,

    /// How the result text is cut into units before classification.
    /// Default: [`SplitPolicy::Paragraphs`].
    pub split_policy: SplitPolicy,

    /// Whole-request timeout in milliseconds. Default: None (no timeout).
    ///
    /// Expiry is reported as [`crate::FailureKind::NoResponse`].
    pub request_timeout_ms: Option<u64>,

    /// TCP connect timeout in milliseconds. Default: None.
    pub connect_timeout_ms: Option<u64>,

    /// Leading text prompt in JSON envelopes. If None, uses
    /// [`crate::prompts::DEFAULT_ANALYSIS_PROMPT`].
    pub prompt: Option<String>,

    /// Optional system message prepended to JSON envelopes.
    pub system_prompt: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            strategy: TransportStrategy::default(),
            split_policy: SplitPolicy::default(),
            request_timeout_ms: None,
            connect_timeout_ms: None,
            prompt: None,
            system_prompt: None,
        }
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the constraints the builder enforces.
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            AnalyzerError::InvalidConfig(format!("base URL '{}' is invalid: {}", self.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AnalyzerError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.max_file_bytes == 0 {
            return Err(AnalyzerError::InvalidConfig(
                "Maximum file size must be ≥ 1 byte".into(),
            ));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(AnalyzerError::InvalidConfig(
                "Request timeout must be ≥ 1 ms".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn max_file_bytes(mut self, n: u64) -> Self {
        self.config.max_file_bytes = n;
        self
    }

    pub fn strategy(mut self, strategy: TransportStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn split_policy(mut self, policy: SplitPolicy) -> Self {
        self.config.split_policy = policy;
        self
    }

    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = Some(ms);
        self
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = Some(ms);
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How a submission is encoded on the wire.
///
/// | Strategy | Calls | Body |
/// |----------|-------|------|
/// | `MultipartForm` | `POST /analyze` | multipart `image_url` or `image` |
/// | `JsonWithDataUri` | `POST /analyze` | JSON `messages` envelope, file as data URI |
/// | `TwoPhaseUploadThenReference` | `POST /upload` then `POST /analyze` | multipart `file`, then JSON `{image_url, file_id}` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportStrategy {
    /// Multipart form posted straight to `/analyze`. (default)
    #[default]
    MultipartForm,
    /// JSON chat envelope; files are inlined as base64 data URIs.
    JsonWithDataUri,
    /// Files go to `/upload` first; `/analyze` receives the returned id.
    TwoPhaseUploadThenReference,
}

/// How the result text is cut into classification units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Split on blank lines (`"\n\n"`). (default)
    #[default]
    Paragraphs,
    /// Split on every line break (`"\n"`).
    Lines,
}

impl SplitPolicy {
    pub fn separator(self) -> &'static str {
        match self {
            SplitPolicy::Paragraphs => "\n\n",
            SplitPolicy::Lines => "\n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let c = AnalyzerConfig::builder().build().expect("defaults are valid");
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.strategy, TransportStrategy::MultipartForm);
        assert_eq!(c.split_policy, SplitPolicy::Paragraphs);
        assert!(c.request_timeout_ms.is_none());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = AnalyzerConfig::builder()
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"), "got: {err}");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = AnalyzerConfig::builder()
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_max_file_bytes() {
        assert!(AnalyzerConfig::builder().max_file_bytes(0).build().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(AnalyzerConfig::builder()
            .request_timeout_ms(0)
            .build()
            .is_err());
    }

    #[test]
    fn validate_catches_struct_literal() {
        let config = AnalyzerConfig {
            max_file_bytes: 0,
            ..AnalyzerConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(AnalyzerConfig::default().validate().is_ok());
    }

    #[test]
    fn strategy_serialises_snake_case() {
        let json = serde_json::to_string(&TransportStrategy::TwoPhaseUploadThenReference).unwrap();
        assert_eq!(json, "\"two_phase_upload_then_reference\"");
    }

    #[test]
    fn split_separator() {
        assert_eq!(SplitPolicy::Paragraphs.separator(), "\n\n");
        assert_eq!(SplitPolicy::Lines.separator(), "\n");
    }
}
