//! Submission orchestration: one input in, one normalized outcome out.
//!
//! ```text
//! SubmissionInput
//!  │
//!  ├─ 1. Validate  None → MissingInput, oversized file → PayloadTooLarge (no I/O)
//!  ├─ 2. Encode    per TransportStrategy (data URI encode is its own await)
//!  ├─ 3. Upload    two-phase only; failure → UploadFailed, analyze never sent
//!  ├─ 4. Analyze   POST /analyze
//!  └─ 5. Extract   `result` string → Success, anything else → Failure
//! ```
//!
//! Steps run strictly in order within a submission. Each call to
//! [`Analyzer::submit`] owns its own future and its own outcome, so
//! overlapping submissions cannot clobber each other; the [`SubmissionId`]
//! on every outcome lets a caller keep only the newest.

use crate::config::{AnalyzerConfig, TransportStrategy};
use crate::error::{AnalyzerError, Failure};
use crate::output::{AnalysisOutcome, Report, Submission, SubmissionId};
use crate::pipeline::classify::ReportClassifier;
use crate::pipeline::encode;
use crate::pipeline::input::{FileBlob, SubmissionInput, ValidatedInput};
use crate::pipeline::transport::{
    Endpoint, HttpTransport, OutboundRequest, Payload, Reply, Transport, TransportError,
};
use crate::prompts::DEFAULT_ANALYSIS_PROMPT;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Field carrying the analysis text in a successful `/analyze` reply.
pub const RESULT_FIELD: &str = "result";
/// Field carrying the service's error description in a failed reply.
pub const ERROR_FIELD: &str = "error";
/// Field carrying the uploaded file's id in an `/upload` reply.
pub const FILE_ID_FIELD: &str = "file_id";
/// Field carrying the probe text in a `/test` reply.
pub const MESSAGE_FIELD: &str = "message";

/// Submits images to the analysis service and classifies the results.
pub struct Analyzer {
    config: AnalyzerConfig,
    transport: Arc<dyn Transport>,
    classifier: ReportClassifier,
    last_id: AtomicU64,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("transport", &"<dyn Transport>")
            .field("classifier", &self.classifier)
            .field("last_id", &self.last_id)
            .finish()
    }
}

impl Analyzer {
    /// Build an analyzer that talks HTTP to `config.base_url`.
    ///
    /// The config is validated again here, so one assembled as a struct
    /// literal gets the same checks as one from the builder.
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalyzerError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build an analyzer over any transport.
    pub fn with_transport(config: AnalyzerConfig, transport: Arc<dyn Transport>) -> Self {
        let classifier = ReportClassifier::new(config.split_policy);
        Self {
            config,
            transport,
            classifier,
            last_id: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn classifier(&self) -> &ReportClassifier {
        &self.classifier
    }

    /// True if no submission has started since `id`.
    pub fn is_latest(&self, id: SubmissionId) -> bool {
        self.last_id.load(Ordering::SeqCst) == id.0
    }

    fn next_id(&self) -> SubmissionId {
        SubmissionId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Submit one input using the configured strategy.
    pub async fn submit(&self, input: SubmissionInput) -> Submission<AnalysisOutcome> {
        self.submit_with(input, self.config.strategy).await
    }

    /// Submit one input using an explicit strategy.
    ///
    /// Always resolves to an outcome; no failure escapes as a panic or `Err`.
    pub async fn submit_with(
        &self,
        input: SubmissionInput,
        strategy: TransportStrategy,
    ) -> Submission<AnalysisOutcome> {
        let id = self.next_id();
        let start = Instant::now();
        info!("Submission {}: {} input via {:?}", id, input.kind(), strategy);

        let outcome: AnalysisOutcome = self.run(input, strategy).await.into();

        match &outcome {
            AnalysisOutcome::Success { raw_text } => info!(
                "Submission {}: {} chars in {}ms",
                id,
                raw_text.len(),
                start.elapsed().as_millis()
            ),
            AnalysisOutcome::Failure(f) => warn!("Submission {}: {}: {}", id, f.kind, f.message),
        }

        Submission { id, value: outcome }
    }

    /// Submit and, on success, classify the result text.
    pub async fn analyze(&self, input: SubmissionInput) -> Submission<Result<Report, Failure>> {
        self.submit(input)
            .await
            .map(|outcome| outcome.into_result().map(|raw| self.classifier.classify(&raw)))
    }

    /// Connectivity probe: `GET /test`, returning the service's message.
    pub async fn probe(&self) -> Result<String, Failure> {
        let reply = self
            .send(OutboundRequest::new(Endpoint::Test, Payload::Empty))
            .await?;
        extract_field(&reply, MESSAGE_FIELD)
    }

    async fn run(&self, input: SubmissionInput, strategy: TransportStrategy) -> Result<String, Failure> {
        let input = input.validate(self.config.max_file_bytes)?;

        let request = match strategy {
            TransportStrategy::MultipartForm => OutboundRequest::new(
                Endpoint::Analyze,
                Payload::Multipart(encode::analyze_form(input)),
            ),
            TransportStrategy::JsonWithDataUri => {
                let image_ref = match input {
                    ValidatedInput::Url(url) => url,
                    ValidatedInput::File(blob) => encode::data_uri_blocking(blob).await?,
                };
                let prompt = self.config.prompt.as_deref().unwrap_or(DEFAULT_ANALYSIS_PROMPT);
                let body = encode::chat_envelope(
                    &image_ref,
                    prompt,
                    self.config.system_prompt.as_deref(),
                )?;
                OutboundRequest::new(Endpoint::Analyze, Payload::Json(body))
            }
            TransportStrategy::TwoPhaseUploadThenReference => {
                let body = match input {
                    ValidatedInput::Url(url) => encode::reference_body(Some(&url), None)?,
                    ValidatedInput::File(blob) => {
                        let file_id = self.upload(blob).await?;
                        encode::reference_body(None, Some(&file_id))?
                    }
                };
                OutboundRequest::new(Endpoint::Analyze, Payload::Json(body))
            }
        };

        let reply = self.send(request).await?;
        extract_field(&reply, RESULT_FIELD)
    }

    /// Upload phase of a two-phase submission. Any failure becomes `UploadFailed`.
    async fn upload(&self, blob: FileBlob) -> Result<String, Failure> {
        debug!("Uploading {} ({} bytes)", blob.filename, blob.len());
        let request =
            OutboundRequest::new(Endpoint::Upload, Payload::Multipart(encode::upload_form(blob)));

        let file_id = self
            .send(request)
            .await
            .and_then(|reply| extract_field(&reply, FILE_ID_FIELD))
            .map_err(|cause| Failure::upload_failed(&cause))?;
        debug!("Uploaded as {}", file_id);
        Ok(file_id)
    }

    /// Send a request and turn transport errors and error statuses into failures.
    async fn send(&self, request: OutboundRequest) -> Result<Reply, Failure> {
        let reply = self.transport.send(request).await.map_err(|e| match e {
            TransportError::NoResponse(_) => Failure::no_response(),
            TransportError::Construction(detail) => Failure::construction(detail),
        })?;

        if !reply.is_success() {
            let detail = reply.string_field(ERROR_FIELD);
            return Err(Failure::remote(reply.status, reply.reason.as_deref(), detail));
        }
        Ok(reply)
    }
}

/// Pull a required string field out of a successful reply.
fn extract_field(reply: &Reply, field: &str) -> Result<String, Failure> {
    let json = reply.json().ok_or_else(|| {
        Failure::malformed(format!("Analysis service reply is not JSON (status {})", reply.status))
    })?;
    match json.get(field) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(Failure::malformed(format!(
            "Field '{}' in service reply is not a string: {}",
            field, other
        ))),
        None => Err(Failure::malformed(format!(
            "Service reply has no '{}' field",
            field
        ))),
    }
}
