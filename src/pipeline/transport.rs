//! HTTP transport: the only stage with network I/O.
//!
//! The orchestrator speaks to the analysis service through the [`Transport`]
//! trait so tests can swap in a recording stub. [`HttpTransport`] is the
//! reqwest-backed implementation.
//!
//! A transport reports exactly three things: a reply with a status (any
//! status, success or not), a request that went out but got no reply, or a
//! request that could not be built. Turning a reply into a result is the
//! orchestrator's job.

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// The service endpoints this crate calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `POST /analyze`
    Analyze,
    /// `POST /upload`
    Upload,
    /// `GET /test`
    Test,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Analyze => "analyze",
            Endpoint::Upload => "upload",
            Endpoint::Test => "test",
        }
    }
}

/// One multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        bytes: Vec<u8>,
        filename: String,
        mime_type: String,
    },
}

impl FormField {
    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// Request body, independent of any HTTP library.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No body; sent as `GET`.
    Empty,
    /// `multipart/form-data`; sent as `POST`.
    Multipart(Vec<FormField>),
    /// `application/json`; sent as `POST`.
    Json(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub endpoint: Endpoint,
    pub payload: Payload,
}

impl OutboundRequest {
    pub fn new(endpoint: Endpoint, payload: Payload) -> Self {
        Self { endpoint, payload }
    }
}

/// A response from the service, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub reason: Option<String>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON, if it is JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Read a string field from a JSON object body.
    pub fn string_field(&self, field: &str) -> Option<String> {
        self.json()?.get(field)?.as_str().map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request was sent but no response arrived (connection drop, timeout).
    #[error("no response: {0}")]
    NoResponse(String),
    /// The request could not be built or handed to the network.
    #[error("{0}")]
    Construction(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<Reply, TransportError>;
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        let mut base = Url::parse(&config.base_url)
            .map_err(|e| AnalyzerError::InvalidConfig(format!("base URL: {}", e)))?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = config.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| AnalyzerError::ClientBuild(e.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn url(&self, endpoint: Endpoint) -> Result<Url, TransportError> {
        self.base
            .join(endpoint.path())
            .map_err(|e| TransportError::Construction(format!("Invalid endpoint URL: {}", e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<Reply, TransportError> {
        let url = self.url(request.endpoint)?;
        debug!("→ {} ({})", url, payload_label(&request.payload));

        let builder = match request.payload {
            Payload::Empty => self.client.get(url),
            Payload::Json(body) => self.client.post(url).json(&body),
            Payload::Multipart(fields) => self.client.post(url).multipart(build_form(fields)?),
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        // An error status is already known once the head arrives; a lost body
        // only costs the detail.
        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(e) if !status.is_success() => {
                warn!("Body of {} reply could not be read: {}", status, e);
                Vec::new()
            }
            Err(e) => return Err(map_reqwest_error(e)),
        };
        debug!("← {} ({} bytes)", status, body.len());

        Ok(Reply {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}

fn build_form(fields: Vec<FormField>) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File {
                name,
                bytes,
                filename,
                mime_type,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(filename)
                    .mime_str(&mime_type)
                    .map_err(|e| {
                        TransportError::Construction(format!(
                            "Invalid content type '{}': {}",
                            mime_type, e
                        ))
                    })?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

fn payload_label(payload: &Payload) -> String {
    match payload {
        Payload::Empty => "no body".to_string(),
        Payload::Json(_) => "json".to_string(),
        Payload::Multipart(fields) => {
            let names: Vec<_> = fields.iter().map(FormField::name).collect();
            format!("multipart: {}", names.join(", "))
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        return TransportError::Construction(err.to_string());
    }
    if err.is_timeout() {
        warn!("Request timed out: {}", err);
    } else {
        warn!("Request got no response: {}", err);
    }
    TransportError::NoResponse(err.to_string())
}
