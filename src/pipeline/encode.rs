//! Payload encoding: [`ValidatedInput`] → multipart fields or JSON bodies.
//!
//! Three wire contracts share the same inputs:
//!
//! * multipart `image_url` / `image` for [`TransportStrategy::MultipartForm`]
//! * a chat-style `messages` envelope for [`TransportStrategy::JsonWithDataUri`],
//!   with files inlined as `data:<mime>;base64,<payload>`
//! * multipart `file` for the upload phase and a `{image_url, file_id}`
//!   reference body for the analyze phase of
//!   [`TransportStrategy::TwoPhaseUploadThenReference`]
//!
//! [`TransportStrategy::MultipartForm`]: crate::config::TransportStrategy::MultipartForm
//! [`TransportStrategy::JsonWithDataUri`]: crate::config::TransportStrategy::JsonWithDataUri
//! [`TransportStrategy::TwoPhaseUploadThenReference`]: crate::config::TransportStrategy::TwoPhaseUploadThenReference

use crate::error::Failure;
use crate::pipeline::input::{FileBlob, ValidatedInput};
use crate::pipeline::transport::FormField;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::debug;

/// Multipart field name for a URL submission.
pub const FIELD_IMAGE_URL: &str = "image_url";
/// Multipart field name for a file submission.
pub const FIELD_IMAGE: &str = "image";
/// Multipart field name for the upload phase.
pub const FIELD_UPLOAD_FILE: &str = "file";

/// Wrap raw bytes as a base64 data URI.
pub fn data_uri(blob: &FileBlob) -> String {
    let b64 = STANDARD.encode(&blob.bytes);
    debug!("Encoded {} → {} bytes base64", blob.filename, b64.len());
    format!("data:{};base64,{}", blob.mime_type, b64)
}

/// Encode a file as a data URI off the async executor.
///
/// The whole file is transcoded before this returns; the analyze call is
/// never started on a partial payload.
pub async fn data_uri_blocking(blob: FileBlob) -> Result<String, Failure> {
    tokio::task::spawn_blocking(move || data_uri(&blob))
        .await
        .map_err(|e| Failure::construction(format!("Failed to encode image: {}", e)))
}

/// Fields for a single-call multipart submission.
///
/// Exactly one field: `image_url` for a URL, `image` for a file.
pub fn analyze_form(input: ValidatedInput) -> Vec<FormField> {
    match input {
        ValidatedInput::Url(url) => vec![FormField::Text {
            name: FIELD_IMAGE_URL.into(),
            value: url,
        }],
        ValidatedInput::File(blob) => vec![file_field(FIELD_IMAGE, blob)],
    }
}

/// Fields for the upload phase: one `file` field.
pub fn upload_form(blob: FileBlob) -> Vec<FormField> {
    vec![file_field(FIELD_UPLOAD_FILE, blob)]
}

fn file_field(name: &str, blob: FileBlob) -> FormField {
    FormField::File {
        name: name.into(),
        bytes: blob.bytes,
        filename: blob.filename,
        mime_type: blob.mime_type,
    }
}

// ── JSON envelopes ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatEnvelope<'a> {
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum ChatMessage<'a> {
    System { content: &'a str },
    User { content: Vec<ContentPart<'a>> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageRef<'a> },
}

#[derive(Debug, Serialize)]
struct ImageRef<'a> {
    url: &'a str,
}

/// Build the `JsonWithDataUri` body.
///
/// The last message is always the user turn: the prompt text first, the
/// image reference (URL or data URI) second. A system message is prepended
/// only when one is configured.
pub fn chat_envelope(
    image_ref: &str,
    prompt: &str,
    system: Option<&str>,
) -> Result<serde_json::Value, Failure> {
    let mut messages = Vec::with_capacity(2);
    if let Some(content) = system {
        messages.push(ChatMessage::System { content });
    }
    messages.push(ChatMessage::User {
        content: vec![
            ContentPart::Text { text: prompt },
            ContentPart::ImageUrl {
                image_url: ImageRef { url: image_ref },
            },
        ],
    });
    to_json(&ChatEnvelope { messages })
}

#[derive(Debug, Serialize)]
struct ReferenceBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_id: Option<&'a str>,
}

/// Build the analyze-phase body of a two-phase submission.
pub fn reference_body(
    image_url: Option<&str>,
    file_id: Option<&str>,
) -> Result<serde_json::Value, Failure> {
    to_json(&ReferenceBody { image_url, file_id })
}

fn to_json<T: Serialize>(body: &T) -> Result<serde_json::Value, Failure> {
    serde_json::to_value(body)
        .map_err(|e| Failure::construction(format!("Failed to serialise request body: {}", e)))
}
