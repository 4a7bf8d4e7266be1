//! Integration tests for the reqwest transport against a mock service.
//!
//! Each test starts a `wiremock` server standing in for the analysis
//! service and drives a real [`Analyzer`] at it, so the bytes on the wire
//! are the ones production sends.

use pretty_assertions::assert_eq;
use serde_json::json;
use site_inspect::{
    Analyzer, AnalyzerConfig, FailureKind, FileBlob, SplitPolicy, SubmissionInput,
    TransportStrategy,
};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn analyzer(server: &MockServer, strategy: TransportStrategy) -> Analyzer {
    let config = AnalyzerConfig::builder()
        .base_url(server.uri())
        .strategy(strategy)
        .max_file_bytes(1024)
        .build()
        .expect("valid config");
    Analyzer::new(config).expect("analyzer")
}

fn photo() -> SubmissionInput {
    SubmissionInput::File(FileBlob::new(b"JPEGDATA".to_vec(), "porch.jpg", "image/jpeg"))
}

fn site_url() -> SubmissionInput {
    SubmissionInput::Url("https://img.example/porch.jpg".into())
}

fn ok_result(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": text }))
}

// ── Multipart ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn multipart_url_sends_image_url_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"image_url\""))
        .and(body_string_contains("https://img.example/porch.jpg"))
        .respond_with(ok_result("Foundation intact."))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = analyzer(&server, TransportStrategy::MultipartForm)
        .submit(site_url())
        .await
        .value;
    assert_eq!(outcome.into_result().unwrap(), "Foundation intact.");
}

#[tokio::test]
async fn multipart_file_keeps_filename_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_string_contains("name=\"image\"; filename=\"porch.jpg\""))
        .and(body_string_contains("Content-Type: image/jpeg"))
        .and(body_string_contains("JPEGDATA"))
        .respond_with(ok_result("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = analyzer(&server, TransportStrategy::MultipartForm)
        .submit(photo())
        .await
        .value;
    assert!(outcome.is_success());
}

// ── JSON with data URI ───────────────────────────────────────────────────────

#[tokio::test]
async fn json_file_is_sent_as_data_uri() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(header_regex("content-type", "^application/json"))
        .and(body_partial_json(json!({
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text"},
                    {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,SlBFR0RBVEE="}}
                ]
            }]
        })))
        .respond_with(ok_result("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = analyzer(&server, TransportStrategy::JsonWithDataUri)
        .submit(photo())
        .await
        .value;
    assert!(outcome.is_success());
}

// ── Two-phase ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_phase_uploads_then_analyzes_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"file\"; filename=\"porch.jpg\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "file_id": "up-9" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(body_partial_json(json!({ "file_id": "up-9" })))
        .respond_with(ok_result("Materials: cedar."))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = analyzer(&server, TransportStrategy::TwoPhaseUploadThenReference)
        .submit(photo())
        .await
        .value;
    assert_eq!(outcome.into_result().unwrap(), "Materials: cedar.");
}

#[tokio::test]
async fn two_phase_upload_error_skips_analyze() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({ "error": "too big" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ok_result("unreachable"))
        .expect(0)
        .mount(&server)
        .await;

    let failure = analyzer(&server, TransportStrategy::TwoPhaseUploadThenReference)
        .submit(photo())
        .await
        .value
        .into_result()
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::UploadFailed);
    assert!(failure.message.contains("413"), "got: {}", failure.message);
    assert!(failure.message.contains("too big"));
}

// ── Failure normalization ────────────────────────────────────────────────────

#[tokio::test]
async fn remote_error_carries_status_and_error_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "No image provided" })),
        )
        .mount(&server)
        .await;

    let failure = analyzer(&server, TransportStrategy::MultipartForm)
        .submit(site_url())
        .await
        .value
        .into_result()
        .unwrap_err();
    assert_eq!(
        failure.kind,
        FailureKind::RemoteError {
            status: 400,
            detail: Some("No image provided".into())
        }
    );
    assert!(failure.message.contains("400 Bad Request"), "got: {}", failure.message);
}

#[tokio::test]
async fn timeout_maps_to_no_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ok_result("late").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = AnalyzerConfig::builder()
        .base_url(server.uri())
        .request_timeout_ms(50)
        .build()
        .unwrap();
    let failure = Analyzer::new(config)
        .unwrap()
        .submit(site_url())
        .await
        .value
        .into_result()
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::NoResponse);
}

#[tokio::test]
async fn refused_connection_maps_to_no_response() {
    // Bind then drop a listener to get a port nobody is serving.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let config = AnalyzerConfig::builder()
        .base_url(format!("http://{addr}"))
        .build()
        .unwrap();

    let failure = Analyzer::new(config)
        .unwrap()
        .submit(site_url())
        .await
        .value
        .into_result()
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::NoResponse);
}

#[tokio::test]
async fn success_without_result_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let failure = analyzer(&server, TransportStrategy::MultipartForm)
        .submit(site_url())
        .await
        .value
        .into_result()
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::MalformedResponse);
}

#[tokio::test]
async fn oversized_file_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_result("unreachable"))
        .expect(0)
        .mount(&server)
        .await;

    let big = SubmissionInput::File(FileBlob::new(vec![0u8; 2048], "big.jpg", "image/jpeg"));
    let failure = analyzer(&server, TransportStrategy::MultipartForm)
        .submit(big)
        .await
        .value
        .into_result()
        .unwrap_err();
    assert_eq!(
        failure.kind,
        FailureKind::PayloadTooLarge {
            size: 2048,
            max: 1024
        }
    );
}

// ── Full pipeline ────────────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_returns_sectioned_report() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ok_result(
            "The foundation shows hairline cracks.\n\nMaterials include brick and timber.\n\nOverall condition is fair.\n\nRailing height may not meet code.\n\nLandscaping is overgrown.",
        ))
        .mount(&server)
        .await;

    let config = AnalyzerConfig::builder()
        .base_url(server.uri())
        .split_policy(SplitPolicy::Paragraphs)
        .build()
        .unwrap();
    let report = Analyzer::new(config)
        .unwrap()
        .analyze(site_url())
        .await
        .value
        .unwrap();

    let titles: Vec<_> = report.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        [
            "Structural Components",
            "Materials",
            "Condition",
            "Code Compliance",
            "Other Observations"
        ]
    );
    assert_eq!(
        report.section("Code Compliance").unwrap().paragraphs,
        vec!["Railing height may not meet code."]
    );
}

#[tokio::test]
async fn probe_reads_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Backend is working" })),
        )
        .mount(&server)
        .await;

    let message = analyzer(&server, TransportStrategy::MultipartForm)
        .probe()
        .await
        .unwrap();
    assert_eq!(message, "Backend is working");
}

#[tokio::test]
async fn probe_server_error_is_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db down" })))
        .expect(1)
        .mount(&server)
        .await;

    let failure = analyzer(&server, TransportStrategy::MultipartForm)
        .probe()
        .await
        .unwrap_err();
    assert_eq!(
        failure.kind,
        FailureKind::RemoteError {
            status: 500,
            detail: Some("db down".into())
        }
    );
}

#[tokio::test]
async fn probe_without_message_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "msg": 1 })))
        .mount(&server)
        .await;

    let failure = analyzer(&server, TransportStrategy::MultipartForm)
        .probe()
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::MalformedResponse);
}
