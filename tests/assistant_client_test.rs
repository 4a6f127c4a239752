//! Assistant service client tests
//!
//! Runs `AssistantClient` against a `wiremock` server to check the request
//! shape of each endpoint and how service failures are turned into messages.

mod common;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sonia::client::{Assistant, PdfUpload};
use sonia::error::{handle_api_error, SoniaError};

// ---------------------------------------------------------------------------
// POST /chat
// ---------------------------------------------------------------------------

/// The query travels as a multipart `query` field and the answer is parsed.
#[tokio::test]
async fn test_send_message_posts_query_form_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_string_contains("name=\"query\""))
        .and(body_string_contains("What is retrieval augmented generation?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "What is retrieval augmented generation?",
            "answer": "It combines search with generation."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&server.uri());
    let reply = client
        .send_message("What is retrieval augmented generation?")
        .await
        .expect("send should succeed");

    assert_eq!(reply.answer, "It combines search with generation.");
    assert_eq!(reply.query, "What is retrieval augmented generation?");
}

/// A `detail` field in the error body becomes the error message verbatim.
#[tokio::test]
async fn test_send_message_error_uses_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "model unavailable"})),
        )
        .mount(&server)
        .await;

    let client = common::client_for(&server.uri());
    let err = client.send_message("Hello").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SoniaError>(),
        Some(SoniaError::Api(_))
    ));
    assert_eq!(err.to_string(), "model unavailable");
    assert_eq!(handle_api_error(&err), "model unavailable");
}

/// Without a usable body the message names the status code.
#[tokio::test]
async fn test_send_message_error_without_detail_uses_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let client = common::client_for(&server.uri());
    let err = client.send_message("Hello").await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP error! status: 502");
}

/// A success status with an unexpected body is reported, not panicked on.
#[tokio::test]
async fn test_send_message_malformed_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let client = common::client_for(&server.uri());
    let err = client.send_message("Hello").await.unwrap_err();

    assert!(err
        .to_string()
        .starts_with("Failed to parse assistant response"));
}

/// An unreachable service is reported as an API failure.
#[tokio::test]
async fn test_send_message_unreachable_service() {
    // Nothing listens on the discard port
    let client = common::client_for("http://127.0.0.1:9");
    let err = client.send_message("Hello").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SoniaError>(),
        Some(SoniaError::Api(_))
    ));
    assert!(err
        .to_string()
        .starts_with("Failed to reach assistant service"));
}

// ---------------------------------------------------------------------------
// POST /upload
// ---------------------------------------------------------------------------

/// The file travels as a multipart `file` part carrying its name.
#[tokio::test]
async fn test_upload_pdf_sends_file_part() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"report.pdf\""))
        .and(body_string_contains("%PDF-1.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_id": 4,
            "filename": "report.pdf",
            "chunks_stored": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, pdf) = common::temp_pdf("report.pdf");
    let upload = PdfUpload::from_path(&pdf).await.expect("read pdf");

    let client = common::client_for(&server.uri());
    let reply = client.upload_pdf(upload).await.expect("upload should succeed");

    assert_eq!(reply.file_id, 4);
    assert_eq!(reply.filename, "report.pdf");
    assert_eq!(reply.chunks_stored, 12);
    assert!(!reply.success);
    assert_eq!(reply.message, "");
}

/// The service's rejection detail surfaces for uploads too.
#[tokio::test]
async fn test_upload_pdf_error_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Only PDF files are supported"})),
        )
        .mount(&server)
        .await;

    let client = common::client_for(&server.uri());
    let err = client
        .upload_pdf(PdfUpload::new("scan.pdf", b"not really a pdf".to_vec()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Only PDF files are supported");
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_check_ok() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "message": "RAG pipeline ready"
        })))
        .mount(&server)
        .await;

    let client = common::client_for(&server.uri());
    let health = client.health_check().await.expect("health should succeed");

    assert_eq!(health.status, "healthy");
    assert_eq!(health.message, "RAG pipeline ready");
}

/// Health failures always use the status line, even when a detail is sent.
#[tokio::test]
async fn test_health_check_failure_uses_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "warming up"})))
        .mount(&server)
        .await;

    let client = common::client_for(&server.uri());
    let err = client.health_check().await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP error! status: 503");
}

/// A base URL with a trailing slash still reaches the right endpoint.
#[tokio::test]
async fn test_trailing_slash_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_for(&format!("{}/", server.uri()));
    let health = client.health_check().await.expect("health should succeed");

    assert_eq!(health.status, "healthy");
    assert_eq!(health.message, "");
}
