//! HTTP client for the Sonia assistant service
//!
//! The assistant service owns PDF parsing, embedding, retrieval and answer
//! generation. This module only speaks its three endpoints:
//!
//! - `POST /chat` with a multipart `query` field
//! - `POST /upload` with a multipart `file` field
//! - `GET /health`
//!
//! Every failure is reported as [`SoniaError::Api`] carrying the message the
//! chat should show: the service's `detail` field when it sent one, or a
//! generic status line otherwise.

use crate::config::ApiConfig;
use crate::error::{Result, SoniaError};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Successful reply from `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The query as received by the service
    pub query: String,
    /// The generated answer
    pub answer: String,
}

/// Successful reply from `POST /upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Whether the service reports success (absent means not reported)
    #[serde(default)]
    pub success: bool,
    /// Identifier assigned to the stored file
    pub file_id: i64,
    /// Name the file was stored under
    pub filename: String,
    /// Number of text chunks embedded from the document
    pub chunks_stored: u64,
    /// Free-form status message from the service
    #[serde(default)]
    pub message: String,
}

/// Reply from `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status, e.g. `"healthy"`
    pub status: String,
    /// Human-readable status message
    #[serde(default)]
    pub message: String,
}

/// Error body sent by the service with non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// A PDF ready to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfUpload {
    /// File name sent with the multipart part
    pub filename: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl PdfUpload {
    /// Build an upload from in-memory bytes
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read a file from disk
    ///
    /// No file-type validation happens here; callers check the extension
    /// before reading.
    ///
    /// # Errors
    ///
    /// Returns [`SoniaError::Io`] if the file cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(SoniaError::Io)?;
        Ok(Self::new(display_file_name(path), bytes))
    }
}

/// File name component of a path, falling back to the whole path
pub fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Operations offered by the assistant service
///
/// The chat controller only depends on this trait, so it can run against
/// the HTTP client or an in-process double.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Ask a question and wait for the answer
    async fn send_message(&self, query: &str) -> Result<ChatResponse>;

    /// Upload a PDF for indexing
    async fn upload_pdf(&self, upload: PdfUpload) -> Result<UploadResponse>;

    /// Check service availability
    async fn health_check(&self) -> Result<HealthResponse>;
}

/// reqwest-backed [`Assistant`] implementation
///
/// # Examples
///
/// ```no_run
/// use sonia::client::{Assistant, AssistantClient};
/// use sonia::config::ApiConfig;
///
/// # async fn example() -> sonia::error::Result<()> {
/// let client = AssistantClient::new(&ApiConfig::default())?;
/// let reply = client.send_message("What is this document about?").await?;
/// println!("{}", reply.answer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
}

impl AssistantClient {
    /// Create a client for the configured service
    ///
    /// # Errors
    ///
    /// Returns [`SoniaError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| SoniaError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        tracing::info!(base_url = %base_url, "Initialized assistant client");

        Ok(Self { client, base_url })
    }

    /// Base URL requests are sent to (without trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_form<T>(&self, path: &str, form: Form) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "Sending assistant request");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Assistant request to {} failed: {}", url, e);
                transport_error(&e)
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await.into());
        }

        parse_body(response).await
    }
}

#[async_trait]
impl Assistant for AssistantClient {
    async fn send_message(&self, query: &str) -> Result<ChatResponse> {
        let form = Form::new().text("query", query.to_string());
        let reply: ChatResponse = self.post_form("chat", form).await?;
        tracing::debug!(answer_chars = reply.answer.chars().count(), "Received answer");
        Ok(reply)
    }

    async fn upload_pdf(&self, upload: PdfUpload) -> Result<UploadResponse> {
        tracing::info!(
            filename = %upload.filename,
            bytes = upload.bytes.len(),
            "Uploading document"
        );
        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str("application/pdf")
            .map_err(SoniaError::Http)?;
        let form = Form::new().part("file", part);

        let reply: UploadResponse = self.post_form("upload", form).await?;
        tracing::info!(
            file_id = reply.file_id,
            chunks = reply.chunks_stored,
            "Upload processed"
        );
        Ok(reply)
    }

    async fn health_check(&self) -> Result<HealthResponse> {
        let url = self.endpoint("health");
        tracing::debug!(url = %url, "Checking assistant health");

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Health check failed: {}", e);
            transport_error(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SoniaError::Api(status_message(status)).into());
        }

        parse_body(response).await
    }
}

/// Generic rejection text for a status code without a usable detail
///
/// # Examples
///
/// ```
/// use reqwest::StatusCode;
/// use sonia::client::status_message;
///
/// assert_eq!(
///     status_message(StatusCode::BAD_GATEWAY),
///     "HTTP error! status: 502"
/// );
/// ```
pub fn status_message(status: StatusCode) -> String {
    format!("HTTP error! status: {}", status.as_u16())
}

fn transport_error(error: &reqwest::Error) -> SoniaError {
    SoniaError::Api(format!("Failed to reach assistant service: {}", error))
}

/// Extract the `detail` text from an error body, if there is one
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let detail = match parsed.detail? {
        serde_json::Value::Null => return None,
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    };
    if detail.trim().is_empty() {
        None
    } else {
        Some(detail)
    }
}

async fn error_from_response(response: Response) -> SoniaError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_detail(&body).unwrap_or_else(|| status_message(status));
    tracing::error!(status = status.as_u16(), "Assistant service error: {}", message);
    SoniaError::Api(message)
}

async fn parse_body<T>(response: Response) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    response.json::<T>().await.map_err(|e| {
        tracing::error!("Failed to parse assistant response: {}", e);
        SoniaError::Api(format!("Failed to parse assistant response: {}", e)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> AssistantClient {
        let config = ApiConfig {
            base_url: base.to_string(),
            ..ApiConfig::default()
        };
        AssistantClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = client_for("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("chat"), "http://localhost:8000/chat");
        assert_eq!(client.endpoint("/upload"), "http://localhost:8000/upload");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client_for("http://example.test/api");
        assert_eq!(client.endpoint("health"), "http://example.test/api/health");
    }

    #[test]
    fn test_status_message_format() {
        assert_eq!(
            status_message(StatusCode::INTERNAL_SERVER_ERROR),
            "HTTP error! status: 500"
        );
    }

    #[test]
    fn test_extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "model unavailable"}"#),
            Some("model unavailable".to_string())
        );
    }

    #[test]
    fn test_extract_detail_missing_or_empty() {
        assert_eq!(extract_detail(r#"{"error": "x"}"#), None);
        assert_eq!(extract_detail(r#"{"detail": ""}"#), None);
        assert_eq!(extract_detail(r#"{"detail": null}"#), None);
        assert_eq!(extract_detail("<html>bad gateway</html>"), None);
        assert_eq!(extract_detail(""), None);
    }

    #[test]
    fn test_extract_detail_structured_value() {
        let body = r#"{"detail": [{"loc": ["body", "query"], "msg": "field required"}]}"#;
        let detail = extract_detail(body).unwrap();
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_upload_response_defaults_optional_fields() {
        let reply: UploadResponse =
            serde_json::from_str(r#"{"file_id": 3, "filename": "a.pdf", "chunks_stored": 7}"#)
                .unwrap();
        assert!(!reply.success);
        assert_eq!(reply.message, "");
        assert_eq!(reply.chunks_stored, 7);
    }

    #[test]
    fn test_display_file_name() {
        assert_eq!(display_file_name(Path::new("/tmp/docs/report.pdf")), "report.pdf");
        assert_eq!(display_file_name(Path::new("report.pdf")), "report.pdf");
    }

    #[tokio::test]
    async fn test_pdf_upload_from_missing_path_is_io_error() {
        let err = PdfUpload::from_path(Path::new("/definitely/not/here.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SoniaError>(),
            Some(SoniaError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_pdf_upload_from_path_reads_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"%PDF-1.4 test").unwrap();

        let upload = PdfUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.filename, "notes.pdf");
        assert_eq!(upload.bytes, b"%PDF-1.4 test");
    }
}
