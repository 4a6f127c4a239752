//! End-to-end chat flows
//!
//! Drives `ChatController` with the real HTTP client against a `wiremock`
//! server and checks the resulting sessions, titles and messages.

mod common;

use serde_json::json;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sonia::chat::{ChatController, UPLOAD_VALIDATION_MESSAGE};
use sonia::error::SoniaError;
use sonia::session::Sender;

fn controller_for(server: &MockServer) -> ChatController {
    ChatController::new(Box::new(common::client_for(&server.uri())))
}

#[tokio::test]
async fn test_first_question_creates_titled_chat_with_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"query": "Hello", "answer": "Hi there"})),
        )
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.send_message("Hello").await.expect("send");

    let store = chat.store();
    assert_eq!(store.len(), 1);
    let session = store.current().expect("current chat");
    assert_eq!(session.title(), "Hello");

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender(), Sender::User);
    assert_eq!(messages[0].content(), "Hello");
    assert_eq!(messages[1].sender(), Sender::Bot);
    assert_eq!(messages[1].content(), "Hi there");
    assert!(!chat.is_sending());
}

#[tokio::test]
async fn test_rejected_question_becomes_bot_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"detail": "model unavailable"})),
        )
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    let reply = chat.send_message("Hello").await.expect("send").expect("reply");

    assert_eq!(reply.sender(), Sender::Bot);
    assert_eq!(
        reply.content(),
        "Sorry, I encountered an error: model unavailable. Please make sure the backend is running."
    );
    assert_eq!(chat.store().current().expect("chat").messages().len(), 2);
}

#[tokio::test]
async fn test_upload_into_empty_chat_sets_title_and_reports_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_id": 1,
            "filename": "report.pdf",
            "chunks_stored": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, pdf) = common::temp_pdf("report.pdf");
    let mut chat = controller_for(&server);
    let reply = chat.upload_pdf(&pdf).await.expect("upload").expect("reply");

    assert_eq!(
        reply.content(),
        "Successfully uploaded \"report.pdf\" - 12 chunks processed. You can now ask questions about this document!"
    );
    let session = chat.store().current().expect("chat");
    assert_eq!(session.title(), "Chat about report.pdf");
    assert_eq!(session.messages().len(), 1);
    assert!(!chat.is_uploading());
}

#[tokio::test]
async fn test_non_pdf_upload_never_reaches_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    let err = chat.upload_pdf(Path::new("image.png")).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SoniaError>(),
        Some(SoniaError::Validation(_))
    ));
    assert_eq!(err.to_string(), UPLOAD_VALIDATION_MESSAGE);
    assert!(chat.store().is_empty());
}

#[tokio::test]
async fn test_failed_upload_reports_and_allows_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (_dir, pdf) = common::temp_pdf("report.pdf");
    let mut chat = controller_for(&server);

    let first = chat.upload_pdf(&pdf).await.expect("upload").expect("reply");
    assert_eq!(
        first.content(),
        "Upload failed: HTTP error! status: 500. Please make sure the backend is running and try again."
    );

    let second = chat.upload_pdf(&pdf).await.expect("retry").expect("reply");
    assert!(second.content().starts_with("Upload failed:"));

    let session = chat.store().current().expect("chat");
    assert_eq!(session.title(), "New Chat");
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn test_conversation_across_two_chats() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"query": "q", "answer": "a"})),
        )
        .mount(&server)
        .await;

    let mut chat = controller_for(&server);
    chat.send_message("First chat question").await.expect("send");
    let first = chat.store().current_id().expect("first");

    let second = chat.store_mut().create_session();
    chat.send_message("Second chat question").await.expect("send");

    let store = chat.store();
    assert_eq!(store.len(), 2);
    assert_eq!(store.sessions()[0].id(), second);
    assert_eq!(store.get(first).expect("first").messages().len(), 2);
    assert_eq!(store.get(second).expect("second").title(), "Second chat question");

    chat.store_mut().delete_session(second);
    assert_eq!(chat.store().current_id(), Some(first));
}
