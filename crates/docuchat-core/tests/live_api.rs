//! Integration test: actions against a live Document QA API, stood up with wiremock.
//!
//! Verifies that:
//! 1. Every call carries the session token as a bearer header.
//! 2. Error responses surface `detail`, or the per-operation fallback when it is missing.
//! 3. Validation failures never reach the network.
//! 4. Login/signup responses without `access_token` are rejected.
//! 5. A null answer renders as the "no answer" text instead of an error.

use std::sync::Arc;

use docuchat_core::{
    ActionResult, Actions, ChatPanel, Credentials, FileUpload, LiveApi, PanelEvent, QaPair,
    SessionChange, SessionContext, SessionToken,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn actions_for(server: &MockServer) -> Actions {
    Actions::new(Arc::new(LiveApi::new(&server.uri())))
}

fn session() -> SessionContext {
    SessionContext::with_token(SessionToken::new("tok-123"))
}

#[tokio::test]
async fn ask_sends_bearer_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_json(json!({"document_id": 42, "question": "What is X?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "X is Y."})))
        .expect(1)
        .mount(&server)
        .await;

    let result = actions_for(&server).ask(&session(), 42, "What is X?").await;
    assert_eq!(result.data().map(|a| a.answer.as_str()), Some("X is Y."));
}

#[tokio::test]
async fn error_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Document not found"})))
        .mount(&server)
        .await;

    let result = actions_for(&server).ask(&session(), 7, "q").await;
    assert_eq!(result, ActionResult::Failure("Document not found".into()));
}

#[tokio::test]
async fn missing_detail_uses_operation_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({"message": "too big"})))
        .mount(&server)
        .await;

    let actions = actions_for(&server);
    assert_eq!(
        actions.history(&session()).await.error(),
        Some("Failed to load history")
    );
    let file = FileUpload::new("big.pdf", "application/pdf", vec![0u8; 16]);
    assert_eq!(
        actions.upload(&session(), Some(file)).await.error(),
        Some("Upload failed")
    );
}

#[tokio::test]
async fn history_is_parsed_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "document_id": 5, "question": "q1", "answer": "a1", "created_at": "2024-05-01T10:00:00Z"},
            {"id": 2, "document_id": 6, "question": "q2", "answer": "a2", "created_at": "2024-05-02T10:00:00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let actions = actions_for(&server);
    let first = actions.chat_view_history(&session()).await;
    let second = actions.chat_view_history(&session()).await;
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].document_id, 6);
    assert_eq!(first, second);
}

#[tokio::test]
async fn upload_posts_multipart_file_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("authorization", "Bearer tok-123"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"notes.txt\""))
        .and(body_string_contains("meeting notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 77,
            "filename": "notes.txt",
            "mime_type": "text/plain",
            "file_size": 13,
            "uploaded_at": "2024-05-03T09:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = FileUpload::new("notes.txt", "text/plain", b"meeting notes".to_vec());
    let result = actions_for(&server).upload(&session(), Some(file)).await;
    let document = result.data().expect("upload succeeds");
    assert_eq!(document.id, 77);
    assert_eq!(document.file_size, 13);
}

#[tokio::test]
async fn login_posts_form_and_sets_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=a%40b.com"))
        .and(body_string_contains("password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "real-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = actions_for(&server)
        .login(&SessionContext::anonymous(), &Credentials::new("a@b.com", "secret"))
        .await;
    assert!(outcome.result.is_success());
    assert_eq!(outcome.session, SessionChange::Set(SessionToken::new("real-token")));
}

#[tokio::test]
async fn login_rejection_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect email or password"})))
        .mount(&server)
        .await;

    let outcome = actions_for(&server)
        .login(&SessionContext::anonymous(), &Credentials::new("a@b.com", "wrong"))
        .await;
    assert_eq!(outcome.result.error(), Some("Incorrect email or password"));
    assert_eq!(outcome.session, SessionChange::Keep);
}

#[tokio::test]
async fn signup_without_access_token_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signup"))
        .and(body_json(json!({"email": "new@user.io", "password": "longenough"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token_type": "bearer"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = actions_for(&server)
        .signup(&SessionContext::anonymous(), &Credentials::new("new@user.io", "longenough"))
        .await;
    assert_eq!(outcome.result.error(), Some("Invalid token received."));
    assert_eq!(outcome.session, SessionChange::Keep);
}

#[tokio::test]
async fn invalid_fields_make_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let actions = actions_for(&server);
    let login = actions
        .login(&SessionContext::anonymous(), &Credentials::new("not-an-email", "pw"))
        .await;
    let signup = actions
        .signup(&SessionContext::anonymous(), &Credentials::new("a@b.com", "short"))
        .await;
    assert_eq!(login.result.error(), Some("Invalid fields"));
    assert_eq!(signup.result.error(), Some("Invalid fields"));
}

#[tokio::test]
async fn unreachable_api_reports_generic_error() {
    let actions = Actions::new(Arc::new(LiveApi::new("http://127.0.0.1:1")));
    let result = actions.ask(&session(), 1, "anyone there?").await;
    assert_eq!(result.error(), Some("An unexpected error occurred"));
}

#[tokio::test]
async fn null_answer_renders_fallback_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": null})))
        .expect(1)
        .mount(&server)
        .await;

    let result = actions_for(&server).ask(&session(), 3, "Anything?").await;
    assert!(result.is_success());

    let history = vec![QaPair {
        id: 1,
        document_id: 3,
        question: "q".into(),
        answer: "a".into(),
        created_at: "2024-05-01T10:00:00Z".into(),
    }];
    let mut panel = ChatPanel::new(history, false);
    panel.apply(PanelEvent::SelectDocument(3));
    panel.apply(PanelEvent::InputChanged("Anything?".into()));
    panel.apply(PanelEvent::Submit);
    panel.apply(PanelEvent::AnswerResolved(result));
    assert_eq!(panel.messages()[1].content, "Sorry, I couldn't find an answer.");
}

#[tokio::test]
async fn upload_without_file_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let actions = actions_for(&server);
    assert_eq!(
        actions.upload(&session(), None).await.error(),
        Some("No file provided")
    );
    let empty = FileUpload::new("", "application/octet-stream", Vec::new());
    assert_eq!(
        actions.upload(&session(), Some(empty)).await.error(),
        Some("No file provided")
    );
}
