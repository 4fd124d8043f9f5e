// tests/api.rs
// HTTP surface tests: routing, history endpoints, and SSE chat streaming
// against a scripted provider.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use folio_chat::chat::orchestrator::Orchestrator;
use folio_chat::provider::StreamEvent;
use folio_chat::server::{create_router, AppState};
use folio_chat::store::{MessageRole, MessageStore};

use common::{memory_store, CountingContext, MockProvider};

async fn test_app(scripts: Vec<Vec<StreamEvent>>) -> (Router, MessageStore) {
    let store = memory_store().await;
    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        Arc::new(CountingContext::new("")),
        Arc::new(MockProvider::scripted(scripts)),
        "deepseek-chat".to_string(),
        5,
    ));
    let router = create_router(AppState {
        orchestrator,
        store: store.clone(),
    })
    .expect("router");
    (router, store)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn status_reports_service_and_version() {
    let (app, _) = test_app(vec![]).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "folio-chat");
}

#[tokio::test]
async fn history_returns_recent_messages_oldest_first() {
    let (app, store) = test_app(vec![]).await;
    store.save(MessageRole::User, "question").await.unwrap();
    store.save(MessageRole::Assistant, "answer").await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/messages?limit=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    let messages = body.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "question");
    assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn clear_empties_the_history() {
    let (app, store) = test_app(vec![]).await;
    store.save(MessageRole::User, "hello").await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/messages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["success"], true);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/messages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_streams_events_over_sse() {
    let (app, store) = test_app(vec![vec![
        StreamEvent::TextDelta("Hi ".into()),
        StreamEvent::TextDelta("there".into()),
        StreamEvent::Done,
    ]])
    .await;

    let payload = json!({
        "messages": [{ "role": "user", "content": "hello" }]
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let body = body_string(response).await;
    assert!(body.contains("text_delta"));
    assert!(body.contains("Hi "));
    assert!(body.contains("\"type\":\"done\""));

    // The turn persisted both sides of the exchange.
    let history = store.history(10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, "Hi there");
}
