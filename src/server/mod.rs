// src/server/mod.rs
// HTTP server: router, shared state, and lifecycle

pub mod error;
pub mod handlers;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::chat::orchestrator::Orchestrator;
use crate::config::CONFIG;
use crate::store::MessageStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub store: MessageStore,
}

/// Build the API router with CORS, request timeout, and trace layers.
pub fn create_router(state: AppState) -> Result<Router> {
    let cors = if CONFIG.cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origin = CONFIG
            .cors_origin
            .parse::<HeaderValue>()
            .with_context(|| format!("invalid CORS origin: {}", CONFIG.cors_origin))?;
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
    };

    Ok(Router::new()
        .route("/api/chat", post(handlers::chat_stream))
        .route(
            "/api/messages",
            get(handlers::message_history).delete(handlers::clear_messages),
        )
        .route("/api/status", get(handlers::status))
        .layer(TimeoutLayer::new(Duration::from_secs(
            CONFIG.request_timeout_secs,
        )))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Bind and serve until the process is stopped.
pub async fn run(state: AppState) -> Result<()> {
    let router = create_router(state)?;
    let addr = CONFIG.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on {}", addr);

    axum::serve(listener, router)
        .await
        .context("server error")?;
    Ok(())
}
