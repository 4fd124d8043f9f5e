// src/server/handlers.rs
// HTTP handlers for the chat API

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::{error, info, warn};

use crate::config::CONFIG;
use crate::server::error::{ApiResult, IntoApiError};
use crate::server::types::{ChatEvent, ChatPayload, ClearResponse, HistoryQuery};
use crate::server::AppState;
use crate::store::ChatMessage;

/// POST /api/chat - run a chat turn, streaming events over SSE.
///
/// The turn runs in a spawned task so it survives client disconnects; the
/// assistant reply still gets persisted when nobody is listening anymore.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    info!(turns = payload.messages.len(), "chat request received");

    let (tx, rx) = mpsc::channel::<ChatEvent>(64);
    let orchestrator = state.orchestrator.clone();

    tokio::spawn(async move {
        if let Err(e) = orchestrator.run(payload.messages, tx.clone()).await {
            error!("chat turn failed: {:?}", e);
            let _ = tx
                .send(ChatEvent::Error {
                    message: "Internal Server Error".to_string(),
                })
                .await;
            let _ = tx.send(ChatEvent::Done).await;
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| Event::default().json_data(&event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /api/messages - recent history, oldest first.
///
/// Storage trouble degrades to an empty list; the UI treats history as an
/// optional nicety, not a hard dependency.
pub async fn message_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<ChatMessage>> {
    let limit = query
        .limit
        .unwrap_or(CONFIG.history_default_limit)
        .clamp(1, CONFIG.history_max_limit);

    match state.store.history(limit).await {
        Ok(messages) => Json(messages),
        Err(e) => {
            warn!("history fetch failed, returning empty list: {}", e);
            Json(Vec::new())
        }
    }
}

/// DELETE /api/messages - clear the whole conversation.
pub async fn clear_messages(State(state): State<AppState>) -> ApiResult<Json<ClearResponse>> {
    state
        .store
        .clear_all()
        .await
        .into_api_error("Internal Server Error")?;

    info!("message history cleared");
    Ok(Json(ClearResponse { success: true }))
}

/// GET /api/status - liveness probe
pub async fn status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
