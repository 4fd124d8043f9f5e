// tests/common/mod.rs
// Shared test doubles: a scripted provider, a counting context source, and
// an in-memory message store.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::mpsc;

use folio_chat::provider::{ChatRequest, Provider, StreamEvent, ToolContinueRequest};
use folio_chat::rag::ContextSource;
use folio_chat::server::types::ChatEvent;
use folio_chat::store::MessageStore;

/// Replays scripted event streams in order and records every request.
pub struct MockProvider {
    scripts: Mutex<VecDeque<Vec<StreamEvent>>>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Debug, Clone)]
pub enum RecordedRequest {
    Create(ChatRequest),
    Continue(ToolContinueRequest),
}

impl MockProvider {
    pub fn scripted(scripts: Vec<Vec<StreamEvent>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_script(&self) -> Vec<StreamEvent> {
        self.scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![StreamEvent::Done])
    }
}

fn replay(events: Vec<StreamEvent>) -> mpsc::Receiver<StreamEvent> {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        for event in events {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });
    rx
}

#[async_trait]
impl Provider for MockProvider {
    async fn create_stream(&self, request: ChatRequest) -> Result<mpsc::Receiver<StreamEvent>> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::Create(request));
        Ok(replay(self.next_script()))
    }

    async fn continue_with_tools_stream(
        &self,
        request: ToolContinueRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest::Continue(request));
        Ok(replay(self.next_script()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Context source returning a fixed string and counting invocations.
pub struct CountingContext {
    context: String,
    pub calls: AtomicUsize,
}

impl CountingContext {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextSource for CountingContext {
    async fn context_for(&self, _query: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.context.clone()
    }
}

/// Fresh in-memory store with migrations applied.
pub async fn memory_store() -> MessageStore {
    memory_store_with_pool().await.0
}

/// As [`memory_store`], also handing back the pool so a test can close it.
pub async fn memory_store_with_pool() -> (MessageStore, sqlx::SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    (MessageStore::new(pool.clone()), pool)
}

/// Collect every event until the channel closes.
pub async fn drain(mut rx: mpsc::Receiver<ChatEvent>) -> Vec<ChatEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}
