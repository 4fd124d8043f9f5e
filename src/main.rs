// src/main.rs

use std::sync::Arc;

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, warn};

use folio_chat::chat::orchestrator::Orchestrator;
use folio_chat::config::CONFIG;
use folio_chat::provider::{DeepSeekProvider, Provider};
use folio_chat::rag::{DocumentIndex, EmbeddingClient, RagService};
use folio_chat::server::{self, AppState};
use folio_chat::store::MessageStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&CONFIG.log_level)),
        )
        .init();

    info!("starting folio-chat v{}", env!("CARGO_PKG_VERSION"));

    let db_options = SqliteConnectOptions::from_str(&CONFIG.database_url)
        .with_context(|| format!("invalid database url: {}", CONFIG.database_url))?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(CONFIG.sqlite_max_connections)
        .connect_with(db_options)
        .await
        .with_context(|| format!("failed to open database: {}", CONFIG.database_url))?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;
    let store = MessageStore::new(pool);

    let index = Arc::new(DocumentIndex::new(
        reqwest::Client::new(),
        CONFIG.qdrant_url.clone(),
        CONFIG.qdrant_collection.clone(),
        CONFIG.embedding_dim,
    ));
    // The index is an enhancement: come up without it rather than refuse to start.
    if let Err(e) = index.ensure_collection().await {
        warn!("vector index unavailable, retrieval will degrade: {}", e);
    }

    let embedder = EmbeddingClient::new(
        CONFIG.embedding_api_key.clone(),
        &CONFIG.embedding_base_url,
        CONFIG.embedding_model.clone(),
    );
    let rag = Arc::new(RagService::new(
        embedder,
        index,
        CONFIG.retrieval_threshold,
        CONFIG.retrieval_limit,
    ));

    let provider = Arc::new(DeepSeekProvider::new(
        CONFIG.deepseek_api_key.clone(),
        &CONFIG.deepseek_base_url,
    ));
    info!(provider = provider.name(), model = %CONFIG.chat_model, "provider ready");

    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        rag,
        provider,
        CONFIG.chat_model.clone(),
        CONFIG.step_budget,
    ));

    server::run(AppState {
        orchestrator,
        store,
    })
    .await
}
