// src/bin/seed.rs
// Seed the vector index from a resume document.
//
// Usage: folio-seed [path]
//
// Reads the file (default ./resume.md), splits it into paragraph chunks,
// embeds each chunk, and upserts the batch into the Qdrant collection.
// Re-running replaces the previous corpus point-for-point.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use folio_chat::config::CONFIG;
use folio_chat::rag::{DocumentIndex, EmbeddingClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&CONFIG.log_level)),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "resume.md".to_string());
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read corpus file: {}", path))?;

    let chunks = split_paragraphs(&text);
    if chunks.is_empty() {
        bail!("no non-empty paragraphs in {}", path);
    }
    info!(file = %path, chunks = chunks.len(), "embedding corpus");

    let embedder = EmbeddingClient::new(
        CONFIG.embedding_api_key.clone(),
        &CONFIG.embedding_base_url,
        CONFIG.embedding_model.clone(),
    );
    let embeddings = embedder.embed_batch(&chunks).await?;
    if embeddings.len() != chunks.len() {
        bail!(
            "embedding count mismatch: {} chunks, {} vectors",
            chunks.len(),
            embeddings.len()
        );
    }

    let index = Arc::new(DocumentIndex::new(
        reqwest::Client::new(),
        CONFIG.qdrant_url.clone(),
        CONFIG.qdrant_collection.clone(),
        CONFIG.embedding_dim,
    ));
    index.ensure_collection().await?;

    let documents: Vec<(String, Vec<f32>)> = chunks.into_iter().zip(embeddings).collect();
    index.upsert_documents(&documents).await?;

    info!(
        collection = %CONFIG.qdrant_collection,
        points = documents.len(),
        "corpus seeded"
    );
    Ok(())
}

/// Split on blank lines, trimming and dropping empty chunks.
fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
