//! Embedding & retrieval gateway.
//!
//! Turns a user query into an optional context string: embed the query, run
//! similarity search over the resume corpus, join the hits. Every failure
//! path degrades to an empty context; retrieval is an enhancement step and
//! must never take the request down with it.

mod embeddings;
mod index;

pub use embeddings::EmbeddingClient;
pub use index::{DocumentIndex, ScoredDocument};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Seam for the orchestrator: anything that can map a query to context text.
#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn context_for(&self, query: &str) -> String;
}

/// Production gateway: embedding client + vector index.
pub struct RagService {
    embedder: EmbeddingClient,
    index: Arc<DocumentIndex>,
    score_threshold: f32,
    limit: usize,
}

impl RagService {
    pub fn new(
        embedder: EmbeddingClient,
        index: Arc<DocumentIndex>,
        score_threshold: f32,
        limit: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            score_threshold,
            limit,
        }
    }
}

#[async_trait]
impl ContextSource for RagService {
    /// Empty query short-circuits to "" with no remote calls. Embedding or
    /// search failures log a warning and return "" as well.
    async fn context_for(&self, query: &str) -> String {
        if query.trim().is_empty() {
            return String::new();
        }

        let embedding = match self.embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!("query embedding failed, skipping retrieval: {}", e);
                return String::new();
            }
        };

        let documents = match self
            .index
            .search(&embedding, self.score_threshold, self.limit)
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                warn!("vector search failed, skipping retrieval: {}", e);
                return String::new();
            }
        };

        if documents.is_empty() {
            debug!("no relevant documents found");
            return String::new();
        }

        let context = join_documents(&documents);
        debug!(
            documents = documents.len(),
            chars = context.len(),
            "assembled retrieval context"
        );
        context
    }
}

/// Join document contents with a blank line, dropping blank entries.
fn join_documents(documents: &[ScoredDocument]) -> String {
    documents
        .iter()
        .map(|d| d.content.as_str())
        .filter(|c| !c.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
