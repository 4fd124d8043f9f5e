//! Qdrant-backed document index for the resume corpus.
//!
//! Documents are stored as points with their content in the payload; search
//! is plain cosine similarity over the collection via the REST API.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::json;

/// A corpus document returned by similarity search
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub content: String,
    pub score: f32,
}

pub struct DocumentIndex {
    client: Client,
    base_url: String,
    collection: String,
    embedding_dim: usize,
}

impl DocumentIndex {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        collection: impl Into<String>,
        embedding_dim: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            collection: collection.into(),
            embedding_dim,
        }
    }

    /// Ensure the collection exists with the configured vector size.
    /// Safe to call multiple times; only creates when missing.
    pub async fn ensure_collection(&self) -> Result<()> {
        let url = format!("{}/collections/{}", self.base_url, self.collection);
        let resp = self.client.get(&url).send().await?;
        if resp.status().is_success() {
            return Ok(());
        }

        let req_body = json!({
            "vectors": {
                "size": self.embedding_dim,
                "distance": "Cosine"
            }
        });

        let resp = self.client.put(&url).json(&req_body).send().await?;
        let status = resp.status();
        let err_body = resp.text().await.unwrap_or_default();
        if status.is_success() || status.as_u16() == 409 || err_body.contains("already exists") {
            Ok(())
        } else {
            Err(anyhow!("failed to create collection: {}", err_body))
        }
    }

    /// Upsert documents with their embeddings (seeding path).
    /// Point ids are the positions in the batch; re-seeding overwrites.
    pub async fn upsert_documents(&self, documents: &[(String, Vec<f32>)]) -> Result<()> {
        let url = format!("{}/collections/{}/points", self.base_url, self.collection);

        let points: Vec<serde_json::Value> = documents
            .iter()
            .enumerate()
            .map(|(i, (content, embedding))| {
                json!({
                    "id": i as i64,
                    "vector": embedding,
                    "payload": { "content": content }
                })
            })
            .collect();

        let resp = self
            .client
            .put(&url)
            .json(&json!({ "points": points }))
            .send()
            .await
            .map_err(|e| anyhow!("index upsert error: {}", e))?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "index upsert failed: {}",
                resp.text().await.unwrap_or_default()
            ));
        }
        Ok(())
    }

    /// Nearest-neighbour search. `score_threshold` of 0 means no filtering
    /// by similarity; the top `limit` documents come back regardless.
    pub async fn search(
        &self,
        embedding: &[f32],
        score_threshold: f32,
        limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );

        let req_body = json!({
            "vector": embedding,
            "limit": limit,
            "score_threshold": score_threshold,
            "with_payload": true,
        });

        let resp = self
            .client
            .post(&url)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| anyhow!("index search error: {}", e))?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "index search failed: {}",
                resp.text().await.unwrap_or_default()
            ));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        let mut results = Vec::new();

        if let Some(points) = resp_json.get("result").and_then(|r| r.as_array()) {
            for point in points {
                let content = point
                    .get("payload")
                    .and_then(|p| p.get("content"))
                    .and_then(|c| c.as_str())
                    .unwrap_or_default()
                    .to_string();
                let score = point
                    .get("score")
                    .and_then(|s| s.as_f64())
                    .unwrap_or(0.0) as f32;
                results.push(ScoredDocument { content, score });
            }
        }

        Ok(results)
    }
}
