// src/rag/embeddings.rs

//! Client for an OpenAI-compatible `/embeddings` endpoint.
//! The portfolio corpus uses Zhipu's `embedding-3` model by default.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::json;

#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    api_key: String,
    embeddings_url: String,
    model: String,
}

impl EmbeddingClient {
    pub fn new(api_key: impl Into<String>, base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            embeddings_url: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.into(),
        }
    }

    /// Embed a single string
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let req_body = json!({
            "input": text,
            "model": self.model,
        });

        let resp = self
            .client
            .post(&self.embeddings_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&req_body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "embedding request failed: {}",
                resp.text().await.unwrap_or_default()
            ));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        let embedding = resp_json["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| anyhow!("no embedding in response"))?
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        Ok(embedding)
    }

    /// Embed a batch of strings in one request (used by the seeding utility).
    /// Results come back in input order.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let req_body = json!({
            "input": texts,
            "model": self.model,
        });

        let resp = self
            .client
            .post(&self.embeddings_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&req_body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "batch embedding request failed: {}",
                resp.text().await.unwrap_or_default()
            ));
        }

        let resp_json: serde_json::Value = resp.json().await?;
        let mut data: Vec<(usize, Vec<f32>)> = resp_json["data"]
            .as_array()
            .ok_or_else(|| anyhow!("no data array in embedding response"))?
            .iter()
            .map(|item| {
                let index = item["index"].as_u64().unwrap_or(0) as usize;
                let vector = item["embedding"]
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                            .collect()
                    })
                    .unwrap_or_default();
                (index, vector)
            })
            .collect();

        data.sort_by_key(|(index, _)| *index);
        Ok(data.into_iter().map(|(_, vector)| vector).collect())
    }
}
