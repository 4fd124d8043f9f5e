//! Message history persistence over SQLite.
//!
//! One global conversation: rows are only ever inserted or bulk-deleted,
//! never updated. `created_at` is assigned at save time and is strictly
//! increasing in insertion order.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

/// Role of a persisted chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// A persisted chat message
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: i64,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Thin persistence interface over the `messages` table
#[derive(Clone)]
pub struct MessageStore {
    pool: SqlitePool,
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one message with a server-assigned timestamp.
    /// Errors propagate; the caller decides whether they are fatal.
    pub async fn save(&self, role: MessageRole, content: &str) -> Result<()> {
        sqlx::query("INSERT INTO messages (role, content, created_at) VALUES ($1, $2, $3)")
            .bind(role.as_str())
            .bind(content)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to save {} message", role.as_str()))?;

        debug!(role = role.as_str(), chars = content.len(), "saved message");
        Ok(())
    }

    /// The most recent `limit` messages in ascending chronological order
    /// (fetched descending, then reversed).
    pub async fn history(&self, limit: usize) -> Result<Vec<ChatMessage>> {
        let rows: Vec<(i64, String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, role, content, created_at
            FROM messages
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch message history")?;

        let mut messages: Vec<ChatMessage> = rows
            .into_iter()
            .map(|(id, role, content, created_at)| ChatMessage {
                id,
                role,
                content,
                created_at,
            })
            .collect();
        messages.reverse();
        Ok(messages)
    }

    /// Unconditionally delete every message. There is no conversation
    /// partitioning in the schema, so this clears the whole store.
    pub async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM messages")
            .execute(&self.pool)
            .await
            .context("failed to clear messages")?;
        Ok(())
    }
}
