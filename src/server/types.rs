//! Request/response types and SSE events for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::chat::message::IncomingMessage;

/// Chat request body: the full conversation, oldest first, ending in the
/// user's latest turn.
#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    pub messages: Vec<IncomingMessage>,
}

/// Events streamed to the client over SSE
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ChatEvent {
    /// Streaming text from the assistant
    #[serde(rename = "text_delta")]
    TextDelta { delta: String },

    /// The model requested a tool call
    #[serde(rename = "tool_call_start")]
    ToolCallStart { call_id: String, name: String },

    /// A tool finished executing
    #[serde(rename = "tool_call_result")]
    ToolCallResult {
        call_id: String,
        name: String,
        output: String,
    },

    /// Token usage at end of a provider stream
    #[serde(rename = "usage")]
    Usage {
        input_tokens: u32,
        output_tokens: u32,
    },

    /// Stream complete
    #[serde(rename = "done")]
    Done,

    /// Error surfaced mid-stream
    #[serde(rename = "error")]
    Error { message: String },
}

/// Pagination query for message history
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Acknowledgment for the clear-history endpoint
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
}
