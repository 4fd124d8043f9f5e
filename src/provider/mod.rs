//! Provider abstraction for the hosted completion model.
//!
//! DeepSeek (OpenAI-compatible Chat Completions) is the only production
//! implementation; the trait exists so orchestration tests can substitute a
//! scripted provider.

mod deepseek;

pub use deepseek::DeepSeekProvider;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Unified provider trait for the streaming LLM backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Create a streaming chat completion
    async fn create_stream(&self, request: ChatRequest) -> Result<mpsc::Receiver<StreamEvent>>;

    /// Continue a conversation with tool results (streaming)
    async fn continue_with_tools_stream(
        &self,
        request: ToolContinueRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Role of a conversation message sent to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

/// One turn of provider-facing conversation history
#[derive(Debug, Clone)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// A streaming completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

/// Continuation request carrying executed tool results
#[derive(Debug, Clone)]
pub struct ToolContinueRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
    pub tool_results: Vec<ToolResult>,
    pub tools: Vec<ToolDefinition>,
}

/// Tool definition in provider-neutral form
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Result of one executed tool call
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub call_id: String,
    pub name: String,
    pub output: String,
}

/// Token usage reported at end of stream
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Events emitted by a provider stream
#[derive(Debug, Clone)]
pub enum StreamEvent {
    TextDelta(String),
    FunctionCallStart { call_id: String, name: String },
    FunctionCallDelta { call_id: String, arguments_delta: String },
    FunctionCallEnd { call_id: String },
    Usage(Usage),
    Error(String),
    Done,
}
