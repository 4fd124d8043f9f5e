//! Chat orchestration: the request-to-stream pipeline.
//!
//! One call runs the whole turn: normalize the latest user message, persist
//! it, fetch retrieval context, pick the system prompt, stream the completion
//! while executing tool calls under a step budget, then persist the
//! assistant's reply. Persistence and retrieval are best-effort; only the
//! provider call itself can fail the turn.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chat::message::{IncomingMessage, Role};
use crate::prompt;
use crate::provider::{
    ChatRequest, Message, MessageRole, Provider, StreamEvent, ToolContinueRequest, ToolResult,
};
use crate::rag::ContextSource;
use crate::server::types::ChatEvent;
use crate::store::{MessageRole as StoreRole, MessageStore};
use crate::tools::{execute_tool, tool_definitions};

/// Owns the collaborators a chat turn needs and runs turns against them.
pub struct Orchestrator {
    store: MessageStore,
    context: Arc<dyn ContextSource>,
    provider: Arc<dyn Provider>,
    model: String,
    step_budget: usize,
}

/// A tool call being assembled from streamed fragments
struct PendingCall {
    name: String,
    arguments: String,
}

impl Orchestrator {
    pub fn new(
        store: MessageStore,
        context: Arc<dyn ContextSource>,
        provider: Arc<dyn Provider>,
        model: String,
        step_budget: usize,
    ) -> Self {
        Self {
            store,
            context,
            provider,
            model,
            step_budget,
        }
    }

    /// Run one chat turn, emitting [`ChatEvent`]s on `tx`.
    ///
    /// Event sends are best-effort: a disconnected client stops delivery but
    /// not the turn, so the assistant reply still gets persisted. Errors from
    /// the completion provider propagate to the caller.
    pub async fn run(
        &self,
        turns: Vec<IncomingMessage>,
        tx: mpsc::Sender<ChatEvent>,
    ) -> Result<()> {
        let user_text = turns
            .last()
            .filter(|turn| turn.role() == Role::User)
            .map(|turn| turn.plain_text())
            .unwrap_or_default();

        if !user_text.trim().is_empty() {
            if let Err(e) = self.store.save(StoreRole::User, &user_text).await {
                warn!("failed to persist user message: {}", e);
            }
        }

        let context = if user_text.trim().is_empty() {
            String::new()
        } else {
            self.context.context_for(&user_text).await
        };
        let system = prompt::system_prompt(&context);

        let mut conversation: Vec<Message> = turns
            .iter()
            .map(|turn| Message {
                role: match turn.role() {
                    Role::User => MessageRole::User,
                    Role::Assistant => MessageRole::Assistant,
                },
                content: turn.plain_text(),
            })
            .collect();

        let tools = tool_definitions();
        let mut rx = self
            .provider
            .create_stream(ChatRequest {
                model: self.model.clone(),
                system: system.clone(),
                messages: conversation.clone(),
                tools: tools.clone(),
            })
            .await?;

        let mut transcript = String::new();
        let mut failed = false;

        for step in 0..self.step_budget {
            let mut pending: HashMap<String, PendingCall> = HashMap::new();
            let mut tool_results: Vec<ToolResult> = Vec::new();
            let mut step_text = String::new();

            while let Some(event) = rx.recv().await {
                match event {
                    StreamEvent::TextDelta(delta) => {
                        transcript.push_str(&delta);
                        step_text.push_str(&delta);
                        let _ = tx.send(ChatEvent::TextDelta { delta }).await;
                    }
                    StreamEvent::FunctionCallStart { call_id, name } => {
                        debug!(call_id = %call_id, name = %name, "tool call started");
                        pending.insert(
                            call_id.clone(),
                            PendingCall {
                                name: name.clone(),
                                arguments: String::new(),
                            },
                        );
                        let _ = tx.send(ChatEvent::ToolCallStart { call_id, name }).await;
                    }
                    StreamEvent::FunctionCallDelta {
                        call_id,
                        arguments_delta,
                    } => {
                        if let Some(call) = pending.get_mut(&call_id) {
                            call.arguments.push_str(&arguments_delta);
                        }
                    }
                    StreamEvent::FunctionCallEnd { call_id } => {
                        if let Some(call) = pending.remove(&call_id) {
                            let output = run_tool(&call.name, &call.arguments);
                            let _ = tx
                                .send(ChatEvent::ToolCallResult {
                                    call_id: call_id.clone(),
                                    name: call.name.clone(),
                                    output: output.clone(),
                                })
                                .await;
                            tool_results.push(ToolResult {
                                call_id,
                                name: call.name,
                                output,
                            });
                        }
                    }
                    StreamEvent::Usage(usage) => {
                        let _ = tx
                            .send(ChatEvent::Usage {
                                input_tokens: usage.input_tokens,
                                output_tokens: usage.output_tokens,
                            })
                            .await;
                    }
                    StreamEvent::Error(message) => {
                        warn!("provider stream error: {}", message);
                        let _ = tx.send(ChatEvent::Error { message }).await;
                        failed = true;
                    }
                    StreamEvent::Done => break,
                }
            }

            if failed || tool_results.is_empty() {
                break;
            }
            if step + 1 == self.step_budget {
                warn!(budget = self.step_budget, "tool step budget exhausted");
                break;
            }

            if !step_text.is_empty() {
                conversation.push(Message {
                    role: MessageRole::Assistant,
                    content: step_text,
                });
            }

            info!(
                step = step + 1,
                tools = tool_results.len(),
                "continuing completion with tool results"
            );
            rx = self
                .provider
                .continue_with_tools_stream(ToolContinueRequest {
                    model: self.model.clone(),
                    system: system.clone(),
                    messages: conversation.clone(),
                    tool_results,
                    tools: tools.clone(),
                })
                .await?;
        }

        // Only complete replies enter history; a failed stream leaves its
        // partial text behind.
        if !failed && !transcript.is_empty() {
            if let Err(e) = self.store.save(StoreRole::Assistant, &transcript).await {
                warn!("failed to persist assistant message: {}", e);
            }
        }

        let _ = tx.send(ChatEvent::Done).await;
        Ok(())
    }
}

/// Parse the accumulated argument fragments and execute the tool. A failure
/// becomes an error payload the model can read, not a turn failure.
fn run_tool(name: &str, arguments: &str) -> String {
    let parsed: Value = serde_json::from_str(arguments).unwrap_or_else(|_| json!({}));
    match execute_tool(name, &parsed) {
        Ok(value) => value.to_string(),
        Err(e) => {
            warn!(tool = name, "tool execution failed: {}", e);
            json!({ "error": e.to_string() }).to_string()
        }
    }
}
