//! DeepSeek provider implementation (Chat Completions API)
//!
//! OpenAI-compatible wire format with `stream: true`; SSE frames are parsed
//! with core::SseDecoder and forwarded as StreamEvents over a channel.

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::core::SseDecoder;

use super::{ChatRequest, Provider, StreamEvent, ToolContinueRequest, ToolDefinition, Usage};

pub struct DeepSeekProvider {
    client: HttpClient,
    api_key: String,
    completions_url: String,
}

impl DeepSeekProvider {
    /// Create a provider against an OpenAI-compatible base URL
    /// (e.g. `https://api.deepseek.com/v1`).
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Self {
        Self {
            client: HttpClient::new(),
            api_key: api_key.into(),
            completions_url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }

    fn build_messages(request: &ChatRequest) -> Vec<WireMessage> {
        let mut messages = vec![WireMessage {
            role: "system".into(),
            content: Some(request.system.clone()),
            tool_calls: None,
            tool_call_id: None,
        }];

        for msg in &request.messages {
            messages.push(WireMessage {
                role: msg.role.as_str().into(),
                content: Some(msg.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        messages
    }

    fn build_tool_messages(request: &ToolContinueRequest) -> Vec<WireMessage> {
        let mut messages = vec![WireMessage {
            role: "system".into(),
            content: Some(request.system.clone()),
            tool_calls: None,
            tool_call_id: None,
        }];

        for msg in &request.messages {
            messages.push(WireMessage {
                role: msg.role.as_str().into(),
                content: Some(msg.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        // The API requires the assistant tool_calls message before tool results.
        // Arguments were already executed; only the structure matters here.
        if !request.tool_results.is_empty() {
            let tool_calls: Vec<WireToolCall> = request
                .tool_results
                .iter()
                .map(|r| WireToolCall {
                    id: r.call_id.clone(),
                    call_type: "function".into(),
                    function: WireToolCallFunction {
                        name: r.name.clone(),
                        arguments: "{}".into(),
                    },
                })
                .collect();

            messages.push(WireMessage {
                role: "assistant".into(),
                content: None,
                tool_calls: Some(tool_calls),
                tool_call_id: None,
            });
        }

        for result in &request.tool_results {
            messages.push(WireMessage {
                role: "tool".into(),
                content: Some(result.output.clone()),
                tool_calls: None,
                tool_call_id: Some(result.call_id.clone()),
            });
        }

        messages
    }

    fn convert_tools(tools: &[ToolDefinition]) -> Option<Vec<WireTool>> {
        if tools.is_empty() {
            return None;
        }
        Some(
            tools
                .iter()
                .map(|t| WireTool {
                    tool_type: "function".into(),
                    function: WireFunction {
                        name: t.name.clone(),
                        description: Some(t.description.clone()),
                        parameters: t.parameters.clone(),
                    },
                })
                .collect(),
        )
    }

    async fn send(&self, body: &CompletionRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(&self.completions_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("(failed to read body: {})", e));
            anyhow::bail!("DeepSeek API error {}: {}", status, text);
        }

        Ok(response)
    }

    /// Decode the SSE body and forward events to the channel.
    ///
    /// Tool calls stream interleaved by index; each in-flight call is tracked
    /// until the finish_reason arrives, at which point FunctionCallEnd fires.
    async fn process_sse_stream(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
        struct InFlightCall {
            id: String,
            name: String,
            started: bool,
        }

        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut tool_calls: HashMap<usize, InFlightCall> = HashMap::new();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                    break;
                }
            };

            for frame in decoder.push(&chunk) {
                if frame.is_done() {
                    continue;
                }

                let chunk_data: StreamChunk = match frame.parse_json() {
                    Some(c) => c,
                    None => continue,
                };

                for choice in chunk_data.choices {
                    let delta = choice.delta;

                    if let Some(content) = delta.content {
                        if !content.is_empty() {
                            let _ = tx.send(StreamEvent::TextDelta(content)).await;
                        }
                    }

                    if let Some(delta_tool_calls) = delta.tool_calls {
                        for tc in delta_tool_calls {
                            let call = tool_calls.entry(tc.index).or_insert_with(|| InFlightCall {
                                id: String::new(),
                                name: String::new(),
                                started: false,
                            });

                            if let Some(ref id) = tc.id {
                                call.id = id.clone();
                            }
                            if let Some(ref func) = tc.function {
                                if let Some(ref name) = func.name {
                                    call.name = name.clone();
                                }
                            }

                            if !call.started && !call.id.is_empty() && !call.name.is_empty() {
                                call.started = true;
                                let _ = tx
                                    .send(StreamEvent::FunctionCallStart {
                                        call_id: call.id.clone(),
                                        name: call.name.clone(),
                                    })
                                    .await;
                            }

                            if let Some(ref func) = tc.function {
                                if let Some(ref args) = func.arguments {
                                    if !args.is_empty() && call.started {
                                        let _ = tx
                                            .send(StreamEvent::FunctionCallDelta {
                                                call_id: call.id.clone(),
                                                arguments_delta: args.clone(),
                                            })
                                            .await;
                                    }
                                }
                            }
                        }
                    }

                    if choice.finish_reason.is_some() {
                        for (_, call) in tool_calls.drain() {
                            if call.started {
                                let _ = tx
                                    .send(StreamEvent::FunctionCallEnd { call_id: call.id })
                                    .await;
                            }
                        }
                    }
                }

                if let Some(usage) = chunk_data.usage {
                    let _ = tx
                        .send(StreamEvent::Usage(Usage {
                            input_tokens: usage.prompt_tokens,
                            output_tokens: usage.completion_tokens,
                        }))
                        .await;
                }
            }
        }

        let _ = tx.send(StreamEvent::Done).await;
    }
}

#[async_trait]
impl Provider for DeepSeekProvider {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    async fn create_stream(&self, request: ChatRequest) -> Result<mpsc::Receiver<StreamEvent>> {
        let body = CompletionRequest {
            model: request.model.clone(),
            messages: Self::build_messages(&request),
            tools: Self::convert_tools(&request.tools),
            stream: true,
        };

        let response = self.send(&body).await?;

        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(Self::process_sse_stream(response, tx));
        Ok(rx)
    }

    async fn continue_with_tools_stream(
        &self,
        request: ToolContinueRequest,
    ) -> Result<mpsc::Receiver<StreamEvent>> {
        let body = CompletionRequest {
            model: request.model.clone(),
            messages: Self::build_tool_messages(&request),
            tools: Self::convert_tools(&request.tools),
            stream: true,
        };

        let response = self.send(&body).await?;

        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(Self::process_sse_stream(response, tx));
        Ok(rx)
    }
}

// ============================================================================
// Wire types (OpenAI-compatible Chat Completions format)
// ============================================================================

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireToolCallFunction,
}

#[derive(Debug, Clone, Serialize)]
struct WireToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<StreamToolCall>>,
}

#[derive(Debug, Deserialize)]
struct StreamToolCall {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<StreamFunction>,
}

#[derive(Debug, Deserialize)]
struct StreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
