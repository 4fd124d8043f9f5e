//! Tool registry exposed to the model.
//!
//! A fixed mapping from tool name to definition and execution function.
//! Tools are pure functions from validated input to a structured result;
//! the only side effect is the invocation log line.

mod weather;

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::provider::ToolDefinition;

/// Definitions handed to the completion provider
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: "get_weather".into(),
        description: "Get the current weather for a specific city".into(),
        parameters: json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The name of the city to get weather for"
                }
            },
            "required": ["city"]
        }),
    }]
}

/// Execute a tool by name with already-parsed arguments.
pub fn execute_tool(name: &str, arguments: &Value) -> Result<Value> {
    match name {
        "get_weather" => {
            let city = arguments
                .get("city")
                .and_then(|c| c.as_str())
                .unwrap_or_default();
            Ok(weather::get_weather(city))
        }
        other => Err(anyhow!("unknown tool: {}", other)),
    }
}
