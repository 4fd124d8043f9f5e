//! Incoming conversation-turn shapes and their plain-text projection.
//!
//! Clients send either a flat `{role, content}` turn or a parted
//! `{role, parts: [...]}` turn where parts are tagged by `type`. Everything
//! downstream works on the normalized plain text, so the two shapes collapse
//! through one function.

use serde::Deserialize;
use serde_json::Value;

/// Role of an incoming conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn, in either client shape
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IncomingMessage {
    Text { role: Role, content: String },
    Parted { role: Role, parts: Vec<MessagePart> },
}

/// A part of a parted turn: a known tagged part, or anything else the client
/// UI emits (step markers, tool results) which the text projection ignores.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessagePart {
    Known(KnownPart),
    Other(Value),
}

/// The part shapes we actually interpret
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum KnownPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool-call")]
    ToolCall {
        #[serde(rename = "toolName")]
        tool_name: String,
        #[serde(default)]
        args: Value,
    },
}

impl IncomingMessage {
    pub fn role(&self) -> Role {
        match self {
            IncomingMessage::Text { role, .. } => *role,
            IncomingMessage::Parted { role, .. } => *role,
        }
    }

    /// Canonical plain-text projection: the flat content as-is, or the
    /// `text` parts concatenated in order. Non-text parts contribute nothing.
    pub fn plain_text(&self) -> String {
        match self {
            IncomingMessage::Text { content, .. } => content.clone(),
            IncomingMessage::Parted { parts, .. } => parts
                .iter()
                .filter_map(|part| match part {
                    MessagePart::Known(KnownPart::Text { text }) => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .concat(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> IncomingMessage {
        serde_json::from_value(value).expect("valid message")
    }

    #[test]
    fn flat_shape_projects_content() {
        let msg = parse(json!({"role": "user", "content": "hello"}));
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.plain_text(), "hello");
    }

    #[test]
    fn parted_shape_concatenates_text_parts_in_order() {
        let msg = parse(json!({
            "role": "user",
            "parts": [
                {"type": "text", "text": "What are "},
                {"type": "tool-call", "toolName": "get_weather", "args": {"city": "Beijing"}},
                {"type": "text", "text": "your skills?"}
            ]
        }));
        assert_eq!(msg.plain_text(), "What are your skills?");
    }

    #[test]
    fn unknown_parts_are_tolerated_and_ignored() {
        let msg = parse(json!({
            "role": "assistant",
            "parts": [
                {"type": "step-start"},
                {"type": "text", "text": "done"}
            ]
        }));
        assert_eq!(msg.role(), Role::Assistant);
        assert_eq!(msg.plain_text(), "done");
    }

    #[test]
    fn parted_with_no_text_parts_is_empty() {
        let msg = parse(json!({
            "role": "user",
            "parts": [{"type": "tool-call", "toolName": "get_weather"}]
        }));
        assert_eq!(msg.plain_text(), "");
    }
}
