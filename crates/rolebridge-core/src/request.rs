use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::{BackendMessage, ChatMessage};

/// OpenAI-style chat completion request
///
/// Only `model`, `messages`, `tool_choice` and `reasoning_effort` are ever
/// rewritten; every other field lands in `extra` and is forwarded as-is.
/// `tools`, `tool_choice` and `stream` stay in `extra` too, so an explicit
/// `null` is forwarded rather than collapsed into an absent key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "M: Deserialize<'de>"))]
pub struct ChatRequest<M = ChatMessage> {
    #[serde(default)]
    pub model: String,
    /// Conversation history; absent stays absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<M>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<Value>,
    /// Passthrough fields (tools, temperature, max_tokens, stream_options, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body as it is sent to the backend
pub type BackendChatRequest = ChatRequest<BackendMessage>;

impl<M> ChatRequest<M> {
    /// Replace the message list, keeping every other field
    pub fn map_messages<N, F>(self, f: F) -> ChatRequest<N>
    where
        F: FnOnce(Vec<M>) -> Vec<N>,
    {
        ChatRequest {
            model: self.model,
            messages: self.messages.map(f),
            reasoning_effort: self.reasoning_effort,
            extra: self.extra,
        }
    }

    /// Whether the client asked for a streamed response
    pub fn is_stream(&self) -> bool {
        self.extra.get("stream").and_then(Value::as_bool).unwrap_or(false)
    }

    /// The client's `tool_choice`, including an explicit `null`
    pub fn tool_choice(&self) -> Option<&Value> {
        self.extra.get("tool_choice")
    }

    /// Default `tool_choice` to `"auto"` when a `tools` key is present
    /// without a `tool_choice` key
    ///
    /// Returns true if the field was filled in.
    pub fn ensure_tool_choice(&mut self) -> bool {
        if self.extra.contains_key("tools") && !self.extra.contains_key("tool_choice") {
            self.extra
                .insert("tool_choice".to_owned(), Value::String("auto".to_owned()));
            true
        } else {
            false
        }
    }
}
