use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Conversational role of a message author
///
/// Clients send any of the OpenAI-style roles; the backend only accepts
/// `system`, `user` and `assistant`. Roles this proxy does not know are
/// carried through unchanged in [`Role::Other`]. A `null` role reads as
/// `user`; any other non-string value is kept as its JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum Role {
    System,
    Developer,
    #[default]
    User,
    Assistant,
    /// Gemini-style alias for `assistant`
    Model,
    Tool,
    /// Legacy function-calling result
    Function,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::Developer => "developer",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Model => "model",
            Self::Tool => "tool",
            Self::Function => "function",
            Self::Other(other) => other,
        }
    }

    /// Whether the message was authored by the model itself
    pub const fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant | Self::Model)
    }

    /// Whether the message carries the output of a tool invocation
    pub const fn is_tool_result(&self) -> bool {
        matches!(self, Self::Tool | Self::Function)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Self::System,
            "developer" => Self::Developer,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "model" => Self::Model,
            "tool" => Self::Tool,
            "function" => Self::Function,
            _ => Self::Other(value),
        }
    }
}

impl From<Value> for Role {
    fn from(value: Value) -> Self {
        match value {
            Value::String(role) => Self::from(role),
            Value::Null => Self::User,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(other) => other,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message content as sent by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text content
    Text(String),
    /// Structured content blocks (text, images, ...)
    Blocks(Vec<ContentBlock>),
    /// Anything else a client put in the field
    Other(Value),
}

/// One entry of a structured content list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentBlock {
    /// Bare string item
    Text(String),
    /// Object block such as `{"type": "text", "text": "..."}`
    Object(Map<String, Value>),
    /// Non-text item (numbers, nested lists, ...)
    Other(Value),
}

impl ContentBlock {
    /// Text payload of this block, if it has one
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Object(object) => object.get("text").map(|text| match text {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            }),
            Self::Other(_) => None,
        }
    }
}

/// A tool invocation recorded on an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionCall>,
}

impl ToolCall {
    /// Name of the invoked function, if the client recorded one
    pub fn name(&self) -> Option<&str> {
        self.function.as_ref().and_then(|function| function.name.as_deref())
    }
}

/// Function name and arguments
///
/// Arguments are kept opaque; they are usually a JSON-encoded string but
/// are never parsed or validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// A message in the client's conversation history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role; a missing role is read as `user`
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Legacy single function call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// Never interpreted, so any JSON value is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    /// Fields this proxy does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    /// Plain text message with the given role
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(Content::Text(content.into())),
            ..Self::default()
        }
    }
}

/// A message in the shape the backend accepts
///
/// Content is always a non-empty string and no tool-call metadata exists
/// on this type, so a sanitized history cannot carry it by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendMessage {
    pub role: Role,
    pub content: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<BackendMessage> for ChatMessage {
    fn from(message: BackendMessage) -> Self {
        Self {
            role: message.role,
            content: Some(Content::Text(message.content)),
            extra: message.extra,
            ..Self::default()
        }
    }
}
