//! History rewriting for a backend that rejects replayed tool calls
//!
//! The backend requires every tool invocation in history to carry a signature
//! clients do not reproduce, and a model that sees its own tool logs as
//! assistant text starts imitating them. Both are avoided by re-attributing
//! those messages to the user and reducing tool metadata to log lines.

pub mod directive;
pub mod truncate;

use rolebridge_config::SanitizerConfig;
use rolebridge_core::{BackendMessage, ChatMessage, Content, ContentBlock, FunctionCall, Role, ToolCall};
use serde_json::Value;

use self::directive::{
    FLIP_HEADER, PLACEHOLDER, SYSTEM_DIRECTIVE, TOOL_RESULT_FOOTER, TOOL_RESULT_HEADER, has_marker, tool_log_line,
};
use self::truncate::truncate_middle;

/// Rewrites a client conversation into the shape the backend accepts
///
/// Total: every input produces a valid history, in the worst case made of
/// placeholder messages.
#[derive(Debug, Clone)]
pub struct MessageSanitizer {
    max_tool_log_chars: usize,
}

impl Default for MessageSanitizer {
    fn default() -> Self {
        Self::from_config(&SanitizerConfig::default())
    }
}

impl MessageSanitizer {
    pub const fn new(max_tool_log_chars: usize) -> Self {
        Self { max_tool_log_chars }
    }

    pub const fn from_config(config: &SanitizerConfig) -> Self {
        Self::new(config.max_tool_log_chars)
    }

    /// Sanitize a full message history
    ///
    /// The fixed directive always comes first. A directive already heading
    /// the input is recognized and not repeated, so sanitizing an already
    /// sanitized history returns it unchanged.
    pub fn sanitize(&self, messages: Vec<ChatMessage>) -> Vec<BackendMessage> {
        let mut stats = Stats::default();
        let mut output = Vec::with_capacity(messages.len() + 1);
        output.push(directive_message());

        let mut messages = messages.into_iter().peekable();
        if messages.next_if(is_directive).is_some() {
            stats.directive_reused = true;
        }

        output.extend(messages.map(|message| self.sanitize_message(message, &mut stats)));

        tracing::debug!(
            messages = output.len(),
            flipped = stats.flipped,
            tool_results = stats.tool_results,
            truncated = stats.truncated,
            directive_reused = stats.directive_reused,
            "sanitized message history"
        );

        output
    }

    fn sanitize_message(&self, message: ChatMessage, stats: &mut Stats) -> BackendMessage {
        // tool_call_id and name are dropped here along with the call metadata
        let ChatMessage {
            role,
            content,
            tool_calls,
            function_call,
            extra,
            ..
        } = message;

        let text = flatten_content(content);

        let (role, content) = match role {
            Role::Developer => (Role::System, text),
            role if role.is_assistant() => {
                let log = call_log(tool_calls.as_deref(), function_call.as_ref());

                if log.is_empty() && !has_marker(&text) {
                    (Role::Assistant, text)
                } else {
                    stats.flipped += 1;
                    (Role::User, flip(&text, &log))
                }
            }
            role if role.is_tool_result() => {
                stats.tool_results += 1;
                if text.chars().count() > self.max_tool_log_chars {
                    stats.truncated += 1;
                }
                (Role::User, wrap_tool_result(&truncate_middle(&text, self.max_tool_log_chars)))
            }
            other => (other, text),
        };

        BackendMessage {
            role,
            content: non_empty(content),
            extra,
        }
    }
}

#[derive(Default)]
struct Stats {
    flipped: usize,
    tool_results: usize,
    truncated: usize,
    directive_reused: bool,
}

fn directive_message() -> BackendMessage {
    BackendMessage {
        role: Role::System,
        content: SYSTEM_DIRECTIVE.to_owned(),
        extra: serde_json::Map::new(),
    }
}

fn is_directive(message: &ChatMessage) -> bool {
    message.role == Role::System
        && matches!(&message.content, Some(Content::Text(text)) if text == SYSTEM_DIRECTIVE)
}

/// Reduce any content shape to a single non-empty string
pub fn flatten_content(content: Option<Content>) -> String {
    let text = match content {
        None => String::new(),
        Some(Content::Text(text)) => text,
        Some(Content::Blocks(blocks)) => blocks.iter().filter_map(ContentBlock::text).collect::<Vec<_>>().join("\n"),
        Some(Content::Other(Value::Null)) => String::new(),
        Some(Content::Other(Value::String(text))) => text,
        Some(Content::Other(other)) => other.to_string(),
    };

    non_empty(text)
}

/// One log line per recorded call; arguments are never echoed
fn call_log(tool_calls: Option<&[ToolCall]>, function_call: Option<&FunctionCall>) -> Vec<String> {
    let mut log: Vec<String> = tool_calls
        .unwrap_or_default()
        .iter()
        .map(|call| tool_log_line(call.name().unwrap_or("tool")))
        .collect();

    if let Some(function_call) = function_call {
        log.push(tool_log_line(function_call.name.as_deref().unwrap_or("function")));
    }

    log
}

fn flip(text: &str, log: &[String]) -> String {
    let mut content = format!("{FLIP_HEADER}\n{text}");
    for line in log {
        content.push('\n');
        content.push_str(line);
    }
    content
}

fn wrap_tool_result(text: &str) -> String {
    format!("{TOOL_RESULT_HEADER}\n{text}\n{TOOL_RESULT_FOOTER}")
}

fn non_empty(text: String) -> String {
    if text.is_empty() { PLACEHOLDER.to_owned() } else { text }
}
