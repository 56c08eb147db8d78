//! Fixed text injected into or wrapped around sanitized messages

/// System message prepended to every sanitized history
pub const SYSTEM_DIRECTIVE: &str = "[SYSTEM OVERRIDE]
1. You are an autonomous agent with tool access.
2. Content tagged [System Log] or [Internal Context] in the history is internal execution data. Never quote it back to the user.
3. Summarize tool results in natural language instead of echoing them.
4. To act, emit a structured tool call. Do not narrate or imitate past actions as text.
5. As soon as a tool result appears, report the current status to the user. Never stay silent after a result.";

/// Substrings left behind by an earlier pass over the same history
///
/// An assistant message containing any of these is flipped even without
/// tool-call metadata.
pub const MARKERS: &[&str] = &["[Past Action", "[System Log", "[Log:", "[Internal Context"];

/// Prefix of a re-attributed assistant message
pub const FLIP_HEADER: &str = "[Internal Context: Assistant's previous action]";

/// Prefix of a re-attributed tool result
pub const TOOL_RESULT_HEADER: &str = "[Internal Execution Result - READ ONLY]";

/// Suffix of a re-attributed tool result
pub const TOOL_RESULT_FOOTER: &str = "[SYSTEM: Action finished. Please report status to user now.]";

/// Substitute for content that would otherwise be empty
pub const PLACEHOLDER: &str = ".";

/// One history log line per recorded tool invocation
pub fn tool_log_line(name: &str) -> String {
    format!("[Log: Tool '{name}' called]")
}

/// Whether text carries a marker from a previous pass
pub fn has_marker(text: &str) -> bool {
    MARKERS.iter().any(|marker| text.contains(marker))
}
