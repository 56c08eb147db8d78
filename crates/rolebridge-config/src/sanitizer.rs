use serde::Deserialize;

/// Default ceiling for tool output carried into history
pub const DEFAULT_MAX_TOOL_LOG_CHARS: usize = 30_000;

/// Message rewriting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SanitizerConfig {
    /// Tool results longer than this many characters are truncated
    #[serde(default = "default_max_tool_log_chars")]
    pub max_tool_log_chars: usize,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_tool_log_chars: DEFAULT_MAX_TOOL_LOG_CHARS,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_tool_log_chars() -> usize {
    DEFAULT_MAX_TOOL_LOG_CHARS
}
