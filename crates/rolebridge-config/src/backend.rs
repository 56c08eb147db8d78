use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Backend endpoint and connection pool configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Cloud project that owns the model endpoints
    #[serde(default)]
    pub project: String,
    /// Region used for the regional endpoint
    #[serde(default = "default_region")]
    pub region: String,
    /// Send every request to this base URL instead of the derived endpoints
    #[serde(default)]
    pub endpoint: Option<Url>,
    /// Model name fragments that are only served from the global endpoint
    #[serde(default = "default_global_model_families")]
    pub global_model_families: Vec<String>,
    /// Ceiling for establishing an outbound connection (e.g. "10s")
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: String,
    /// Ceiling for a whole request including the streamed body (e.g. "5m")
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    /// Maximum idle keep-alive connections kept per host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
    /// How long an idle pooled connection is kept (e.g. "90s")
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            region: default_region(),
            endpoint: None,
            global_model_families: default_global_model_families(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            pool_idle_timeout: default_pool_idle_timeout(),
        }
    }
}

impl BackendConfig {
    /// Parsed connection establishment timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is not a valid duration
    pub fn connect_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration("backend.connect_timeout", &self.connect_timeout)
    }

    /// Parsed overall request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is not a valid duration
    pub fn request_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration("backend.request_timeout", &self.request_timeout)
    }

    /// Parsed idle expiry for pooled connections
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is not a valid duration
    pub fn pool_idle_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration("backend.pool_idle_timeout", &self.pool_idle_timeout)
    }
}

pub(crate) fn parse_duration(field: &str, value: &str) -> anyhow::Result<Duration> {
    duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{value}': {e}"))
}

fn default_region() -> String {
    "us-west1".to_string()
}

fn default_global_model_families() -> Vec<String> {
    vec!["gemini-3-".to_string()]
}

fn default_connect_timeout() -> String {
    "10s".to_string()
}

fn default_request_timeout() -> String {
    "5m".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_pool_max_idle_per_host() -> usize {
    32
}

fn default_pool_idle_timeout() -> String {
    "90s".to_string()
}
