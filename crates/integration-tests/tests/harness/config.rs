//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use rolebridge_config::{BackendConfig, Config, CredentialsConfig, SanitizerConfig, ServerConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Configuration that sends every request to `base_url` with a static token
    pub fn new(base_url: &str) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                backend: BackendConfig {
                    project: "test-project".to_owned(),
                    endpoint: Some(base_url.parse().expect("valid URL")),
                    ..BackendConfig::default()
                },
                credentials: CredentialsConfig {
                    access_token: Some(SecretString::from("test-token")),
                    ..CredentialsConfig::default()
                },
                sanitizer: SanitizerConfig::default(),
                telemetry: None,
            },
        }
    }

    /// Set the tool output truncation limit
    pub fn with_max_tool_log_chars(mut self, max: usize) -> Self {
        self.config.sanitizer.max_tool_log_chars = max;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
