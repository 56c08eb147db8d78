use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Bearer credential configuration for the backend
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Pre-issued access token; takes precedence over `command`
    #[serde(default)]
    pub access_token: Option<SecretString>,
    /// Command whose stdout is an access token
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    /// How long a token produced by `command` is reused (e.g. "45m")
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            command: default_command(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

impl CredentialsConfig {
    /// Parsed token reuse interval
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is not a valid duration
    pub fn refresh_interval(&self) -> anyhow::Result<Duration> {
        crate::backend::parse_duration("credentials.refresh_interval", &self.refresh_interval)
    }
}

fn default_command() -> Vec<String> {
    ["gcloud", "auth", "application-default", "print-access-token"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn default_refresh_interval() -> String {
    "45m".to_string()
}
