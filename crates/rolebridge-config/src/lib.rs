#![allow(clippy::must_use_candidate)]

pub mod backend;
pub mod credentials;
mod env;
pub mod health;
mod loader;
pub mod sanitizer;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use backend::*;
pub use credentials::*;
pub use health::*;
pub use sanitizer::*;
pub use server::*;
pub use telemetry::TelemetryConfig;

/// Top-level rolebridge configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend endpoint and transport configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Bearer credential configuration
    #[serde(default)]
    pub credentials: CredentialsConfig,
    /// Message rewriting configuration
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
