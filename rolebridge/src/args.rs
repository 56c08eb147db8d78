use std::path::PathBuf;

use clap::Parser;

/// Default configuration file, optional when it does not exist
pub const DEFAULT_CONFIG_PATH: &str = "rolebridge.toml";

/// rolebridge chat completion relay
#[derive(Debug, Parser)]
#[command(name = "rolebridge", about = "OpenAI-compatible relay that rewrites tool-call history for Vertex AI")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "ROLEBRIDGE_CONFIG")]
    pub config: PathBuf,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, default_value = "info", env = "ROLEBRIDGE_LOG")]
    pub log: String,
}

impl Args {
    /// Whether the config file was named explicitly and must exist
    pub fn config_required(&self) -> bool {
        self.config.as_os_str() != DEFAULT_CONFIG_PATH
    }
}
