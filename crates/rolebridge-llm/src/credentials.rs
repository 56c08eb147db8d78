//! Bearer credentials for the backend

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mini_moka::sync::Cache;
use rolebridge_config::CredentialsConfig;
use secrecy::SecretString;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Variable stripped from the token command's environment
///
/// A service-account key there would make the CLI mint a token for that
/// account instead of the user's application-default login.
const CREDENTIALS_FILE_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no credential source configured")]
    NotConfigured,

    #[error("failed to run token command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("token command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("credential source returned an empty token")]
    Empty,

    #[error("token contains characters not allowed in an HTTP header")]
    InvalidHeader,
}

/// Source of the bearer token attached to every backend request
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<SecretString, CredentialError>;
}

/// A fixed, pre-issued token
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub const fn new(token: SecretString) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<SecretString, CredentialError> {
        Ok(self.token.clone())
    }
}

/// Token minted by an external command and reused for a fixed interval
pub struct CommandTokenProvider {
    command: Vec<String>,
    cache: Cache<(), SecretString>,
    refresh: Mutex<()>,
}

impl CommandTokenProvider {
    pub fn new(command: Vec<String>, refresh_interval: Duration) -> Self {
        Self {
            command,
            cache: Cache::builder().max_capacity(1).time_to_live(refresh_interval).build(),
            refresh: Mutex::new(()),
        }
    }

    async fn run(&self) -> Result<SecretString, CredentialError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(CredentialError::NotConfigured);
        };

        let output = Command::new(program)
            .args(args)
            .env_remove(CREDENTIALS_FILE_VAR)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CredentialError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CredentialError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        if token.is_empty() {
            return Err(CredentialError::Empty);
        }

        Ok(SecretString::from(token))
    }
}

#[async_trait]
impl TokenProvider for CommandTokenProvider {
    async fn token(&self) -> Result<SecretString, CredentialError> {
        if let Some(token) = self.cache.get(&()) {
            return Ok(token);
        }

        // One refresh at a time; waiters pick up the fresh token
        let _guard = self.refresh.lock().await;
        if let Some(token) = self.cache.get(&()) {
            return Ok(token);
        }

        let token = self.run().await?;
        tracing::debug!(program = self.command.first().map(String::as_str), "refreshed backend access token");
        self.cache.insert((), token.clone());

        Ok(token)
    }
}

/// Pick the credential source from configuration
///
/// A configured access token wins over the command.
///
/// # Errors
///
/// Returns an error if the refresh interval is invalid or no source is configured
pub fn from_config(config: &CredentialsConfig) -> anyhow::Result<Arc<dyn TokenProvider>> {
    if let Some(token) = &config.access_token {
        tracing::info!("using static backend access token");
        return Ok(Arc::new(StaticTokenProvider::new(token.clone())));
    }

    if config.command.is_empty() {
        return Err(CredentialError::NotConfigured.into());
    }

    tracing::info!(program = %config.command[0], "using command-issued backend access token");
    Ok(Arc::new(CommandTokenProvider::new(
        config.command.clone(),
        config.refresh_interval()?,
    )))
}
