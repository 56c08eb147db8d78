use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from an optional TOML file plus environment overrides
    ///
    /// When `required` is false and the file does not exist, defaults are used.
    /// Deployment environment variables (`VERTEX_AI_PROJECT`, `PROXY_PORT`, ...)
    /// are applied on top before validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, an override is
    /// malformed, or validation fails
    pub fn load(path: &Path, required: bool) -> anyhow::Result<Self> {
        let mut config = if path.exists() || required {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
            Self::from_toml(&raw)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        crate::env::apply_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML text without environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if durations are malformed, the backend project is
    /// missing, or the truncation limit is zero
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_backend()?;
        self.credentials.refresh_interval()?;

        if self.sanitizer.max_tool_log_chars == 0 {
            anyhow::bail!("sanitizer.max_tool_log_chars must be greater than 0");
        }

        Ok(())
    }

    fn validate_backend(&self) -> anyhow::Result<()> {
        let backend = &self.backend;

        backend.connect_timeout()?;
        backend.request_timeout()?;
        backend.pool_idle_timeout()?;

        if backend.endpoint.is_none() {
            if backend.project.trim().is_empty() {
                anyhow::bail!("backend.project (or VERTEX_AI_PROJECT) is required unless backend.endpoint is set");
            }
            if backend.region.trim().is_empty() {
                anyhow::bail!("backend.region must not be empty");
            }
        }

        if self.credentials.access_token.is_none() && self.credentials.command.is_empty() {
            anyhow::bail!("credentials need either an access_token or a command");
        }

        Ok(())
    }
}
