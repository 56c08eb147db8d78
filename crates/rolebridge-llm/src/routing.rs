//! Model identifier parsing and backend endpoint selection
//!
//! Clients encode a reasoning effort in the model name (`gemini-2.5-pro-high`).
//! The router strips that suffix and picks the endpoint that serves the
//! remaining base model: some model families are only available from the
//! global control plane, everything else goes to the configured region.

use rolebridge_config::BackendConfig;
use url::Url;

/// Recognized model-name suffixes and the effort level each one maps to
///
/// Checked in order; the first suffix that matches wins.
pub const EFFORT_SUFFIXES: &[(&str, &str)] = &[
    ("none", "minimal"),
    ("low", "low"),
    ("medium", "medium"),
    ("high", "high"),
];

/// Where and how a request for a given model identifier is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Model name without any effort suffix
    pub base_model: String,
    /// Effort derived from the suffix, if one was present
    pub effort: Option<&'static str>,
    /// Chat completions URL of the selected endpoint
    pub endpoint: Url,
}

/// Split an effort suffix off a client model identifier
///
/// Identifiers without a recognized suffix are returned unchanged.
pub fn parse_model_id(model_id: &str) -> (&str, Option<&'static str>) {
    EFFORT_SUFFIXES
        .iter()
        .find_map(|(suffix, effort)| {
            model_id
                .strip_suffix(suffix)
                .and_then(|rest| rest.strip_suffix('-'))
                .map(|base| (base, Some(*effort)))
        })
        .unwrap_or((model_id, None))
}

/// Table-driven model router
#[derive(Debug, Clone)]
pub struct ModelRouter {
    global: Url,
    regional: Url,
    global_families: Vec<String>,
}

impl ModelRouter {
    /// Create a router from explicit endpoints
    ///
    /// `global` and `regional` are the full chat completions URLs.
    pub const fn new(global: Url, regional: Url, global_families: Vec<String>) -> Self {
        Self {
            global,
            regional,
            global_families,
        }
    }

    /// Build the router from backend configuration
    ///
    /// An explicit `endpoint` override replaces both derived endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the project or region produce an invalid URL
    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        let (global, regional) = match &config.endpoint {
            Some(endpoint) => {
                let url = completions_url(endpoint.as_str())?;
                (url.clone(), url)
            }
            None => {
                let project = &config.project;
                let region = &config.region;
                let global = completions_url(&format!(
                    "https://aiplatform.googleapis.com/v1/projects/{project}/locations/global/endpoints/openapi"
                ))?;
                let regional = completions_url(&format!(
                    "https://{region}-aiplatform.googleapis.com/v1/projects/{project}/locations/{region}/endpoints/openapi"
                ))?;
                (global, regional)
            }
        };

        Ok(Self::new(global, regional, config.global_model_families.clone()))
    }

    /// Resolve a client model identifier to a base model, effort and endpoint
    pub fn route(&self, model_id: &str) -> Route {
        let (base_model, effort) = parse_model_id(model_id);

        let endpoint = if self.is_global_only(base_model) {
            self.global.clone()
        } else {
            self.regional.clone()
        };

        Route {
            base_model: base_model.to_owned(),
            effort,
            endpoint,
        }
    }

    /// Whether the model belongs to a family served only from the global endpoint
    pub fn is_global_only(&self, base_model: &str) -> bool {
        self.global_families
            .iter()
            .any(|family| base_model.contains(family.as_str()))
    }
}

fn completions_url(base: &str) -> anyhow::Result<Url> {
    let base = base.trim_end_matches('/');
    Url::parse(&format!("{base}/chat/completions")).map_err(|e| anyhow::anyhow!("invalid backend URL '{base}': {e}"))
}
