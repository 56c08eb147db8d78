//! Per-process relay state shared by every request handler

use std::sync::Arc;

use rolebridge_config::Config;
use rolebridge_core::ChatRequest;

use crate::backend::{BackendClient, ReqwestBackend};
use crate::credentials::{self, TokenProvider};
use crate::engine::{self, Outcome, StreamingProxyEngine};
use crate::error::ProxyError;
use crate::routing::ModelRouter;
use crate::sanitize::MessageSanitizer;

/// Shared state for relay route handlers
#[derive(Clone)]
pub struct RelayState {
    inner: Arc<RelayStateInner>,
}

struct RelayStateInner {
    router: ModelRouter,
    sanitizer: MessageSanitizer,
    engine: StreamingProxyEngine,
    tokens: Arc<dyn TokenProvider>,
}

impl RelayState {
    pub fn new(
        router: ModelRouter,
        sanitizer: MessageSanitizer,
        backend: Arc<dyn BackendClient>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(RelayStateInner {
                router,
                sanitizer,
                engine: StreamingProxyEngine::new(backend),
                tokens,
            }),
        }
    }

    /// Build the state from configuration, creating the shared connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if endpoints, timeouts or the credential source are invalid
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let router = ModelRouter::from_config(&config.backend)?;
        let sanitizer = MessageSanitizer::from_config(&config.sanitizer);
        let backend = Arc::new(ReqwestBackend::from_config(&config.backend)?);
        let tokens = credentials::from_config(&config.credentials)?;

        Ok(Self::new(router, sanitizer, backend, tokens))
    }

    /// Run one inbound chat completion body through the full pipeline
    ///
    /// # Errors
    ///
    /// Fails on a body that is not a chat request, a credential failure, or a
    /// backend that cannot be reached
    pub async fn relay(&self, body: &[u8]) -> Result<Outcome, ProxyError> {
        let request: ChatRequest =
            serde_json::from_slice(body).map_err(|e| ProxyError::MalformedRequest(e.to_string()))?;

        let route = self.inner.router.route(&request.model);
        tracing::info!(
            model = %request.model,
            base_model = %route.base_model,
            effort = route.effort,
            endpoint = %route.endpoint,
            stream = request.is_stream(),
            "relaying chat completion"
        );

        let sanitized = request.map_messages(|messages| self.inner.sanitizer.sanitize(messages));
        let prepared = engine::prepare(sanitized, &route);

        let token = self.inner.tokens.token().await?;

        self.inner.engine.dispatch(&prepared, &route.endpoint, &token).await
    }
}
