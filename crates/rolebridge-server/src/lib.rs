//! HTTP server assembly for rolebridge

use std::net::SocketAddr;

use axum::Router;
use rolebridge_config::Config;
use rolebridge_llm::RelayState;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the relay state (endpoints, HTTP client or
    /// credential source) cannot be built
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let state = RelayState::from_config(config)?;
        Ok(Self::with_state(config, state))
    }

    /// Build the server around an already constructed relay state
    #[must_use]
    pub fn with_state(config: &Config, state: RelayState) -> Self {
        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health));
        }

        app = app.merge(rolebridge_llm::llm_router(state));
        app = app.layer(TraceLayer::new_for_http());

        Self {
            router: app,
            listen_address: config.server.listen_address(),
        }
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve until `shutdown` is cancelled
    ///
    /// In-flight streams are allowed to finish before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use rolebridge_config::Config;
    use tower::ServiceExt;

    use super::*;

    fn config(toml: &str) -> Config {
        Config::from_toml(toml).unwrap()
    }

    const BASE: &str = r#"
        [backend]
        project = "demo"

        [credentials]
        access_token = "token"
    "#;

    #[tokio::test]
    async fn health_route_answers_ok() {
        let router = Server::new(&config(BASE)).unwrap().into_router();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn health_route_can_be_disabled() {
        let toml = format!("{BASE}\n[server.health]\nenabled = false\n");
        let router = Server::new(&config(&toml)).unwrap().into_router();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_path_is_configurable() {
        let toml = format!("{BASE}\n[server.health]\npath = \"/healthz\"\n");
        let router = Server::new(&config(&toml)).unwrap().into_router();
        let response = router
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn listen_address_defaults_to_loopback() {
        let server = Server::new(&config(BASE)).unwrap();
        assert_eq!(server.listen_address().to_string(), "127.0.0.1:8000");
    }
}
