//! Outbound transport to the model backend

use std::pin::Pin;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt, TryStreamExt};
use http::{HeaderMap, Method, StatusCode};
use rolebridge_config::BackendConfig;
use thiserror::Error;
use url::Url;

/// Lazily consumed response body
///
/// Holding the stream holds the connection; dropping it releases it.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BackendError>> + Send>>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("could not connect to backend: {0}")]
    Connect(String),

    #[error("backend request timed out")]
    Timeout,

    #[error("backend request failed: {0}")]
    Request(String),

    #[error("backend stream failed: {0}")]
    Body(String),
}

impl BackendError {
    fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Body(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// A fully built outbound request
#[derive(Debug)]
pub struct BackendRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Status and headers of a backend response, with its body still on the wire
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl std::fmt::Debug for BackendResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl BackendResponse {
    /// Read the remaining body into memory, releasing the connection afterwards
    pub async fn collect(self) -> Result<Bytes, BackendError> {
        let body = self
            .body
            .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await?;

        Ok(body.freeze())
    }

    /// Give the connection back without reading the rest of the body
    pub fn release(self) {
        drop(self.body);
    }
}

/// Capability to send a request to the backend
///
/// Implementations own a connection pool that is shared by every request.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Send a request and return as soon as response headers arrive
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError>;
}

/// `reqwest` transport with a bounded keep-alive pool
#[derive(Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build the shared client from configured timeouts and pool limits
    ///
    /// # Errors
    ///
    /// Returns an error if a duration is invalid or the TLS backend fails to initialize
    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout()?)
            .timeout(config.request_timeout()?)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout()?)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build backend HTTP client: {e}"))?;

        Ok(Self::new(client))
    }
}

#[async_trait]
impl BackendClient for ReqwestBackend {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| BackendError::from_reqwest(&e)))
            .boxed();

        Ok(BackendResponse { status, headers, body })
    }
}
