//! Dispatch of sanitized requests and relay of the backend response

mod phase;
mod session;

use std::sync::Arc;

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use rolebridge_core::BackendChatRequest;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

pub use self::phase::DispatchPhase;
pub use self::session::{RelayStream, StreamSession};
use crate::backend::{BackendClient, BackendRequest};
use crate::credentials::CredentialError;
use crate::error::ProxyError;
use crate::routing::Route;

/// What the caller receives for one dispatched request
pub enum Outcome {
    /// Backend answered with status >= 400; relayed verbatim
    Rejected {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: Bytes,
    },
    /// Backend accepted; its body is relayed as it arrives
    Streaming { status: StatusCode, stream: RelayStream },
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { status, body, .. } => f
                .debug_struct("Rejected")
                .field("status", status)
                .field("body_len", &body.len())
                .finish(),
            Self::Streaming { status, stream } => f
                .debug_struct("Streaming")
                .field("status", status)
                .field("session", &stream.session().id())
                .finish(),
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected {
                status,
                content_type,
                body,
            } => {
                let mut response = (status, body).into_response();
                match content_type {
                    Some(content_type) => {
                        response.headers_mut().insert(CONTENT_TYPE, content_type);
                    }
                    None => {
                        response.headers_mut().remove(CONTENT_TYPE);
                    }
                }
                response
            }
            Self::Streaming { status, stream } => (
                status,
                [
                    (CONTENT_TYPE, HeaderValue::from_static("text/event-stream")),
                    (CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                ],
                Body::from_stream(stream),
            )
                .into_response(),
        }
    }
}

/// Rewrite the routed fields of a sanitized request
///
/// The model loses its effort suffix, `reasoning_effort` becomes the suffix
/// hint (or is removed so the backend picks its default), and offered tools
/// get `tool_choice = "auto"` unless the client chose otherwise.
pub fn prepare(mut request: BackendChatRequest, route: &Route) -> BackendChatRequest {
    request.model.clone_from(&route.base_model);
    request.reasoning_effort = route.effort.map(|effort| Value::String(effort.to_owned()));
    request.ensure_tool_choice();
    request
}

/// Sends requests through an injected [`BackendClient`] and relays the result
#[derive(Clone)]
pub struct StreamingProxyEngine {
    client: Arc<dyn BackendClient>,
}

impl StreamingProxyEngine {
    pub fn new(client: Arc<dyn BackendClient>) -> Self {
        Self { client }
    }

    /// Send `request` to `endpoint` and decide how the response is relayed
    ///
    /// The body is always read as a stream so the status can be inspected
    /// before committing to a response mode.
    ///
    /// # Errors
    ///
    /// Fails if the token cannot be used as a header, the backend cannot be
    /// reached, or an error response body cannot be read. Backend statuses
    /// >= 400 are not errors; they come back as [`Outcome::Rejected`].
    pub async fn dispatch(
        &self,
        request: &BackendChatRequest,
        endpoint: &Url,
        token: &SecretString,
    ) -> Result<Outcome, ProxyError> {
        let mut session = StreamSession::new(endpoint.clone());

        let body = serde_json::to_vec(request).map_err(|e| ProxyError::Internal(e.into()))?;
        let outbound = BackendRequest {
            method: Method::POST,
            url: endpoint.clone(),
            headers: outbound_headers(token)?,
            body: Bytes::from(body),
        };

        tracing::debug!(
            session = %session.id(),
            endpoint = %endpoint,
            model = %request.model,
            messages = request.messages.as_ref().map_or(0, Vec::len),
            "dispatching to backend"
        );

        session.advance(DispatchPhase::Sent);
        let response = match self.client.send(outbound).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(session = %session.id(), endpoint = %endpoint, error = %error, "backend request failed");
                session.finish(DispatchPhase::TransportError);
                return Err(error.into());
            }
        };

        session.advance(DispatchPhase::HeadersReceived);
        let status = response.status;
        let content_type = response.headers.get(CONTENT_TYPE).cloned();

        if status.as_u16() >= 400 {
            // Reading to the end hands the connection back to the pool
            return match response.collect().await {
                Ok(body) => {
                    tracing::warn!(
                        session = %session.id(),
                        status = status.as_u16(),
                        body = %String::from_utf8_lossy(&body),
                        "backend rejected request"
                    );
                    session.finish(DispatchPhase::ErrorResponse);
                    Ok(Outcome::Rejected {
                        status,
                        content_type,
                        body,
                    })
                }
                Err(error) => {
                    tracing::error!(
                        session = %session.id(),
                        status = status.as_u16(),
                        error = %error,
                        "failed to read backend error body"
                    );
                    session.finish(DispatchPhase::TransportError);
                    Err(error.into())
                }
            };
        }

        session.attach(response.body);
        Ok(Outcome::Streaming {
            status,
            stream: RelayStream::new(session),
        })
    }
}

fn outbound_headers(token: &SecretString) -> Result<HeaderMap, ProxyError> {
    let mut authorization = HeaderValue::try_from(format!("Bearer {}", token.expose_secret()))
        .map_err(|_| CredentialError::InvalidHeader)?;
    authorization.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, authorization);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}
