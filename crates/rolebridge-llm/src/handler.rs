//! Axum route handlers for the OpenAI-compatible chat endpoint

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use rolebridge_core::HttpError;

use crate::error::ProxyError;
use crate::state::RelayState;

/// Build the relay router
pub fn llm_router(state: RelayState) -> Router {
    Router::new()
        .route("/v1/chat/completions", routing::post(chat_completions))
        .route("/chat/completions", routing::post(chat_completions))
        .with_state(state)
}

/// Handle `POST /v1/chat/completions`
///
/// The body is taken as raw bytes so a malformed payload is reported with
/// the parser's message instead of axum's extractor rejection.
async fn chat_completions(State(state): State<RelayState>, body: Bytes) -> Response {
    match state.relay(&body).await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => error_response(e),
    }
}

/// Convert a relay error to an `OpenAI`-style JSON error response
#[allow(clippy::needless_pass_by_value)]
fn error_response(error: ProxyError) -> Response {
    tracing::error!(error = %error, status = error.status_code().as_u16(), "chat completion failed");
    (error.status_code(), Json(error.to_json_body())).into_response()
}
