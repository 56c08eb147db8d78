use http::StatusCode;
use rolebridge_core::HttpError;
use thiserror::Error;

use crate::backend::BackendError;
use crate::credentials::CredentialError;

/// Errors that end a request before any response bytes are committed
///
/// Backend rejections (status >= 400) are not errors here: they are relayed
/// verbatim as an [`Outcome`](crate::engine::Outcome).
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No bearer credential could be produced
    #[error("credential error: {0}")]
    Credentials(#[from] CredentialError),

    /// The inbound body could not be read as a chat request
    #[error("malformed request body: {0}")]
    MalformedRequest(String),

    /// The backend could not be reached or failed before sending headers
    #[error("backend unreachable: {0}")]
    Backend(#[from] BackendError),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HttpError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Credentials(_) | Self::MalformedRequest(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Credentials(_) => "credential_error",
            Self::MalformedRequest(_) => "invalid_request_error",
            Self::Backend(_) => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}
