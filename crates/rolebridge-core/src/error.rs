use http::StatusCode;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The server layer
/// converts these into actual HTTP responses, keeping domain errors
/// decoupled from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `credential_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;

    /// OpenAI-style JSON error body for this error
    fn to_json_body(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "message": self.client_message(),
                "type": self.error_type(),
                "code": serde_json::Value::Null,
            }
        })
    }
}
