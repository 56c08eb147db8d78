//! Chat completion relay for rolebridge
//!
//! Rewrites OpenAI-style chat requests into a history the backend accepts
//! (role-flipped tool calls, wrapped tool results, flattened content), routes
//! them by model name and relays the backend's event stream untouched.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod backend;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod handler;
pub mod routing;
pub mod sanitize;
pub mod state;

pub use backend::{BackendClient, BackendError, BackendRequest, BackendResponse, ByteStream, ReqwestBackend};
pub use credentials::{CommandTokenProvider, CredentialError, StaticTokenProvider, TokenProvider};
pub use engine::{DispatchPhase, Outcome, StreamingProxyEngine};
pub use error::ProxyError;
pub use handler::llm_router;
pub use routing::{ModelRouter, Route};
pub use sanitize::MessageSanitizer;
pub use state::RelayState;
