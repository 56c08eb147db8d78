//! Shared data model for the rolebridge proxy
//!
//! Wire-level chat types read from clients and written to the backend, plus
//! the [`HttpError`] trait feature crates use to describe their failures.

#![allow(clippy::must_use_candidate)]

mod error;
pub mod message;
pub mod request;

pub use error::HttpError;
pub use message::{BackendMessage, ChatMessage, Content, ContentBlock, FunctionCall, Role, ToolCall};
pub use request::{BackendChatRequest, ChatRequest};
