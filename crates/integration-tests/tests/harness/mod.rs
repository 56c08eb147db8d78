//! Shared fixtures; each test binary uses a different subset
#![allow(dead_code)]

pub mod config;
pub mod mock_backend;
pub mod server;
