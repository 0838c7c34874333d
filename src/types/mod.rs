//! Core types for the adapter.
//!
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Explicitly constructed process configuration

mod config;
mod errors;

pub use config::{
    ApiKey, Config, ObservabilityConfig, ServerConfig, UpstreamConfig, DEFAULT_API_URL,
    ENV_API_KEY, ENV_API_URL, ENV_CONNECT_TIMEOUT_MS, ENV_LOG_FORMAT, ENV_USER_ID,
};
pub use errors::{
    single_line, Error, Result, API_KEY_URL, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR, WORKSPACE_KEY_GUIDANCE,
};
