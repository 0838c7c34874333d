//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Every
//! message renders on a single line and never carries the API key.

use std::time::Duration;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Where to obtain an API key, surfaced in the missing-credential message.
pub const API_KEY_URL: &str = "https://patternstack.ai/settings/api-keys";

/// Guidance returned when a workspace-scoped key is used without a user id.
pub const WORKSPACE_KEY_GUIDANCE: &str = concat!(
    "This API key is scoped to a workspace and requires a user identity. ",
    "Set PATTERNSTACK_USER_ID so requests carry the x-clerk-user-id header."
);

/// Main error enum for the adapter.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool name absent from the registry. No upstream call is made.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Required configuration (the API key) is missing.
    #[error("{0}")]
    NotConfigured(String),

    /// Tool arguments rejected by the input schema.
    #[error("invalid arguments: {0}")]
    InvalidParams(String),

    /// Upstream did not answer within the tool's deadline.
    #[error("{tool} timed out after {}ms waiting for the PatternStack API", .after.as_millis())]
    Timeout { tool: String, after: Duration },

    /// Network-level failure reaching upstream.
    #[error("Failed to reach PatternStack API: {0}")]
    Transport(String),

    /// Upstream answered with a non-2xx status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Upstream answered 2xx but flagged `success: false`.
    #[error("{0}")]
    ToolFailed(String),

    /// Resource URI outside the static catalog.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Invocation aborted by server shutdown.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),
}

// JSON-RPC 2.0 error codes.
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

impl Error {
    /// Convert to a JSON-RPC error code.
    pub fn to_rpc_code(&self) -> i64 {
        match self {
            Error::UnknownTool(_) | Error::InvalidParams(_) | Error::UnknownResource(_) => {
                INVALID_PARAMS
            }
            _ => INTERNAL_ERROR,
        }
    }

    /// Whether the failure happened before any network attempt.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::UnknownTool(_) | Error::NotConfigured(_) | Error::InvalidParams(_)
        )
    }
}

// Convenience constructors
impl Error {
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    pub fn missing_api_key() -> Self {
        Self::NotConfigured(format!(
            "PATTERNSTACK_API_KEY is not configured. \
             Get an API key at {API_KEY_URL} and export it as PATTERNSTACK_API_KEY."
        ))
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(single_line(&msg.into()))
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(single_line(&msg.into()))
    }

    pub fn upstream(status: u16, msg: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: single_line(&msg.into()),
        }
    }

    pub fn tool_failed(msg: impl Into<String>) -> Self {
        Self::ToolFailed(single_line(&msg.into()))
    }

    pub fn unknown_resource(uri: impl Into<String>) -> Self {
        Self::UnknownResource(uri.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
