//! Upstream PatternStack API boundary.
//!
//! One operation: `POST {base}/api/mcp/tools/call` with `{tool, input}`.
//! The [`ToolTransport`] trait is the seam the dispatcher calls through, so
//! tests can prove that precondition failures never reach the network.

pub mod http;
pub mod wire;

use crate::types::{ApiKey, Result};
use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpTransport;

/// Header carrying the optional workspace user identity.
pub const USER_ID_HEADER: &str = "x-clerk-user-id";

/// One outbound tool call, with the credentials snapshot it was resolved with.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub tool: String,
    pub input: Value,
    pub api_key: ApiKey,
    pub user_id: Option<String>,
}

/// Executes a tool call against the upstream API.
///
/// Implementations perform exactly one attempt and return the unwrapped
/// `result` payload. Deadlines are imposed by the caller, which drops the
/// future when they expire.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn call_tool(&self, request: UpstreamRequest) -> Result<Value>;
}
