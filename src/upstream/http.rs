//! reqwest-backed transport.

use crate::types::{Error, Result, UpstreamConfig};
use crate::upstream::wire::{self, ToolCallBody};
use crate::upstream::{ToolTransport, UpstreamRequest, USER_ID_HEADER};
use async_trait::async_trait;
use serde_json::Value;

/// HTTP transport to the PatternStack API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("patternstack-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.tools_call_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ToolTransport for HttpTransport {
    async fn call_tool(&self, request: UpstreamRequest) -> Result<Value> {
        let body = ToolCallBody {
            tool: &request.tool,
            input: &request.input,
        };

        let mut builder = self
            .http
            .post(&self.endpoint)
            .bearer_auth(request.api_key.expose())
            .json(&body);
        if let Some(user_id) = &request.user_id {
            builder = builder.header(USER_ID_HEADER, user_id);
        }

        let response = builder
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(transport_error)?;

        tracing::debug!(
            tool = %request.tool,
            status = status.as_u16(),
            bytes = bytes.len(),
            "PatternStack API responded"
        );

        if !status.is_success() {
            return Err(wire::classify_failure(status, &bytes));
        }

        wire::unwrap_success(&bytes)
    }
}

/// Render a reqwest error with its full source chain.
fn transport_error(err: reqwest::Error) -> Error {
    let err = err.without_url();
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    Error::transport(message)
}
