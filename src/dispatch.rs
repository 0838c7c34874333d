//! Tool dispatcher — registry lookup, credential check, deadline-bounded
//! upstream call, and conversion of every failure into an error result.
//!
//! ```text
//!  call(name, input)
//!     │
//!     ├─ name not in registry ──────────► Unknown tool        (no network)
//!     ├─ api key absent ────────────────► Not configured      (no network)
//!     └─ POST /api/mcp/tools/call ──┬───► result ──► format ──► text
//!          (deadline = tool timeout) ├───► timeout / transport error
//!                                    └───► upstream rejection
//! ```

use crate::format;
use crate::tools::ToolRegistry;
use crate::types::{Error, Result, UpstreamConfig};
use crate::upstream::{ToolTransport, UpstreamRequest};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Text returned to the protocol layer for one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(err: &Error) -> Self {
        Self {
            text: format!("Error: {err}"),
            is_error: true,
        }
    }

    /// MCP `tools/call` result: `{content: [{type, text}], isError?}`.
    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "content": [{ "type": "text", "text": self.text }],
        });
        if self.is_error {
            value["isError"] = Value::Bool(true);
        }
        value
    }
}

/// Binds the registry to an upstream transport.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    transport: Arc<dyn ToolTransport>,
    upstream: UpstreamConfig,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        transport: Arc<dyn ToolTransport>,
        upstream: UpstreamConfig,
    ) -> Self {
        Self {
            registry,
            transport,
            upstream,
            shutdown: CancellationToken::new(),
        }
    }

    /// Abort in-flight calls when `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Invoke a tool and render its result. Never fails: errors become
    /// `is_error` output.
    pub async fn call(&self, tool: &str, input: Value) -> ToolOutput {
        match self.invoke(tool, input).await {
            Ok(result) => ToolOutput::success(format::render(tool, &result)),
            Err(err) => {
                if err.is_precondition() {
                    tracing::info!(tool, error = %err, "Tool call rejected before dispatch");
                }
                ToolOutput::error(&err)
            }
        }
    }

    /// Invoke a tool and return the upstream `result` payload unchanged.
    pub async fn invoke(&self, tool: &str, input: Value) -> Result<Value> {
        let descriptor = self
            .registry
            .descriptor(tool)
            .ok_or_else(|| Error::unknown_tool(tool))?;
        let api_key = self
            .upstream
            .api_key
            .clone()
            .ok_or_else(Error::missing_api_key)?;

        let invocation_id = Uuid::new_v4();
        let timeout = descriptor.timeout();
        let request = UpstreamRequest {
            tool: descriptor.name.to_string(),
            input,
            api_key,
            user_id: self.upstream.user_id.clone(),
        };

        tracing::info!(
            tool = descriptor.name,
            %invocation_id,
            timeout_ms = descriptor.timeout_ms,
            has_user_id = request.user_id.is_some(),
            "Invoking tool"
        );
        let started = Instant::now();

        // The deadline timer and the in-flight request are both dropped on
        // every exit from this select.
        let outcome = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                Err(Error::cancelled(format!("{} aborted by shutdown", descriptor.name)))
            }
            result = tokio::time::timeout(timeout, self.transport.call_tool(request)) => {
                result.unwrap_or_else(|_| Err(Error::Timeout {
                    tool: descriptor.name.to_string(),
                    after: timeout,
                }))
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(_) => tracing::info!(
                tool = descriptor.name,
                %invocation_id,
                elapsed_ms,
                "Tool succeeded"
            ),
            Err(err) => tracing::warn!(
                tool = descriptor.name,
                %invocation_id,
                elapsed_ms,
                error = %err,
                "Tool failed"
            ),
        }

        outcome
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.registry.len())
            .field("upstream", &self.upstream)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
