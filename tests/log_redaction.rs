//! The API key must never appear in logs, including on failure paths.

use async_trait::async_trait;
use patternstack_mcp::tools::ToolRegistry;
use patternstack_mcp::types::{ApiKey, UpstreamConfig};
use patternstack_mcp::upstream::{ToolTransport, UpstreamRequest};
use patternstack_mcp::{Dispatcher, Error, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing_test::traced_test;

const KEY: &str = "ps_live_do_not_log_me";

/// Succeeds for `dependency.health`, fails with the key echoed back otherwise.
#[derive(Debug)]
struct EchoingTransport;

#[async_trait]
impl ToolTransport for EchoingTransport {
    async fn call_tool(&self, request: UpstreamRequest) -> Result<Value> {
        tracing::debug!(?request, "fake transport received request");
        if request.tool == "dependency.health" {
            Ok(json!({"health": {"score": 0.5}}))
        } else {
            Err(Error::tool_failed(format!("rejected key {}", request.api_key)))
        }
    }
}

fn dispatcher() -> Dispatcher {
    let upstream = UpstreamConfig {
        api_key: ApiKey::new(KEY),
        user_id: Some("user_1".to_string()),
        ..UpstreamConfig::default()
    };
    Dispatcher::new(
        Arc::new(ToolRegistry::new().unwrap()),
        Arc::new(EchoingTransport),
        upstream,
    )
}

#[traced_test]
#[tokio::test]
async fn test_api_key_is_not_logged() {
    let d = dispatcher();

    let ok = d
        .call("dependency.health", json!({"package": "serde", "ecosystem": "crates"}))
        .await;
    assert!(!ok.is_error);

    let failed = d
        .call("stack.defaults", json!({"framework": "axum"}))
        .await;
    assert!(failed.is_error);
    assert!(!failed.text.contains(KEY));

    assert!(logs_contain("Invoking tool"));
    assert!(logs_contain("Tool failed"));
    assert!(!logs_contain(KEY));
}
