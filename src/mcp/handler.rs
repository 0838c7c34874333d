//! MCP method router — maps JSON-RPC methods onto the dispatcher and the
//! resource catalog.

use crate::dispatch::Dispatcher;
use crate::mcp::protocol::{
    JsonRpcRequest, JsonRpcResponse, RpcError, JSONRPC_VERSION, PROTOCOL_VERSION,
};
use crate::resources::ResourceCatalog;
use crate::tools::ToolRegistry;
use crate::types::{Config, Error, Result, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
use crate::upstream::HttpTransport;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const SERVER_NAME: &str = "patternstack-mcp";

/// Stateless request handler shared by all in-flight requests.
#[derive(Debug)]
pub struct McpHandler {
    dispatcher: Dispatcher,
    resources: ResourceCatalog,
}

impl McpHandler {
    pub fn new(dispatcher: Dispatcher, resources: ResourceCatalog) -> Self {
        Self {
            dispatcher,
            resources,
        }
    }

    /// Wire the production stack: registry, HTTP transport, dispatcher, resources.
    pub fn from_config(config: &Config, shutdown: CancellationToken) -> Result<Self> {
        let registry = Arc::new(ToolRegistry::new()?);
        let transport = Arc::new(HttpTransport::new(&config.upstream)?);
        tracing::info!(
            endpoint = transport.endpoint(),
            api_key_configured = config.upstream.has_api_key(),
            tools = registry.len(),
            "PatternStack MCP handler ready"
        );

        let dispatcher = Dispatcher::new(registry.clone(), transport, config.upstream.clone())
            .with_shutdown(shutdown);
        let resources = ResourceCatalog::new(registry, config.upstream.clone());
        Ok(Self::new(dispatcher, resources))
    }

    /// Handle one raw message. Returns `None` when no response is due.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    RpcError::new(PARSE_ERROR, format!("Parse error: {e}")),
                ))
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    RpcError::new(INVALID_REQUEST, format!("Invalid request: {e}")),
                ))
            }
        };

        self.handle(request).await
    }

    /// Handle a decoded request.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc.as_deref() != Some(JSONRPC_VERSION) {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                RpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\""),
            ));
        }

        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);
        let result = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params).await,
            "resources/list" => Ok(self.list_resources()),
            "resources/read" => self.read_resource(&request.params),
            other => {
                return Some(JsonRpcResponse::error(
                    id,
                    RpcError::new(METHOD_NOT_FOUND, format!("Method not found: {other}")),
                ))
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => JsonRpcResponse::error(id, err.into()),
        })
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false },
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .dispatcher
            .registry()
            .list_visible()
            .iter()
            .map(|e| e.to_listing())
            .collect();
        json!({ "tools": tools })
    }

    /// Unknown tools and upstream failures come back as `isError` results;
    /// schema violations are protocol errors and never reach the dispatcher.
    async fn call_tool(&self, params: Value) -> Result<Value> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_params("Missing required field: name"))?;
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(args) => args.clone(),
        };

        if let Some(entry) = self.dispatcher.registry().get(name) {
            let violations = entry.validate_input(&arguments);
            if !violations.is_empty() {
                tracing::debug!(tool = name, ?violations, "Rejected tool arguments");
                return Err(Error::invalid_params(format!(
                    "{name}: {}",
                    violations.join("; ")
                )));
            }
        }

        Ok(self.dispatcher.call(name, arguments).await.to_value())
    }

    fn list_resources(&self) -> Value {
        json!({ "resources": self.resources.list() })
    }

    fn read_resource(&self, params: &Value) -> Result<Value> {
        let uri = params
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_params("Missing required field: uri"))?;
        self.resources.read_contents(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{UpstreamConfig, INVALID_PARAMS};
    use crate::upstream::MockToolTransport;

    fn handler(mock: MockToolTransport) -> McpHandler {
        let registry = Arc::new(ToolRegistry::new().unwrap());
        let upstream = UpstreamConfig {
            api_key: crate::types::ApiKey::new("ps_test"),
            ..UpstreamConfig::default()
        };
        let dispatcher = Dispatcher::new(registry.clone(), Arc::new(mock), upstream.clone());
        McpHandler::new(dispatcher, ResourceCatalog::new(registry, upstream))
    }

    async fn send(h: &McpHandler, msg: Value) -> JsonRpcResponse {
        h.handle_message(&msg.to_string()).await.unwrap()
    }

    #[tokio::test]
    async fn test_schema_violation_never_reaches_transport() {
        let mut mock = MockToolTransport::new();
        mock.expect_call_tool().times(0);
        let h = handler(mock);

        let resp = send(
            &h,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {
                    "name": "dependency.health",
                    "arguments": {"package": "x", "ecosystem": "cpan"},
                },
            }),
        )
        .await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("dependency.health"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let mut mock = MockToolTransport::new();
        mock.expect_call_tool().times(0);
        let h = handler(mock);

        let resp = send(
            &h,
            json!({
                "jsonrpc": "2.0",
                "id": "a",
                "method": "tools/call",
                "params": {"name": "nope.tool"},
            }),
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        assert_eq!(result["content"][0]["text"], "Error: Unknown tool: nope.tool");
    }

    #[tokio::test]
    async fn test_missing_name_is_invalid_params() {
        let h = handler(MockToolTransport::new());
        let resp = send(
            &h,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {}}),
        )
        .await;
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let h = handler(MockToolTransport::new());

        let resp = h.handle_message("{not json").await.unwrap();
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);

        let resp = send(&h, json!({"jsonrpc": "1.0", "id": 3, "method": "ping"})).await;
        assert_eq!(resp.id, json!(3));
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);

        let resp = send(&h, json!({"jsonrpc": "2.0", "id": 4, "method": "prompts/list"})).await;
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);

        let resp = send(&h, json!({"jsonrpc": "2.0", "id": 5})).await;
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let h = handler(MockToolTransport::new());
        let msg = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert!(h.handle_message(&msg.to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_null_id_gets_a_response() {
        let h = handler(MockToolTransport::new());
        let resp = send(&h, json!({"jsonrpc": "2.0", "id": null, "method": "ping"})).await;
        assert_eq!(resp.id, Value::Null);
        assert_eq!(resp.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_notification_method_with_id_is_answered() {
        let h = handler(MockToolTransport::new());
        let resp = send(
            &h,
            json!({"jsonrpc": "2.0", "id": 4, "method": "notifications/initialized"}),
        )
        .await;
        assert_eq!(resp.id, json!(4));
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_initialize_and_ping() {
        let h = handler(MockToolTransport::new());
        let resp = send(
            &h,
            json!({"jsonrpc": "2.0", "id": 0, "method": "initialize", "params": {}}),
        )
        .await;
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);

        let resp = send(&h, json!({"jsonrpc": "2.0", "id": 9, "method": "ping"})).await;
        assert_eq!(resp.result.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_unknown_resource_is_protocol_error() {
        let h = handler(MockToolTransport::new());
        let resp = send(
            &h,
            json!({
                "jsonrpc": "2.0",
                "id": 6,
                "method": "resources/read",
                "params": {"uri": "patternstack://secret"},
            }),
        )
        .await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(err.message, "Unknown resource: patternstack://secret");
    }
}
