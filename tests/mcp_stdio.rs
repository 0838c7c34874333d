//! End-to-end tests: MCP server over an in-memory pipe, fake upstream over HTTP.

mod common;

use common::{start_upstream, FakeUpstream};
use patternstack_mcp::mcp::{McpHandler, McpServer};
use patternstack_mcp::types::{ApiKey, Config, INVALID_PARAMS};
use serde_json::{json, Value};
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const KEY: &str = "ps_live_secret_42";

struct Client {
    writer: WriteHalf<DuplexStream>,
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    next_id: u64,
    server: JoinHandle<std::io::Result<()>>,
}

impl Client {
    async fn send_raw(&mut self, message: &Value) {
        let mut line = message.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = self.lines.next_line().await.unwrap().expect("server closed output");
        serde_json::from_str(&line).unwrap()
    }

    async fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        self.send_raw(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        let response = self.recv().await;
        assert_eq!(response["id"], json!(id));
        response
    }

    async fn call(&mut self, tool: &str, arguments: Value) -> Value {
        self.request("tools/call", json!({"name": tool, "arguments": arguments}))
            .await
    }
}

async fn connect(api_key: Option<&str>) -> (Client, FakeUpstream) {
    let (base_url, upstream) = start_upstream().await;

    let mut config = Config::default();
    config.upstream.set_base_url(&base_url);
    config.upstream.api_key = api_key.and_then(ApiKey::new);

    let cancel = CancellationToken::new();
    let handler = McpHandler::from_config(&config, cancel.clone()).unwrap();
    let server = McpServer::new(handler, config.server.clone(), cancel);

    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    let server = tokio::spawn(async move {
        server
            .serve(BufReader::new(server_read), server_write)
            .await
    });

    let (client_read, client_write) = tokio::io::split(client_io);
    let client = Client {
        writer: client_write,
        lines: BufReader::new(client_read).lines(),
        next_id: 0,
        server,
    };
    (client, upstream)
}

fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_initialize_handshake() {
    let (mut client, _upstream) = connect(Some(KEY)).await;
    let response = client.request("initialize", json!({})).await;

    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "patternstack-mcp");
    assert!(response["result"]["capabilities"]["tools"].is_object());
    assert!(response["result"]["capabilities"]["resources"].is_object());
}

#[tokio::test]
async fn test_tools_list_hides_hidden_tools() {
    let (mut client, _upstream) = connect(Some(KEY)).await;
    let response = client.request("tools/list", json!({})).await;

    let names: Vec<&str> = response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 10);
    assert!(names.contains(&"dependency.health"));
    assert!(!names.contains(&"migration.plan"));

    for tool in response["result"]["tools"].as_array().unwrap() {
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert!(tool["description"].as_str().is_some_and(|d| !d.is_empty()));
    }
}

#[tokio::test]
async fn test_successful_call_is_rendered() {
    let (mut client, upstream) = connect(Some(KEY)).await;
    let response = client
        .call("dependency.health", json!({"package": "serde", "ecosystem": "crates"}))
        .await;

    assert!(response["result"].get("isError").is_none());
    let text = text_of(&response);
    assert!(text.starts_with("# Health:"), "{text}");
    assert!(text.contains("Health score: 97% (healthy)"), "{text}");
    assert!(text.contains("## Guidance"), "{text}");
    assert_eq!(upstream.hits(), 1);
}

#[tokio::test]
async fn test_schema_violation_is_rejected_locally() {
    let (mut client, upstream) = connect(Some(KEY)).await;
    let response = client
        .call("dependency.health", json!({"package": "serde", "ecosystem": "cpan"}))
        .await;

    assert_eq!(response["error"]["code"], json!(INVALID_PARAMS));
    assert_eq!(upstream.hits(), 0);

    let response = client
        .call("dependency.health", json!({"package": "serde", "ecosystem": "npm", "extra": 1}))
        .await;
    assert_eq!(response["error"]["code"], json!(INVALID_PARAMS));
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_unknown_tool_is_error_result() {
    let (mut client, upstream) = connect(Some(KEY)).await;
    let response = client.call("dependency.teleport", json!({})).await;

    assert_eq!(response["result"]["isError"], true);
    assert_eq!(text_of(&response), "Error: Unknown tool: dependency.teleport");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_missing_api_key_never_contacts_upstream() {
    let (mut client, upstream) = connect(None).await;
    let response = client
        .call("dependency.health", json!({"package": "serde", "ecosystem": "crates"}))
        .await;

    assert_eq!(response["result"]["isError"], true);
    let text = text_of(&response);
    assert!(text.contains("PATTERNSTACK_API_KEY"), "{text}");
    assert!(text.contains("https://patternstack.ai/settings/api-keys"), "{text}");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_upstream_failures_become_error_results() {
    let (mut client, _upstream) = connect(Some(KEY)).await;

    let response = client.call("stack.defaults", json!({"framework": "cobol-on-cogs"})).await;
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(text_of(&response), "Error: Framework not supported: cobol-on-cogs");

    let response = client
        .call("signals.evaluate", json!({"signals": {"buildPassed": true}}))
        .await;
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(text_of(&response), "Error: HTTP 503 Service Unavailable");
}

#[tokio::test]
async fn test_hidden_tool_is_still_callable() {
    let (mut client, upstream) = connect(Some(KEY)).await;
    let response = client
        .call("migration.plan", json!({"from": "moment", "to": "date-fns", "ecosystem": "npm"}))
        .await;

    assert!(response["result"].get("isError").is_none(), "{response}");
    assert!(text_of(&response).contains("Swap imports"));
    assert_eq!(upstream.hits(), 1);
    assert_eq!(upstream.last().unwrap().body["tool"], "migration.plan");
}

#[tokio::test]
async fn test_resources_roundtrip() {
    let (mut client, _upstream) = connect(Some(KEY)).await;

    let listed = client.request("resources/list", json!({})).await;
    let uris: Vec<&str> = listed["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();
    assert_eq!(
        uris,
        vec![
            "patternstack://docs/overview",
            "patternstack://docs/tools",
            "patternstack://config",
        ]
    );

    let config = client
        .request("resources/read", json!({"uri": "patternstack://config"}))
        .await;
    let contents = &config["result"]["contents"][0];
    assert_eq!(contents["uri"], "patternstack://config");
    assert_eq!(contents["mimeType"], "text/markdown");
    let text = contents["text"].as_str().unwrap();
    assert!(text.contains("configured"));
    assert!(!text.contains(KEY));

    let missing = client
        .request("resources/read", json!({"uri": "patternstack://nope"}))
        .await;
    assert!(missing["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unknown resource: patternstack://nope"));
}

#[tokio::test]
async fn test_protocol_errors() {
    let (mut client, _upstream) = connect(Some(KEY)).await;

    let response = client.request("tools/teleport", json!({})).await;
    assert_eq!(response["error"]["code"], -32601);

    client.writer.write_all(b"{not json\n").await.unwrap();
    let response = client.recv().await;
    assert_eq!(response["error"]["code"], -32700);
    assert_eq!(response["id"], Value::Null);
}

#[tokio::test]
async fn test_notifications_get_no_response() {
    let (mut client, _upstream) = connect(Some(KEY)).await;

    client
        .send_raw(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;
    // The next line on the wire must be the ping response, not anything for the notification.
    let response = client.request("ping", json!({})).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_eof_drains_in_flight_requests() {
    let (mut client, _upstream) = connect(Some(KEY)).await;

    client
        .send_raw(&json!({
            "jsonrpc": "2.0",
            "id": "last",
            "method": "tools/call",
            "params": {
                "name": "dependency.health",
                "arguments": {"package": "serde", "ecosystem": "crates"},
            },
        }))
        .await;
    client.writer.shutdown().await.unwrap();

    let response = client.recv().await;
    assert_eq!(response["id"], "last");
    assert!(text_of(&response).contains("Health score"));

    assert!(client.lines.next_line().await.unwrap().is_none());
    client.server.await.unwrap().unwrap();
}
