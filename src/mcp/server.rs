//! Stdio MCP server: read loop, per-request tasks, single writer.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::mcp::codec::{read_message, write_message};
use crate::mcp::handler::McpHandler;
use crate::mcp::protocol::JsonRpcResponse;
use crate::types::ServerConfig;

/// MCP server wrapping the request handler.
#[derive(Debug)]
pub struct McpServer {
    handler: Arc<McpHandler>,
    config: ServerConfig,
    cancel: CancellationToken,
}

impl McpServer {
    pub fn new(handler: McpHandler, config: ServerConfig, cancel: CancellationToken) -> Self {
        Self {
            handler: Arc::new(handler),
            config,
            cancel,
        }
    }

    /// Serve over the process's stdin/stdout.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        let reader = tokio::io::BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Run until the reader hits EOF or the server is cancelled.
    ///
    /// Requests execute concurrently (up to `max_in_flight`). Responses are
    /// written by one task, so frames never interleave. Requests already in
    /// flight at EOF still get their responses.
    pub async fn serve<R, W>(&self, mut reader: R, writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let max_in_flight = self.config.max_in_flight.max(1);
        let permits = Arc::new(Semaphore::new(max_in_flight));
        let (tx, rx) = mpsc::channel::<JsonRpcResponse>(max_in_flight);
        let writer_task = tokio::spawn(write_responses(writer, rx));
        let mut tasks = JoinSet::new();

        tracing::info!(max_in_flight, "MCP server listening on stdio");

        loop {
            let line = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("MCP server shutting down");
                    break;
                }
                read = read_message(&mut reader) => match read? {
                    Some(line) => line,
                    None => {
                        tracing::info!("Input closed, draining in-flight requests");
                        break;
                    }
                },
            };

            // Backpressure: stop reading while max_in_flight requests run.
            let permit = tokio::select! {
                _ = self.cancel.cancelled() => break,
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let handler = self.handler.clone();
            let tx = tx.clone();
            tasks.spawn(async move {
                let _permit = permit;
                if let Some(response) = handler.handle_message(&line).await {
                    if tx.send(response).await.is_err() {
                        tracing::warn!("Response dropped: writer closed");
                    }
                }
            });

            while let Some(joined) = tasks.try_join_next() {
                log_join(joined);
            }
        }

        drop(tx);
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        writer_task
            .await
            .map_err(|e| std::io::Error::other(format!("writer task failed: {e}")))?
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

async fn write_responses<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut rx: mpsc::Receiver<JsonRpcResponse>,
) -> std::io::Result<()> {
    while let Some(response) = rx.recv().await {
        write_message(&mut writer, &response).await?;
    }
    Ok(())
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!("Request task failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::resources::ResourceCatalog;
    use crate::tools::ToolRegistry;
    use crate::types::{ApiKey, Result, UpstreamConfig};
    use crate::upstream::{ToolTransport, UpstreamRequest};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    /// `stack.recommend` takes ten seconds; everything else answers at once.
    #[derive(Debug)]
    struct SlowRecommend;

    #[async_trait]
    impl ToolTransport for SlowRecommend {
        async fn call_tool(&self, request: UpstreamRequest) -> Result<Value> {
            if request.tool == "stack.recommend" {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
            Ok(json!({}))
        }
    }

    fn server(cancel: CancellationToken) -> McpServer {
        let registry = Arc::new(ToolRegistry::new().unwrap());
        let upstream = UpstreamConfig {
            api_key: ApiKey::new("ps_test"),
            ..UpstreamConfig::default()
        };
        let dispatcher =
            Dispatcher::new(registry.clone(), Arc::new(SlowRecommend), upstream.clone())
                .with_shutdown(cancel.clone());
        let handler = McpHandler::new(dispatcher, ResourceCatalog::new(registry, upstream));
        McpServer::new(handler, ServerConfig::default(), cancel)
    }

    type ClientRead = tokio::io::ReadHalf<tokio::io::DuplexStream>;
    type ClientWrite = tokio::io::WriteHalf<tokio::io::DuplexStream>;
    type ClientLines = tokio::io::Lines<BufReader<ClientRead>>;
    type Serving = tokio::task::JoinHandle<std::io::Result<()>>;

    fn spawn_serving(server: &Arc<McpServer>) -> (Serving, ClientLines, ClientWrite) {
        let (client, server_io) = tokio::io::duplex(16 * 1024);
        let (server_read, server_write) = tokio::io::split(server_io);
        let server = server.clone();
        let running = tokio::spawn(async move {
            server
                .serve(BufReader::new(server_read), server_write)
                .await
        });

        let (client_read, client_write) = tokio::io::split(client);
        (running, BufReader::new(client_read).lines(), client_write)
    }

    async fn next_json(lines: &mut ClientLines) -> Value {
        let line = lines.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_does_not_block_others() {
        let server = Arc::new(server(CancellationToken::new()));
        let (running, mut lines, mut client_write) = spawn_serving(&server);
        let slow = json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": {"name": "stack.recommend", "arguments": {"description": "blog"}}});
        let ping = json!({"jsonrpc": "2.0", "id": 2, "method": "ping"});
        client_write
            .write_all(format!("{slow}\n{ping}\n").as_bytes())
            .await
            .unwrap();

        assert_eq!(next_json(&mut lines).await["id"], 2);
        assert_eq!(next_json(&mut lines).await["id"], 1);

        client_write.shutdown().await.unwrap();
        running.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_serving_and_aborts_calls() {
        let cancel = CancellationToken::new();
        let server = Arc::new(server(cancel.clone()));
        let (running, mut lines, mut client_write) = spawn_serving(&server);
        let slow = json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call",
            "params": {"name": "stack.recommend", "arguments": {"description": "blog"}}});
        client_write.write_all(format!("{slow}\n").as_bytes()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        server.shutdown();

        // Input is still open; the loop exits on cancellation alone.
        running.await.unwrap().unwrap();

        let response = next_json(&mut lines).await;
        assert_eq!(response["id"], 7);
        assert_eq!(response["result"]["isError"], true);
        assert!(response["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("aborted by shutdown"));
    }
}
