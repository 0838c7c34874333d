//! PatternStack MCP server - main entry point.
//!
//! Speaks MCP over stdio. Configuration comes from the environment
//! (`PATTERNSTACK_*`), with flags taking precedence.

use clap::Parser;
use patternstack_mcp::mcp::{McpHandler, McpServer};
use patternstack_mcp::types::ApiKey;
use patternstack_mcp::Config;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "patternstack-mcp", version, about = "PatternStack MCP server (stdio)")]
struct Cli {
    /// PatternStack API key.
    #[arg(long, env = "PATTERNSTACK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// PatternStack API base URL.
    #[arg(long, env = "PATTERNSTACK_API_URL")]
    api_url: Option<String>,

    /// User id for workspace-scoped keys (sent as x-clerk-user-id).
    #[arg(long, env = "PATTERNSTACK_USER_ID")]
    user_id: Option<String>,

    /// Log format: text or json.
    #[arg(long, value_parser = ["text", "json"])]
    log_format: Option<String>,

    /// Maximum concurrently executing requests.
    #[arg(long, default_value_t = 16)]
    max_in_flight: usize,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::from_env();
        if let Some(key) = self.api_key {
            config.upstream.api_key = ApiKey::new(key);
        }
        if let Some(url) = self.api_url.filter(|u| !u.trim().is_empty()) {
            config.upstream.set_base_url(&url);
        }
        if let Some(user_id) = self.user_id {
            config.upstream.user_id = Some(user_id.trim().to_string()).filter(|u| !u.is_empty());
        }
        if let Some(format) = self.log_format {
            config.observability.json_logs = format == "json";
        }
        config.server.max_in_flight = self.max_in_flight;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config();

    // Initialize observability
    patternstack_mcp::observability::init_tracing(&config.observability);

    let cancel = CancellationToken::new();
    let handler = McpHandler::from_config(&config, cancel.clone())?;
    let server = McpServer::new(handler, config.server.clone(), cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received");
            cancel.cancel();
        }
    });

    tracing::info!(
        "🚀 PatternStack MCP {} starting (api_url={})",
        env!("CARGO_PKG_VERSION"),
        config.upstream.base_url
    );
    server.serve_stdio().await?;

    Ok(())
}
