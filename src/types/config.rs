//! Configuration structures.
//!
//! Configuration is resolved once at process start (environment variables,
//! optionally overridden by CLI flags) and passed down explicitly. Nothing
//! below `main` reads the environment.

use std::fmt;
use std::time::Duration;

/// Default upstream base URL.
pub const DEFAULT_API_URL: &str = "https://patternstack.ai";

pub const ENV_API_KEY: &str = "PATTERNSTACK_API_KEY";
pub const ENV_API_URL: &str = "PATTERNSTACK_API_URL";
pub const ENV_USER_ID: &str = "PATTERNSTACK_USER_ID";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "PATTERNSTACK_CONNECT_TIMEOUT_MS";
pub const ENV_LOG_FORMAT: &str = "PATTERNSTACK_LOG_FORMAT";

/// Bearer credential. `Debug` and `Display` never print the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key. Blank input yields `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw value, for building the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Global adapter configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Upstream API configuration.
    pub upstream: UpstreamConfig,

    /// Observability configuration.
    pub observability: ObservabilityConfig,

    /// MCP server configuration.
    pub server: ServerConfig,
}

impl Config {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.upstream.api_key = lookup(ENV_API_KEY).and_then(ApiKey::new);
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config.upstream.set_base_url(&url);
        }
        config.upstream.user_id = lookup(ENV_USER_ID)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if let Some(ms) =
            lookup(ENV_CONNECT_TIMEOUT_MS).and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.upstream.connect_timeout = Duration::from_millis(ms);
        }
        config.observability.json_logs = lookup(ENV_LOG_FORMAT)
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        config
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL, without trailing slash.
    pub base_url: String,

    /// Bearer credential. Absence fails every tool call.
    pub api_key: Option<ApiKey>,

    /// Optional workspace user id, sent as `x-clerk-user-id`.
    pub user_id: Option<String>,

    /// TCP connect timeout. Total deadlines come from the tool registry.
    pub connect_timeout: Duration,
}

impl UpstreamConfig {
    pub fn set_base_url(&mut self, url: &str) {
        self.base_url = url.trim().trim_end_matches('/').to_string();
    }

    /// Full URL of the tool-call endpoint.
    pub fn tools_call_url(&self) -> String {
        format!("{}/api/mcp/tools/call", self.base_url)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            user_id: None,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    /// Enable JSON log formatting.
    pub json_logs: bool,
}

/// MCP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum concurrently executing requests.
    pub max_in_flight: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { max_in_flight: 16 }
    }
}
