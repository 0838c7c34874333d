//! Documentation resources generated from the registry and config.
//!
//! Content is regenerated on every read so the configuration snapshot always
//! reflects the running process. No network access.

use crate::tools::{Tier, ToolRegistry};
use crate::types::{
    Error, Result, UpstreamConfig, API_KEY_URL, ENV_API_KEY, ENV_API_URL, ENV_USER_ID,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const OVERVIEW_URI: &str = "patternstack://docs/overview";
pub const TOOLS_URI: &str = "patternstack://docs/tools";
pub const CONFIG_URI: &str = "patternstack://config";

const MARKDOWN: &str = "text/markdown";

/// Listing entry for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

pub const RESOURCES: &[ResourceDescriptor] = &[
    ResourceDescriptor {
        uri: OVERVIEW_URI,
        name: "PatternStack overview",
        description: "Tool namespaces, tier access, and capabilities",
        mime_type: MARKDOWN,
    },
    ResourceDescriptor {
        uri: TOOLS_URI,
        name: "Tool reference",
        description: "Every tool with its weight, timeout, and minimum tier",
        mime_type: MARKDOWN,
    },
    ResourceDescriptor {
        uri: CONFIG_URI,
        name: "Configuration",
        description: "Whether an API key is configured and which API URL is active",
        mime_type: MARKDOWN,
    },
];

/// Read-only documentation catalog.
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    registry: Arc<ToolRegistry>,
    upstream: UpstreamConfig,
}

impl ResourceCatalog {
    pub fn new(registry: Arc<ToolRegistry>, upstream: UpstreamConfig) -> Self {
        Self { registry, upstream }
    }

    pub fn list(&self) -> &'static [ResourceDescriptor] {
        RESOURCES
    }

    /// Generate a document's text.
    pub fn read(&self, uri: &str) -> Result<String> {
        match uri {
            OVERVIEW_URI => Ok(self.overview()),
            TOOLS_URI => Ok(self.tool_reference()),
            CONFIG_URI => Ok(self.config_snapshot()),
            _ => Err(Error::unknown_resource(uri)),
        }
    }

    /// MCP `resources/read` result: `{contents: [{uri, mimeType, text}]}`.
    pub fn read_contents(&self, uri: &str) -> Result<Value> {
        let text = self.read(uri)?;
        let mime_type = RESOURCES
            .iter()
            .find(|r| r.uri == uri)
            .map_or(MARKDOWN, |r| r.mime_type);
        Ok(json!({
            "contents": [{ "uri": uri, "mimeType": mime_type, "text": text }],
        }))
    }

    fn overview(&self) -> String {
        let visible = self.registry.list_visible();

        let mut namespaces: Vec<(&str, Vec<&str>)> = Vec::new();
        for entry in &visible {
            let name = entry.name();
            let ns = name.split_once('.').map_or(name, |(ns, _)| ns);
            match namespaces.iter_mut().find(|(n, _)| *n == ns) {
                Some((_, tools)) => tools.push(name),
                None => namespaces.push((ns, vec![name])),
            }
        }

        let mut lines = vec![
            "# PatternStack MCP".to_string(),
            String::new(),
            concat!(
                "Dependency and stack intelligence for coding agents. ",
                "Analysis runs in the PatternStack API; this server validates requests, ",
                "forwards them, and formats the answers."
            )
            .to_string(),
            String::new(),
            "## Tool namespaces".to_string(),
            String::new(),
        ];
        for (ns, tools) in &namespaces {
            lines.push(format!("- `{ns}.*`: {}", tools.join(", ")));
        }

        lines.push(String::new());
        lines.push("## Tier access".to_string());
        lines.push(String::new());
        let header: Vec<&str> = Tier::ALL.iter().map(|t| t.as_str()).collect();
        lines.push(format!("| Tool | {} |", header.join(" | ")));
        lines.push(format!("|---|{}", "---|".repeat(Tier::ALL.len())));
        for entry in &visible {
            let cells: Vec<&str> = Tier::ALL
                .iter()
                .map(|tier| {
                    if tier.includes(entry.descriptor.minimum_tier) {
                        "yes"
                    } else {
                        "no"
                    }
                })
                .collect();
            lines.push(format!("| {} | {} |", entry.name(), cells.join(" | ")));
        }

        lines.push(String::new());
        lines.push("## Capabilities".to_string());
        lines.push(String::new());
        lines.push("- Package health, risk, and adoption trends across 11 ecosystems".to_string());
        lines.push("- Ranked alternatives and safe upgrade paths".to_string());
        lines.push("- Stack recommendation, validation, and framework defaults".to_string());
        lines.push("- Architecture scoring and outcome signal evaluation".to_string());
        lines.push(String::new());
        lines.push(format!(
            "See `{TOOLS_URI}` for per-tool details and `{CONFIG_URI}` for the active \
             configuration."
        ));

        lines.join("\n")
    }

    fn tool_reference(&self) -> String {
        let mut lines = vec!["# Tool reference".to_string()];
        for entry in self.registry.list_all() {
            let d = &entry.descriptor;
            lines.push(String::new());
            lines.push(format!("## {}", d.name));
            lines.push(String::new());
            lines.push(d.description.to_string());
            lines.push(String::new());
            lines.push(format!("- Weight: {}", d.weight));
            lines.push(format!("- Timeout: {}ms", d.timeout_ms));
            lines.push(format!("- Minimum tier: {}", d.minimum_tier));
        }
        lines.join("\n")
    }

    fn config_snapshot(&self) -> String {
        let status = |set: bool| if set { "configured" } else { "not set" };
        let mut lines = vec![
            "# Configuration".to_string(),
            String::new(),
            format!("- API key ({ENV_API_KEY}): {}", status(self.upstream.has_api_key())),
            format!("- API URL ({ENV_API_URL}): {}", self.upstream.base_url),
            format!("- User ID ({ENV_USER_ID}): {}", status(self.upstream.user_id.is_some())),
            format!("- Connect timeout: {}ms", self.upstream.connect_timeout.as_millis()),
        ];
        if !self.upstream.has_api_key() {
            lines.push(String::new());
            lines.push(format!(
                "Tool calls will fail until an API key is set. Get one at {API_KEY_URL}."
            ));
        }
        lines.join("\n")
    }
}
