//! Tool registry — immutable metadata for every invocable tool.
//!
//! Owns tool *metadata* only. Execution lives upstream; the registry tells the
//! dispatcher which names exist, how long to wait for each, and what to
//! advertise.

use crate::tools::schemas::{self, SchemaValidator};
use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

// =============================================================================
// Tier
// =============================================================================

/// Subscription tier. Advisory only; upstream enforces entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Pro,
    Team,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Pro, Tier::Team];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Team => "team",
        }
    }

    /// Whether a subscriber on `self` may call a tool requiring `required`.
    pub fn includes(self, required: Tier) -> bool {
        self >= required
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tool descriptor
// =============================================================================

/// Static metadata for one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// Relative upstream cost, 1 (cheap) to 5 (expensive).
    pub weight: u8,
    pub timeout_ms: u64,
    pub minimum_tier: Tier,
    /// Hidden tools are omitted from listings but remain callable.
    pub hidden: bool,
}

impl ToolDescriptor {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// The fixed tool table, in listing order.
pub const TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "dependency.explain",
        description: "Explain what a package does, why projects use it, and what to watch out for.",
        weight: 2,
        timeout_ms: 15_000,
        minimum_tier: Tier::Free,
        hidden: false,
    },
    ToolDescriptor {
        name: "dependency.health",
        description: "Summarize a package's maintenance health, adoption, and risk signals.",
        weight: 1,
        timeout_ms: 10_000,
        minimum_tier: Tier::Free,
        hidden: false,
    },
    ToolDescriptor {
        name: "dependency.alternatives",
        description: "Rank alternative packages that can replace a dependency.",
        weight: 3,
        timeout_ms: 20_000,
        minimum_tier: Tier::Free,
        hidden: false,
    },
    ToolDescriptor {
        name: "dependency.trends",
        description: "Report adoption and download trends for a package over a time window.",
        weight: 2,
        timeout_ms: 15_000,
        minimum_tier: Tier::Pro,
        hidden: false,
    },
    ToolDescriptor {
        name: "dependency.safe-upgrade",
        description: "Find the safest upgrade target from \
            a current version and list breaking changes.",
        weight: 3,
        timeout_ms: 25_000,
        minimum_tier: Tier::Pro,
        hidden: false,
    },
    ToolDescriptor {
        name: "stack.recommend",
        description: "Recommend a complete technology stack for a project description.",
        weight: 4,
        timeout_ms: 30_000,
        minimum_tier: Tier::Pro,
        hidden: false,
    },
    ToolDescriptor {
        name: "stack.validate",
        description: "Check a set of packages \
            for conflicts, redundancy, and known incompatibilities.",
        weight: 2,
        timeout_ms: 15_000,
        minimum_tier: Tier::Free,
        hidden: false,
    },
    ToolDescriptor {
        name: "stack.defaults",
        description: "List the default package choices for a framework or project type.",
        weight: 1,
        timeout_ms: 5_000,
        minimum_tier: Tier::Free,
        hidden: false,
    },
    ToolDescriptor {
        name: "migration.plan",
        description: "Produce an ordered, step-by-step plan to \
            migrate from one package to another.",
        weight: 5,
        timeout_ms: 45_000,
        minimum_tier: Tier::Team,
        hidden: true,
    },
    ToolDescriptor {
        name: "architecture.evaluate",
        description: "Score a proposed architecture across \
            quality dimensions and suggest improvements.",
        weight: 5,
        timeout_ms: 45_000,
        minimum_tier: Tier::Team,
        hidden: false,
    },
    ToolDescriptor {
        name: "signals.evaluate",
        description: "Evaluate agent outcome signals and return a reward score.",
        weight: 1,
        timeout_ms: 10_000,
        minimum_tier: Tier::Pro,
        hidden: false,
    },
];

// =============================================================================
// Tool entry
// =============================================================================

/// Descriptor plus its input schema and compiled validator.
#[derive(Debug)]
pub struct ToolEntry {
    pub descriptor: ToolDescriptor,
    pub input_schema: Value,
    validator: SchemaValidator,
}

impl ToolEntry {
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Validate arguments against the input schema.
    ///
    /// Returns a list of violations (empty = valid).
    pub fn validate_input(&self, input: &Value) -> Vec<String> {
        self.validator.violations(input)
    }

    /// Listing shape: `{name, description, inputSchema}`.
    pub fn to_listing(&self) -> Value {
        serde_json::json!({
            "name": self.descriptor.name,
            "description": self.descriptor.description,
            "inputSchema": self.input_schema,
        })
    }
}

// =============================================================================
// Tool registry
// =============================================================================

/// Read-only registry built once at startup.
#[derive(Debug)]
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Build the registry from the fixed tool table.
    pub fn new() -> Result<Self> {
        Self::from_descriptors(TOOLS)
    }

    /// Build a registry from descriptors. Every descriptor needs a schema.
    pub fn from_descriptors(descriptors: &[ToolDescriptor]) -> Result<Self> {
        let mut entries = Vec::with_capacity(descriptors.len());
        let mut index = HashMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            if descriptor.name.is_empty() {
                return Err(Error::internal("Tool name cannot be empty"));
            }
            if index.contains_key(descriptor.name) {
                return Err(Error::internal(format!(
                    "Duplicate tool name: {}",
                    descriptor.name
                )));
            }
            let input_schema = schemas::input_schema(descriptor.name).ok_or_else(|| {
                Error::internal(format!("No input schema for tool: {}", descriptor.name))
            })?;
            let validator = SchemaValidator::compile(descriptor.name, &input_schema)?;

            index.insert(descriptor.name, entries.len());
            entries.push(ToolEntry {
                descriptor: *descriptor,
                input_schema,
                validator,
            });
        }

        Ok(Self { entries, index })
    }

    /// Get a tool entry by name. Hidden tools are included.
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Get a descriptor by name.
    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.get(name).map(|e| &e.descriptor)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Visible entries in registration order.
    pub fn list_visible(&self) -> Vec<&ToolEntry> {
        self.entries
            .iter()
            .filter(|e| !e.descriptor.hidden)
            .collect()
    }

    /// All entries, hidden included, in registration order.
    pub fn list_all(&self) -> &[ToolEntry] {
        &self.entries
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
