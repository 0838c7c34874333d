//! Per-tool JSON Schemas, compiled once.
//!
//! Schemas are closed: unknown properties and out-of-enum values are
//! violations, never silently passed upstream.

use crate::types::{Error, Result};
use serde_json::{json, Value};
use std::fmt;

// =============================================================================
// Ecosystem
// =============================================================================

/// Supported package ecosystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    Npm,
    Pypi,
    Go,
    Crates,
    Rubygems,
    Packagist,
    Hex,
    Maven,
    Nuget,
    Pub,
    Swift,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 11] = [
        Ecosystem::Npm,
        Ecosystem::Pypi,
        Ecosystem::Go,
        Ecosystem::Crates,
        Ecosystem::Rubygems,
        Ecosystem::Packagist,
        Ecosystem::Hex,
        Ecosystem::Maven,
        Ecosystem::Nuget,
        Ecosystem::Pub,
        Ecosystem::Swift,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Pypi => "pypi",
            Ecosystem::Go => "go",
            Ecosystem::Crates => "crates",
            Ecosystem::Rubygems => "rubygems",
            Ecosystem::Packagist => "packagist",
            Ecosystem::Hex => "hex",
            Ecosystem::Maven => "maven",
            Ecosystem::Nuget => "nuget",
            Ecosystem::Pub => "pub",
            Ecosystem::Swift => "swift",
        }
    }

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|e| e.as_str()).collect()
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Schema fragments
// =============================================================================

fn ecosystem_prop() -> Value {
    json!({
        "type": "string",
        "enum": Ecosystem::names(),
        "description": "Package ecosystem",
    })
}

fn package_prop() -> Value {
    json!({
        "type": "string",
        "minLength": 1,
        "description": "Package name as published in its registry",
    })
}

fn string_list(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string", "minLength": 1 },
        "description": description,
    })
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn package_query(extra: Value) -> Value {
    let mut properties = json!({
        "package": package_prop(),
        "ecosystem": ecosystem_prop(),
    });
    if let (Some(base), Some(extra)) = (properties.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    object_schema(properties, &["package", "ecosystem"])
}

/// Input schema for a tool, or `None` if the name is not a known tool.
pub fn input_schema(tool: &str) -> Option<Value> {
    let schema = match tool {
        "dependency.explain" => package_query(json!({
            "version": { "type": "string", "description": "Specific version to explain" },
            "context": {
                "type": "string",
                "description": "What the caller is building, to tailor the explanation",
            },
        })),
        "dependency.health" => package_query(json!({
            "version": {
                "type": "string",
                "description": "Version to assess (defaults to latest)",
            },
        })),
        "dependency.alternatives" => package_query(json!({
            "limit": {
                "type": "integer",
                "minimum": 1,
                "maximum": 20,
                "description": "Maximum alternatives to return",
            },
            "reason": { "type": "string", "description": "Why the package is being replaced" },
        })),
        "dependency.trends" => package_query(json!({
            "period": {
                "type": "string",
                "enum": ["30d", "90d", "1y"],
                "description": "Trend window",
            },
        })),
        "dependency.safe-upgrade" => package_query(json!({
            "currentVersion": {
                "type": "string",
                "minLength": 1,
                "description": "Installed version",
            },
            "targetVersion": {
                "type": "string",
                "description": "Desired version (defaults to latest)",
            },
        })),
        "stack.recommend" => object_schema(
            json!({
                "description": {
                    "type": "string",
                    "minLength": 1,
                    "description": "What the project does",
                },
                "ecosystem": ecosystem_prop(),
                "constraints": string_list("Hard requirements, e.g. 'serverless' or 'no ORM'"),
                "existing": string_list("Packages already in use"),
            }),
            &["description"],
        ),
        "stack.validate" => object_schema(
            json!({
                "packages": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": package_prop(),
                            "version": { "type": "string" },
                        },
                        "required": ["name"],
                        "additionalProperties": false,
                    },
                    "description": "Packages in the stack",
                },
                "ecosystem": ecosystem_prop(),
            }),
            &["packages", "ecosystem"],
        ),
        "stack.defaults" => object_schema(
            json!({
                "framework": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Framework or project type, e.g. 'nextjs'",
                },
                "ecosystem": ecosystem_prop(),
            }),
            &["framework"],
        ),
        "migration.plan" => object_schema(
            json!({
                "from": package_prop(),
                "to": package_prop(),
                "ecosystem": ecosystem_prop(),
                "codebaseSize": { "type": "string", "enum": ["small", "medium", "large"] },
            }),
            &["from", "to", "ecosystem"],
        ),
        "architecture.evaluate" => object_schema(
            json!({
                "description": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Architecture under review",
                },
                "components": string_list("Major components or services"),
                "priorities": string_list("Quality attributes that matter most"),
            }),
            &["description"],
        ),
        "signals.evaluate" => object_schema(
            json!({
                "taskId": { "type": "string", "minLength": 1 },
                "signals": {
                    "type": "object",
                    "additionalProperties": { "type": ["number", "boolean", "string"] },
                    "description": "Observed outcome signals keyed by name",
                },
            }),
            &["signals"],
        ),
        _ => return None,
    };
    Some(schema)
}

// =============================================================================
// Validator
// =============================================================================

/// Compiled JSON Schema for one tool.
pub struct SchemaValidator {
    tool: &'static str,
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    pub fn compile(tool: &'static str, schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| Error::internal(format!("Invalid input schema for {tool}: {e}")))?;
        Ok(Self { tool, validator })
    }

    /// Every violation, rendered as text. Empty = valid.
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect()
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("tool", &self.tool)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
