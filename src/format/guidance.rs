//! The `guidance` side channel: machine-actionable hints attached to any result.

use super::render::scalar_text;
use serde_json::{Map, Value};

/// Key under which upstream attaches guidance.
pub const GUIDANCE_KEY: &str = "guidance";

/// Extract the guidance object, if the result carries a non-empty one.
pub fn extract(result: &Value) -> Option<&Map<String, Value>> {
    result
        .get(GUIDANCE_KEY)
        .and_then(Value::as_object)
        .filter(|m| !m.is_empty())
}

/// Render the `## Guidance` section. Keys are sorted.
pub fn render(guidance: &Map<String, Value>) -> String {
    let mut keys: Vec<&String> = guidance.keys().collect();
    keys.sort();

    let mut lines = vec!["## Guidance".to_string()];
    for key in keys {
        let value = &guidance[key.as_str()];
        lines.push(format!("- {key}: {}", value_text(value)));
    }
    lines.join("\n")
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other),
    }
}
