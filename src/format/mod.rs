//! Result formatting: `(tool, result)` to display text.
//!
//! Pure and deterministic. Known tools render through a typed template; any
//! other name or shape renders as pretty-printed JSON. A `guidance` block, if
//! present, is appended after the body.

pub mod guidance;
pub mod render;
pub mod results;

pub use results::ToolResult;

use serde_json::Value;

/// Render an upstream result for display.
pub fn render(tool: &str, result: &Value) -> String {
    let hints = guidance::extract(result);

    let parsed = match (ToolResult::parse(tool, result), hints) {
        // Keep the guidance out of the raw dump; it gets its own section.
        (ToolResult::Generic { tool, mut raw }, Some(_)) => {
            if let Some(obj) = raw.as_object_mut() {
                obj.remove(guidance::GUIDANCE_KEY);
            }
            ToolResult::Generic { tool, raw }
        }
        (parsed, _) => parsed,
    };

    let body = render::render_body(&parsed);
    match hints {
        Some(hints) => format!("{body}\n\n{}", guidance::render(hints)),
        None => body,
    }
}
