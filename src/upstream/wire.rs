//! Response envelope parsing and upstream error classification.

use crate::types::{Error, Result, WORKSPACE_KEY_GUIDANCE};
use crate::upstream::USER_ID_HEADER;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body sent upstream.
#[derive(Debug, Serialize)]
pub struct ToolCallBody<'a> {
    pub tool: &'a str,
    pub input: &'a Value,
}

/// `{success, result}` or `{success: false, error: {message}}`.
#[derive(Debug, Deserialize)]
struct ToolEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

/// Upstream errors arrive either as `{message}` objects or bare strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed {
        #[serde(default)]
        message: Option<String>,
    },
    Text(String),
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        match self {
            ErrorBody::Detailed { message } => message,
            ErrorBody::Text(text) => Some(text),
        }
        .filter(|m| !m.trim().is_empty())
    }
}

/// Unwrap a 2xx body into the tool's `result` payload.
pub fn unwrap_success(body: &[u8]) -> Result<Value> {
    let envelope: ToolEnvelope = serde_json::from_slice(body).map_err(|e| {
        Error::upstream(200, format!("Invalid response from PatternStack API: {e}"))
    })?;

    if !envelope.success {
        let message = envelope
            .error
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| "Tool execution failed".to_string());
        return Err(Error::tool_failed(message));
    }

    Ok(envelope.result.unwrap_or(Value::Null))
}

/// Classify a non-2xx response.
pub fn classify_failure(status: StatusCode, body: &[u8]) -> Error {
    let message = error_message(body).unwrap_or_else(|| status_text(status));

    if status == StatusCode::BAD_REQUEST && mentions_user_id_header(&message) {
        return Error::upstream(status.as_u16(), WORKSPACE_KEY_GUIDANCE);
    }

    Error::upstream(status.as_u16(), message)
}

/// Compatibility shim: upstream reports the missing identity header only in
/// prose, so this matches on the header name.
fn mentions_user_id_header(message: &str) -> bool {
    message.to_ascii_lowercase().contains(USER_ID_HEADER)
}

fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;

    if let Some(error) = object.get("error") {
        let parsed: Option<ErrorBody> = serde_json::from_value(error.clone()).ok();
        if let Some(message) = parsed.and_then(ErrorBody::message) {
            return Some(message);
        }
    }

    object
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
        None => format!("HTTP {}", status.as_u16()),
    }
}
