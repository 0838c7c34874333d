//! Fake PatternStack API for integration tests.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request as the fake upstream saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Debug, Clone, Default)]
pub struct FakeUpstream {
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl FakeUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Option<Seen> {
        self.seen.lock().unwrap().last().cloned()
    }
}

pub fn health_result() -> Value {
    json!({
        "package": {"name": "serde", "ecosystem": "crates", "version": "1.0.210"},
        "health": {"score": 0.97, "status": "healthy"},
        "risk": {"level": "low", "factors": []},
        "guidance": {"nextTools": ["dependency.alternatives"]},
    })
}

/// Scripted by tool name:
/// - `dependency.health`: success
/// - `migration.plan`: success
/// - `stack.defaults`: `success: false` with a message
/// - `stack.validate`: 400 mentioning the user id header
/// - `signals.evaluate`: 503 with a non-JSON body
/// - `dependency.trends`: stalls for 30s
/// - anything else: 403 JSON error
async fn tools_call(
    State(state): State<FakeUpstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.seen.lock().unwrap().push(Seen {
        headers,
        body: body.clone(),
    });

    match body["tool"].as_str().unwrap_or_default() {
        "dependency.health" => {
            Json(json!({"success": true, "result": health_result()})).into_response()
        }
        "migration.plan" => Json(json!({
            "success": true,
            "result": {"from": "moment", "to": "date-fns", "steps": [{"title": "Swap imports"}]},
        }))
        .into_response(),
        "stack.defaults" => Json(json!({
            "success": false,
            "error": {"message": "Framework not supported: cobol-on-cogs"},
        }))
        .into_response(),
        "stack.validate" => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {"message": "x-clerk-user-id header is required for workspace API keys"},
            })),
        )
            .into_response(),
        "signals.evaluate" => (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response(),
        "dependency.trends" => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Json(json!({"success": true, "result": {}})).into_response()
        }
        _ => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"message": "Upgrade to Team to use this tool"}})),
        )
            .into_response(),
    }
}

/// Start the fake upstream on an ephemeral port. Returns its base URL.
pub async fn start_upstream() -> (String, FakeUpstream) {
    let state = FakeUpstream::default();
    let app = Router::new()
        .route("/api/mcp/tools/call", post(tools_call))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}
