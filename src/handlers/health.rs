use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "pillpal-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The assistant check is informational: without an API key every
/// assistant route still answers with its fallback text.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let medications = state.store.read().await.medications.len();
    let assistant = if state.config.claude_api_key.is_empty() {
        "fallback_only"
    } else {
        "configured"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "checks": {
                "store": "ok",
                "assistant": assistant,
            },
            "medications": medications,
        })),
    )
}
