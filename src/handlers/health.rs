//! Liveness endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::models::{HealthResponse, ProviderInfo};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service healthy", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let resp = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        app: "TaskForge".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        providers: vec![
            ProviderInfo {
                name: "gemini".to_string(),
                available: state.suggestions.provider_configured(),
            },
            ProviderInfo {
                name: "auth".to_string(),
                available: state.jwt_secret.is_some(),
            },
        ],
    };

    Json(serde_json::to_value(resp).unwrap_or_else(|_| json!({"error": "serialization failed"})))
}
