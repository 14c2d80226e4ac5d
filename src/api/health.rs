use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthResponse};

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthResponse>> {
    let database = match state.store().ping().await {
        Ok(()) => "ok",
        Err(_) => "unreachable",
    };

    let registry_configured = state
        .config()
        .read()
        .await
        .registry
        .resolved_api_key()
        .is_some();

    let status = if database == "ok" { "ok" } else { "degraded" };

    Json(ApiResponse::success(HealthResponse {
        status,
        database,
        registry_configured,
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    }))
}
