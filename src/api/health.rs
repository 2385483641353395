//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub provider: ProviderHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct ProviderHealthResponse {
    pub backend: String,
    pub credentials_configured: bool,
}

/// GET /health - liveness, no provider round trip
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let credentials_configured = state.provider.credentials_configured();
    let status = if credentials_configured { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        provider: ProviderHealthResponse {
            backend: state.provider.provider_name().to_string(),
            credentials_configured,
        },
    })
}
