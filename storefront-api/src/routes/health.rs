/// Health check endpoint
///
/// `GET /health` reports overall service status plus database
/// reachability. The endpoint is public and is what load balancers and
/// uptime probes should hit.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" when all checks pass, "degraded" otherwise
    pub status: &'static str,

    /// Crate version serving the request
    pub version: &'static str,

    /// "connected" or "disconnected"
    pub database: &'static str,
}

/// Health check handler
///
/// A failing database probe degrades the status rather than erroring,
/// so probes still get a parseable body.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    Ok(Json(HealthResponse {
        status: if db_ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if db_ok { "connected" } else { "disconnected" },
    }))
}
