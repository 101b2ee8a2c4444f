//! HTTP handlers exposing the liveness and readiness probes

use crate::{error::Result, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::info;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/live", get(handle_liveness))
        .route("/ready", get(handle_readiness))
}

/// Constant success response: proves the process is running, probes no
/// dependencies.
pub async fn handle_liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn handle_readiness(State(state): State<AppState>) -> Result<impl IntoResponse> {
    info!("GET /ready - running readiness aggregation");

    let report = state.aggregator.run().await?;

    let status_code = if report.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((status_code, Json(report)))
}
