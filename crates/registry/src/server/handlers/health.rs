use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use common::protocol::HealthResponse;
use tracing::warn;

use crate::server::state::AppState;

/// `GET /health`: liveness and readiness check.
///
/// Returns `200 OK` when the database answers a ping within the operation
/// deadline and `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let ping = tokio::time::timeout(state.operation_timeout, state.store.ping()).await;
    let database_ready = match ping {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(error = %e, "database ping failed");
            false
        }
        Err(_) => {
            warn!("database ping timed out");
            false
        }
    };

    let (status_code, status) = if database_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.into(),
            database_ready,
        }),
    )
}
