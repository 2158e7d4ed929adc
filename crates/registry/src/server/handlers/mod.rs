//! Axum request handlers, one module per resource.
//!
//! Handlers decode the request, call into the services, and wrap the result
//! in a JSON envelope keyed by entity name.

pub mod auth;
pub mod geolocations;
pub mod health;
pub mod households;
pub mod programs;

use axum::{http::StatusCode, response::IntoResponse, Json};
use common::{protocol::ErrorResponse, ErrorKind};

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new(
        ErrorKind::NotFound.code(),
        "the requested resource could not be found",
    );
    (StatusCode::NOT_FOUND, Json(err))
}
