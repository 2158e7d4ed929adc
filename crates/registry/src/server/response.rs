//! Error responses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{protocol::ErrorResponse, ErrorKind};
use tracing::{error, warn};

use crate::error::RegistryError;

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    /// The request could not be decoded (body or path).
    BadRequest(String),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Registry(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn status_of(kind: ErrorKind) -> StatusCode {
    StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                let kind = ErrorKind::BadRequest;
                (status_of(kind), Json(ErrorResponse::new(kind.code(), message))).into_response()
            }
            ApiError::Registry(err) => {
                let kind = err.kind();
                if err.is_server_error() {
                    error!(error = %err, code = kind.code(), "request failed");
                } else if kind == ErrorKind::InvalidCredentials {
                    warn!("invalid authentication token presented");
                }
                let mut body = ErrorResponse::new(kind.code(), err.public_message());
                if let Some(fields) = err.fields() {
                    body = body.with_fields(fields);
                }
                (status_of(kind), Json(body)).into_response()
            }
        }
    }
}
