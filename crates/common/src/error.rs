//! Transport-facing error kinds.

use thiserror::Error;

/// The closed set of error kinds a caller can observe.
///
/// Every domain error in the service collapses to exactly one kind, and each
/// kind maps to exactly one HTTP status:
/// - [`ErrorKind::BadRequest`] → 400
/// - [`ErrorKind::InvalidCredentials`] / [`ErrorKind::AuthenticationRequired`] → 401
/// - [`ErrorKind::NotFound`] → 404
/// - [`ErrorKind::Conflict`] → 409
/// - [`ErrorKind::ValidationFailed`] → 422
/// - [`ErrorKind::Internal`] → 500
/// - [`ErrorKind::Unavailable`] → 503
/// - [`ErrorKind::Timeout`] → 504
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The request body could not be decoded.
    #[error("bad request")]
    BadRequest,

    /// A credential was presented but is malformed or unknown.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The resource requires an authenticated caller.
    #[error("authentication required")]
    AuthenticationRequired,

    /// A referenced entity does not exist.
    #[error("not found")]
    NotFound,

    /// The write collides with an existing entity.
    #[error("conflict")]
    Conflict,

    /// The request body failed field validation.
    #[error("validation failed")]
    ValidationFailed,

    /// Storage, cryptographic, or other server-side failure.
    #[error("internal error")]
    Internal,

    /// The unit of work was cancelled before completing.
    #[error("unavailable")]
    Unavailable,

    /// The unit of work exceeded its deadline.
    #[error("timeout")]
    Timeout,
}

impl ErrorKind {
    /// Returns the HTTP status code that should be sent for this kind.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::InvalidCredentials | ErrorKind::AuthenticationRequired => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::ValidationFailed => 422,
            ErrorKind::Internal => 500,
            ErrorKind::Unavailable => 503,
            ErrorKind::Timeout => 504,
        }
    }

    /// Short machine-readable code placed in [`crate::protocol::ErrorResponse::code`].
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::InvalidCredentials => "invalid_credentials",
            ErrorKind::AuthenticationRequired => "authentication_required",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::Internal => "internal_error",
            ErrorKind::Unavailable => "service_unavailable",
            ErrorKind::Timeout => "timeout",
        }
    }
}
