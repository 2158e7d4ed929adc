//! Request and response bodies exchanged over the public HTTP API.
//!
//! Request structs default every field so that an omitted field reaches
//! validation (422 with field detail) rather than failing JSON decoding.
//! Unknown fields are rejected at decode time (400).

use serde::{Deserialize, Serialize};

use crate::validation::FieldErrors;

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/programs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateProgramRequest {
    pub name: String,
    pub category: String,
    pub description: String,
}

/// Request body for `PATCH /v1/programs/:id`.
///
/// Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateProgramRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Geo locations
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/geo_locations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateGeoLocationRequest {
    pub county: String,
    pub sub_county: String,
    pub location: String,
    pub sub_location: String,
}

// ---------------------------------------------------------------------------
// Households
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/house_holds`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateHouseholdRequest {
    pub program_id: i32,
    pub geo_location_id: i32,
    pub name: String,
}

/// Request body for `POST /v1/house_holds/head`.
///
/// `phone_number` arrives in plaintext and is encrypted before it is stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateHouseholdHeadRequest {
    pub house_hold_id: i32,
    pub name: String,
    pub national_id: String,
    pub phone_number: String,
    pub age: i32,
}

/// Request body for `POST /v1/house_holds/member`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateHouseholdMemberRequest {
    pub house_hold_id: i32,
    pub name: String,
    pub age: i32,
    pub relation: String,
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
}

/// The freshly issued API key.
///
/// This is the only time the plaintext token leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"conflict"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
    /// Field-level detail for validation and conflict errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            fields: None,
        }
    }

    /// Attach field-level detail.
    pub fn with_fields(mut self, fields: FieldErrors) -> Self {
        self.fields = Some(fields);
        self
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the database answered a ping within the operation deadline.
    pub database_ready: bool,
}
