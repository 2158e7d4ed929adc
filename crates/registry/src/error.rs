//! Domain errors surfaced by the registry services.
//!
//! [`RegistryError`] is what every service operation returns. The HTTP layer
//! maps it onto a status code via [`RegistryError::kind`]; nothing below the
//! router knows about HTTP.

use thiserror::Error;

use common::{ErrorKind, FieldErrors};

use crate::crypto::{CipherError, TokenError};
use crate::store::StoreError;

/// A referenced entity that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Identity,
    Program,
    GeoLocation,
    Household,
    HouseholdHead,
}

impl Entity {
    /// The request field that carried the dangling reference.
    pub fn field(self) -> &'static str {
        match self {
            Entity::Identity => "api_key",
            Entity::Program => "program_id",
            Entity::GeoLocation => "geo_location_id",
            Entity::Household | Entity::HouseholdHead => "house_hold_id",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Entity::Identity => "user",
            Entity::Program => "program",
            Entity::GeoLocation => "geo location",
            Entity::Household => "house hold",
            Entity::HouseholdHead => "house hold head",
        }
    }
}

/// Which uniqueness rule a write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplicate {
    ProgramName,
    GeoLocation,
    Email,
    HeadAlreadyExists,
    MemberAlreadyExists,
}

impl Duplicate {
    pub fn field(self) -> &'static str {
        match self {
            Duplicate::ProgramName => "name",
            Duplicate::GeoLocation => "sub_location",
            Duplicate::Email => "email",
            Duplicate::HeadAlreadyExists | Duplicate::MemberAlreadyExists => "house_hold_id",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Duplicate::ProgramName => "a program with this name already exists",
            Duplicate::GeoLocation => "a geo location with this sub location already exists",
            Duplicate::Email => "a user with this email address already exists",
            Duplicate::HeadAlreadyExists => "house hold already has a head",
            Duplicate::MemberAlreadyExists => "member already exists in this house hold",
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{} not found", .0.describe())]
    NotFound(Entity),

    #[error("{}", .0.message())]
    Conflict(Duplicate),

    #[error("validation failed")]
    ValidationFailed(FieldErrors),

    #[error("invalid or missing authentication token")]
    InvalidCredentials,

    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("field cipher: {0}")]
    Cipher(#[from] CipherError),

    #[error("token issuance: {0}")]
    Token(#[from] TokenError),

    #[error("operation timed out")]
    Timeout,

    #[error("operation canceled")]
    Canceled,

    #[error("store: {0}")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => RegistryError::Timeout,
            StoreError::Canceled => RegistryError::Canceled,
            other => RegistryError::Storage(other),
        }
    }
}

impl From<FieldErrors> for RegistryError {
    fn from(fields: FieldErrors) -> Self {
        RegistryError::ValidationFailed(fields)
    }
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::NotFound(_) => ErrorKind::NotFound,
            RegistryError::Conflict(_) => ErrorKind::Conflict,
            RegistryError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            RegistryError::InvalidCredentials => ErrorKind::InvalidCredentials,
            RegistryError::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            RegistryError::Cipher(_) | RegistryError::Token(_) | RegistryError::Storage(_) => {
                ErrorKind::Internal
            }
            RegistryError::Timeout => ErrorKind::Timeout,
            RegistryError::Canceled => ErrorKind::Unavailable,
        }
    }

    /// Per-field detail for the response body, when the error has any.
    pub fn fields(&self) -> Option<FieldErrors> {
        match self {
            RegistryError::ValidationFailed(fields) => Some(fields.clone()),
            RegistryError::NotFound(entity) => Some(FieldErrors::from([(
                entity.field().to_owned(),
                self.to_string(),
            )])),
            RegistryError::Conflict(dup) => Some(FieldErrors::from([(
                dup.field().to_owned(),
                dup.message().to_owned(),
            )])),
            _ => None,
        }
    }

    /// Message safe to return to the client. Server-side failures never leak
    /// their cause.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => {
                "the server encountered a problem and could not process your request".to_owned()
            }
            ErrorKind::Unavailable => "the request was canceled before it completed".to_owned(),
            _ => self.to_string(),
        }
    }

    /// `true` for failures the operator should see in the logs.
    pub fn is_server_error(&self) -> bool {
        self.kind().http_status() >= 500
    }
}
