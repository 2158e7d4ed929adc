//! API callers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{protocol::RegisterRequest, FieldErrors, Validator};

use super::MAX_TEXT_BYTES;
use crate::crypto::TokenHash;

/// A registered API caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub id: i32,
    pub email: String,
    pub name: String,
    #[serde(skip)]
    pub token_hash: TokenHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for registering a caller. The hash is filled in at issuance.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub name: String,
}

impl NewIdentity {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        v.check_text(&self.email, "email", MAX_TEXT_BYTES);
        v.check(self.email.contains('@'), "email", "must be a valid email address");
        v.check_text(&self.name, "name", MAX_TEXT_BYTES);
        v.finish()
    }
}

impl From<RegisterRequest> for NewIdentity {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email.trim().to_owned(),
            name: req.name,
        }
    }
}
