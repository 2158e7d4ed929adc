//! Caller identification.
//!
//! Every request is resolved to a [`Caller`] before it reaches a handler. The
//! household operations take that caller explicitly and refuse to act for
//! [`Caller::Anonymous`].

pub mod identity;

pub use identity::IdentityStore;

use crate::error::RegistryError;
use crate::models::Identity;

/// Who is making the current request.
#[derive(Debug, Clone, PartialEq)]
pub enum Caller {
    /// No API key header was sent.
    Anonymous,
    /// The API key resolved to a registered identity.
    Authenticated(Identity),
}

impl Caller {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Caller::Anonymous)
    }

    /// Gate for operations that need a known caller.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AuthenticationRequired`] for
    /// [`Caller::Anonymous`].
    pub fn require_authenticated(&self) -> Result<&Identity, RegistryError> {
        match self {
            Caller::Authenticated(identity) => Ok(identity),
            Caller::Anonymous => Err(RegistryError::AuthenticationRequired),
        }
    }
}
