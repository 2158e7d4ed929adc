//! Persistence collaborator.
//!
//! # Responsibilities
//!
//! - Define the [`Store`] seam the services and the household aggregate call.
//! - Report failures as a structured [`StoreError`]: "no rows", a named
//!   constraint violation, a deadline/cancellation, or an opaque database error.
//!
//! # Module invariants
//!
//! - **No crypto.** The store never sees plaintext phone numbers or tokens;
//!   callers hand it ciphertext and digests.
//! - **Constraint names are data, not text.** Violations carry the constraint
//!   identifier reported by the driver; nothing here matches on error strings.

pub mod constraints;
pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::crypto::TokenHash;
use crate::models::{
    EnrichedHousehold, GeoLocation, Household, HouseholdHead, HouseholdMember, Identity,
    NewGeoLocation, NewHousehold, NewHouseholdHead, NewHouseholdMember, NewProgram, Program,
};

/// Which family of constraint was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Other,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::Other => "check",
        })
    }
}

/// Errors reported by a [`Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The query matched no row.
    #[error("no rows in result set")]
    NoRows,

    /// A write violated a named constraint.
    #[error("violates {kind} constraint \"{name}\"")]
    Constraint { name: String, kind: ConstraintKind },

    /// No connection became available in time.
    #[error("store call timed out")]
    Timeout,

    /// The connection pool was shut down mid-call.
    #[error("store call cancelled")]
    Canceled,

    /// A row came back in a shape the domain cannot represent.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Any other driver failure.
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Convenience constructor for tests and adapters.
    pub fn constraint(name: &str, kind: ConstraintKind) -> Self {
        StoreError::Constraint {
            name: name.to_owned(),
            kind,
        }
    }

    /// Returns `true` if this is a violation of the named constraint.
    pub fn violates(&self, constraint: &str) -> bool {
        matches!(self, StoreError::Constraint { name, .. } if name == constraint)
    }
}

/// Row-level operations the registry needs from its database.
///
/// Every method either returns the row or a [`StoreError`]; the services
/// translate constraint names into domain errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Round-trip to the database.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_identity_by_token_hash(&self, hash: &TokenHash) -> Result<Identity, StoreError>;

    async fn insert_identity(
        &self,
        email: &str,
        name: &str,
        hash: &TokenHash,
    ) -> Result<Identity, StoreError>;

    async fn insert_geolocation(&self, new: &NewGeoLocation) -> Result<GeoLocation, StoreError>;

    async fn insert_program(&self, new: &NewProgram) -> Result<Program, StoreError>;

    async fn get_program_by_id(&self, id: i32) -> Result<Program, StoreError>;

    /// Persist name/category/description; returns the new `updated_at`.
    async fn update_program_by_id(&self, program: &Program) -> Result<DateTime<Utc>, StoreError>;

    async fn insert_household(&self, new: &NewHousehold) -> Result<Household, StoreError>;

    /// `new.phone_number` must already be ciphertext.
    async fn insert_household_head(
        &self,
        new: &NewHouseholdHead,
    ) -> Result<HouseholdHead, StoreError>;

    async fn insert_household_member(
        &self,
        new: &NewHouseholdMember,
    ) -> Result<HouseholdMember, StoreError>;

    async fn get_household_head_by_household_id(
        &self,
        household_id: i32,
    ) -> Result<HouseholdHead, StoreError>;

    async fn get_enriched_household(
        &self,
        household_id: i32,
    ) -> Result<EnrichedHousehold, StoreError>;
}
