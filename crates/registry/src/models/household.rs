//! The household aggregate: a household, at most one head, and its members.

use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{
    protocol::{CreateHouseholdHeadRequest, CreateHouseholdMemberRequest, CreateHouseholdRequest},
    FieldErrors, Validator,
};

use super::MAX_TEXT_BYTES;

const MAX_NATIONAL_ID_BYTES: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Household {
    pub id: i32,
    pub program_id: i32,
    pub geo_location_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewHousehold {
    pub program_id: i32,
    pub geo_location_id: i32,
    pub name: String,
}

impl NewHousehold {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        v.check(self.program_id != 0, "program_id", "must be provided");
        v.check(self.geo_location_id != 0, "geo_location_id", "must be provided");
        v.check_text(&self.name, "name", MAX_TEXT_BYTES);
        v.finish()
    }
}

impl From<CreateHouseholdRequest> for NewHousehold {
    fn from(req: CreateHouseholdRequest) -> Self {
        Self {
            program_id: req.program_id,
            geo_location_id: req.geo_location_id,
            name: req.name,
        }
    }
}

/// A household head.
///
/// `phone_number` holds ciphertext when read from the store and plaintext
/// once the aggregate hands it back to a caller.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HouseholdHead {
    pub id: i32,
    #[serde(rename = "house_hold_id")]
    pub household_id: i32,
    pub name: String,
    pub national_id: String,
    pub phone_number: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewHouseholdHead {
    pub household_id: i32,
    pub name: String,
    pub national_id: String,
    pub phone_number: String,
    pub age: i32,
}

impl NewHouseholdHead {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        v.check(self.household_id != 0, "house_hold_id", "must be provided");
        v.check_text(&self.name, "name", MAX_TEXT_BYTES);
        v.check_text(&self.national_id, "national_id", MAX_NATIONAL_ID_BYTES);
        v.check(!self.phone_number.is_empty(), "phone_number", "must be provided");
        v.check(self.age != 0, "age", "must be provided");
        v.finish()
    }
}

impl From<CreateHouseholdHeadRequest> for NewHouseholdHead {
    fn from(req: CreateHouseholdHeadRequest) -> Self {
        Self {
            household_id: req.house_hold_id,
            name: req.name,
            national_id: req.national_id,
            phone_number: req.phone_number,
            age: req.age,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HouseholdMember {
    pub id: i32,
    #[serde(rename = "house_hold_id")]
    pub household_id: i32,
    pub name: String,
    pub age: i32,
    pub relation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership is unique per `(household_id, name, relation)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHouseholdMember {
    pub household_id: i32,
    pub name: String,
    pub age: i32,
    pub relation: String,
}

impl NewHouseholdMember {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        v.check(self.household_id != 0, "house_hold_id", "must be provided");
        v.check_text(&self.name, "name", MAX_TEXT_BYTES);
        v.check(self.age != 0, "age", "must be provided");
        v.check_text(&self.relation, "relation", MAX_TEXT_BYTES);
        v.finish()
    }
}

impl From<CreateHouseholdMemberRequest> for NewHouseholdMember {
    fn from(req: CreateHouseholdMemberRequest) -> Self {
        Self {
            household_id: req.house_hold_id,
            name: req.name,
            age: req.age,
            relation: req.relation,
        }
    }
}

/// Read projection: a household joined with its program, location, head,
/// and member count. Head columns are absent until a head is registered.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct EnrichedHousehold {
    #[serde(rename = "house_hold_id")]
    pub household_id: i32,
    pub program_id: i32,
    pub program_name: String,
    #[serde(rename = "geolocation_id")]
    pub geo_location_id: i32,
    pub county: String,
    pub sub_county: String,
    pub household_head_id: Option<i32>,
    pub household_head_name: Option<String>,
    pub phone_number: Option<String>,
    pub household_member_count: i64,
}
