//! Constraint identifiers the services translate into domain errors.
//!
//! These must match `sql/schema.sql`.

pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const PROGRAMS_NAME_KEY: &str = "programs_name_key";
pub const GEOLOCATIONS_SUB_LOCATION_KEY: &str = "geolocations_sub_location_key";
pub const HOUSEHOLDS_PROGRAM_ID_FKEY: &str = "households_program_id_fkey";
pub const HOUSEHOLDS_GEOLOCATION_ID_FKEY: &str = "households_geolocation_id_fkey";
pub const HOUSEHOLD_HEADS_HOUSEHOLD_ID_FKEY: &str = "household_heads_household_id_fkey";
pub const HOUSEHOLD_HEADS_HOUSEHOLD_ID_KEY: &str = "household_heads_household_id_key";
pub const HOUSEHOLD_MEMBERS_HOUSEHOLD_ID_FKEY: &str = "household_members_household_id_fkey";
pub const UNIQUE_HOUSEHOLD_MEMBER: &str = "unique_household_member";
