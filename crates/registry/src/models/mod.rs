//! Domain records and their insert parameters.
//!
//! Every `New*` type carries a `validate()` that returns field-level errors;
//! services run it before touching the store.

pub mod geolocation;
pub mod household;
pub mod identity;
pub mod program;

pub use geolocation::{GeoLocation, NewGeoLocation};
pub use household::{
    EnrichedHousehold, Household, HouseholdHead, HouseholdMember, NewHousehold,
    NewHouseholdHead, NewHouseholdMember,
};
pub use identity::{Identity, NewIdentity};
pub use program::{NewProgram, Program, ProgramPatch};

/// Upper bound for short free-text columns.
pub const MAX_TEXT_BYTES: usize = 255;
