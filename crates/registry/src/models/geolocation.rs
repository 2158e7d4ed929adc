//! Administrative locations households are registered under.

use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{protocol::CreateGeoLocationRequest, FieldErrors, Validator};

use super::MAX_TEXT_BYTES;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct GeoLocation {
    pub id: i32,
    pub county: String,
    pub sub_county: String,
    pub location: String,
    pub sub_location: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGeoLocation {
    pub county: String,
    pub sub_county: String,
    pub location: String,
    pub sub_location: String,
}

impl NewGeoLocation {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut v = Validator::new();
        v.check_text(&self.county, "county", MAX_TEXT_BYTES);
        v.check_text(&self.sub_county, "sub_county", MAX_TEXT_BYTES);
        v.check_text(&self.location, "location", MAX_TEXT_BYTES);
        v.check_text(&self.sub_location, "sub_location", MAX_TEXT_BYTES);
        v.finish()
    }
}

impl From<CreateGeoLocationRequest> for NewGeoLocation {
    fn from(req: CreateGeoLocationRequest) -> Self {
        Self {
            county: req.county,
            sub_county: req.sub_county,
            location: req.location,
            sub_location: req.sub_location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_required() {
        let errors = NewGeoLocation {
            county: "Kisumu".into(),
            sub_county: String::new(),
            location: String::new(),
            sub_location: "x".repeat(256),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["sub_location"], "must not be more than 255 bytes long");
    }
}
