//! In-memory [`Store`] used by unit and route tests.
//!
//! Enforces the same named constraints as `sql/schema.sql` so the services'
//! error translation is exercised end to end without a database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::constraints::*;
use super::{ConstraintKind, Store, StoreError};
use crate::crypto::TokenHash;
use crate::models::{
    EnrichedHousehold, GeoLocation, Household, HouseholdHead, HouseholdMember, Identity,
    NewGeoLocation, NewHousehold, NewHouseholdHead, NewHouseholdMember, NewProgram, Program,
};

#[derive(Default)]
struct Tables {
    identities: Vec<Identity>,
    programs: Vec<Program>,
    geolocations: Vec<GeoLocation>,
    households: Vec<Household>,
    heads: Vec<HouseholdHead>,
    members: Vec<HouseholdMember>,
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len + 1).unwrap()
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failure: Mutex<Option<fn() -> StoreError>>,
    member_inserts: AtomicUsize,
    head_inserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with the error `make` builds.
    pub fn fail_with(&self, make: fn() -> StoreError) {
        *self.failure.lock().unwrap() = Some(make);
    }

    /// Number of member insert attempts that reached the store.
    pub fn member_inserts(&self) -> usize {
        self.member_inserts.load(Ordering::SeqCst)
    }

    /// Number of head insert attempts that reached the store.
    pub fn head_inserts(&self) -> usize {
        self.head_inserts.load(Ordering::SeqCst)
    }

    /// The phone column exactly as persisted for `household_id`'s head.
    pub fn stored_phone(&self, household_id: i32) -> Option<String> {
        self.tables
            .lock()
            .unwrap()
            .heads
            .iter()
            .find(|h| h.household_id == household_id)
            .map(|h| h.phone_number.clone())
    }

    fn check(&self) -> Result<(), StoreError> {
        match *self.failure.lock().unwrap() {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn find_identity_by_token_hash(&self, hash: &TokenHash) -> Result<Identity, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        tables
            .identities
            .iter()
            .find(|i| &i.token_hash == hash)
            .cloned()
            .ok_or(StoreError::NoRows)
    }

    async fn insert_identity(
        &self,
        email: &str,
        name: &str,
        hash: &TokenHash,
    ) -> Result<Identity, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.identities.iter().any(|i| i.email == email) {
            return Err(StoreError::constraint(USERS_EMAIL_KEY, ConstraintKind::Unique));
        }
        let now = Utc::now();
        let identity = Identity {
            id: next_id(tables.identities.len()),
            email: email.to_owned(),
            name: name.to_owned(),
            token_hash: *hash,
            created_at: now,
            updated_at: now,
        };
        tables.identities.push(identity.clone());
        Ok(identity)
    }

    async fn insert_geolocation(&self, new: &NewGeoLocation) -> Result<GeoLocation, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables
            .geolocations
            .iter()
            .any(|g| g.sub_location == new.sub_location)
        {
            return Err(StoreError::constraint(
                GEOLOCATIONS_SUB_LOCATION_KEY,
                ConstraintKind::Unique,
            ));
        }
        let geolocation = GeoLocation {
            id: next_id(tables.geolocations.len()),
            county: new.county.clone(),
            sub_county: new.sub_county.clone(),
            location: new.location.clone(),
            sub_location: new.sub_location.clone(),
            created_at: Utc::now(),
        };
        tables.geolocations.push(geolocation.clone());
        Ok(geolocation)
    }

    async fn insert_program(&self, new: &NewProgram) -> Result<Program, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.programs.iter().any(|p| p.name == new.name) {
            return Err(StoreError::constraint(PROGRAMS_NAME_KEY, ConstraintKind::Unique));
        }
        let now = Utc::now();
        let program = Program {
            id: next_id(tables.programs.len()),
            name: new.name.clone(),
            category: new.category.clone(),
            description: new.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.programs.push(program.clone());
        Ok(program)
    }

    async fn get_program_by_id(&self, id: i32) -> Result<Program, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        tables
            .programs
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::NoRows)
    }

    async fn update_program_by_id(&self, program: &Program) -> Result<DateTime<Utc>, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables
            .programs
            .iter()
            .any(|p| p.id != program.id && p.name == program.name)
        {
            return Err(StoreError::constraint(PROGRAMS_NAME_KEY, ConstraintKind::Unique));
        }
        let stored = tables
            .programs
            .iter_mut()
            .find(|p| p.id == program.id)
            .ok_or(StoreError::NoRows)?;
        let now = Utc::now();
        *stored = Program {
            updated_at: now,
            ..program.clone()
        };
        Ok(now)
    }

    async fn insert_household(&self, new: &NewHousehold) -> Result<Household, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.programs.iter().any(|p| p.id == new.program_id) {
            return Err(StoreError::constraint(
                HOUSEHOLDS_PROGRAM_ID_FKEY,
                ConstraintKind::ForeignKey,
            ));
        }
        if !tables
            .geolocations
            .iter()
            .any(|g| g.id == new.geo_location_id)
        {
            return Err(StoreError::constraint(
                HOUSEHOLDS_GEOLOCATION_ID_FKEY,
                ConstraintKind::ForeignKey,
            ));
        }
        let household = Household {
            id: next_id(tables.households.len()),
            program_id: new.program_id,
            geo_location_id: new.geo_location_id,
            name: new.name.clone(),
            created_at: Utc::now(),
        };
        tables.households.push(household.clone());
        Ok(household)
    }

    async fn insert_household_head(
        &self,
        new: &NewHouseholdHead,
    ) -> Result<HouseholdHead, StoreError> {
        self.check()?;
        self.head_inserts.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.lock().unwrap();
        if !tables.households.iter().any(|h| h.id == new.household_id) {
            return Err(StoreError::constraint(
                HOUSEHOLD_HEADS_HOUSEHOLD_ID_FKEY,
                ConstraintKind::ForeignKey,
            ));
        }
        if tables
            .heads
            .iter()
            .any(|h| h.household_id == new.household_id)
        {
            return Err(StoreError::constraint(
                HOUSEHOLD_HEADS_HOUSEHOLD_ID_KEY,
                ConstraintKind::Unique,
            ));
        }
        let now = Utc::now();
        let head = HouseholdHead {
            id: next_id(tables.heads.len()),
            household_id: new.household_id,
            name: new.name.clone(),
            national_id: new.national_id.clone(),
            phone_number: new.phone_number.clone(),
            age: new.age,
            created_at: now,
            updated_at: now,
        };
        tables.heads.push(head.clone());
        Ok(head)
    }

    async fn insert_household_member(
        &self,
        new: &NewHouseholdMember,
    ) -> Result<HouseholdMember, StoreError> {
        self.check()?;
        self.member_inserts.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.lock().unwrap();
        if !tables.households.iter().any(|h| h.id == new.household_id) {
            return Err(StoreError::constraint(
                HOUSEHOLD_MEMBERS_HOUSEHOLD_ID_FKEY,
                ConstraintKind::ForeignKey,
            ));
        }
        if tables.members.iter().any(|m| {
            m.household_id == new.household_id && m.name == new.name && m.relation == new.relation
        }) {
            return Err(StoreError::constraint(
                UNIQUE_HOUSEHOLD_MEMBER,
                ConstraintKind::Unique,
            ));
        }
        let now = Utc::now();
        let member = HouseholdMember {
            id: next_id(tables.members.len()),
            household_id: new.household_id,
            name: new.name.clone(),
            age: new.age,
            relation: new.relation.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.members.push(member.clone());
        Ok(member)
    }

    async fn get_household_head_by_household_id(
        &self,
        household_id: i32,
    ) -> Result<HouseholdHead, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        tables
            .heads
            .iter()
            .find(|h| h.household_id == household_id)
            .cloned()
            .ok_or(StoreError::NoRows)
    }

    async fn get_enriched_household(
        &self,
        household_id: i32,
    ) -> Result<EnrichedHousehold, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let household = tables
            .households
            .iter()
            .find(|h| h.id == household_id)
            .ok_or(StoreError::NoRows)?;
        let program = tables
            .programs
            .iter()
            .find(|p| p.id == household.program_id)
            .ok_or(StoreError::NoRows)?;
        let geolocation = tables
            .geolocations
            .iter()
            .find(|g| g.id == household.geo_location_id)
            .ok_or(StoreError::NoRows)?;
        let head = tables.heads.iter().find(|h| h.household_id == household_id);
        let member_count = tables
            .members
            .iter()
            .filter(|m| m.household_id == household_id)
            .count();
        Ok(EnrichedHousehold {
            household_id,
            program_id: program.id,
            program_name: program.name.clone(),
            geo_location_id: geolocation.id,
            county: geolocation.county.clone(),
            sub_county: geolocation.sub_county.clone(),
            household_head_id: head.map(|h| h.id),
            household_head_name: head.map(|h| h.name.clone()),
            phone_number: head.map(|h| h.phone_number.clone()),
            household_member_count: i64::try_from(member_count).unwrap(),
        })
    }
}
