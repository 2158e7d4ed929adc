//! The household aggregate.
//!
//! A household moves through three states: created with no head, given
//! exactly one head, then accumulating members. Each transition is a single
//! store write; the store's constraints decide conflicts and dangling
//! references, and this module translates them.
//!
//! Head phone numbers are encrypted before they reach the store and
//! decrypted on the way out. Callers only ever see plaintext.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::bounded;
use crate::auth::Caller;
use crate::crypto::FieldCipher;
use crate::error::{Duplicate, Entity, RegistryError};
use crate::models::{
    EnrichedHousehold, Household, HouseholdHead, HouseholdMember, NewHousehold, NewHouseholdHead,
    NewHouseholdMember,
};
use crate::store::{constraints, Store, StoreError};

#[derive(Clone)]
pub struct HouseholdAggregate {
    store: Arc<dyn Store>,
    cipher: FieldCipher,
    timeout: Duration,
}

impl HouseholdAggregate {
    pub fn new(store: Arc<dyn Store>, cipher: FieldCipher, timeout: Duration) -> Self {
        Self {
            store,
            cipher,
            timeout,
        }
    }

    /// Register a household under an existing program and location.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AuthenticationRequired`] for anonymous callers,
    /// [`RegistryError::NotFound`] naming `program_id` or `geo_location_id`
    /// when either reference dangles.
    pub async fn create_household(
        &self,
        caller: &Caller,
        new: NewHousehold,
    ) -> Result<Household, RegistryError> {
        let identity = caller.require_authenticated()?;
        new.validate()?;

        let household = bounded(self.timeout, async {
            self.store.insert_household(&new).await.map_err(|e| {
                if e.violates(constraints::HOUSEHOLDS_PROGRAM_ID_FKEY) {
                    RegistryError::NotFound(Entity::Program)
                } else if e.violates(constraints::HOUSEHOLDS_GEOLOCATION_ID_FKEY) {
                    RegistryError::NotFound(Entity::GeoLocation)
                } else {
                    e.into()
                }
            })
        })
        .await?;

        info!(
            household_id = household.id,
            identity_id = identity.id,
            "household created"
        );
        Ok(household)
    }

    /// Attach the head of a household.
    ///
    /// The phone number is sealed before the write, so a cipher failure
    /// leaves nothing behind. The returned head carries the plaintext number.
    pub async fn create_head(
        &self,
        caller: &Caller,
        mut new: NewHouseholdHead,
    ) -> Result<HouseholdHead, RegistryError> {
        let identity = caller.require_authenticated()?;
        new.validate()?;

        let sealed = self.cipher.encrypt(&new.phone_number)?;
        let phone_number = std::mem::replace(&mut new.phone_number, sealed);

        let mut head = bounded(self.timeout, async {
            self.store.insert_household_head(&new).await.map_err(|e| {
                if e.violates(constraints::HOUSEHOLD_HEADS_HOUSEHOLD_ID_FKEY) {
                    RegistryError::NotFound(Entity::Household)
                } else if e.violates(constraints::HOUSEHOLD_HEADS_HOUSEHOLD_ID_KEY) {
                    RegistryError::Conflict(Duplicate::HeadAlreadyExists)
                } else {
                    e.into()
                }
            })
        })
        .await?;
        head.phone_number = phone_number;

        info!(
            household_id = head.household_id,
            head_id = head.id,
            identity_id = identity.id,
            "household head created"
        );
        Ok(head)
    }

    /// Add a member to a household that already has a head.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] with [`Entity::HouseholdHead`] when the
    /// household has no head yet (no insert is attempted), and
    /// [`RegistryError::Conflict`] for a repeated `(name, relation)`.
    pub async fn create_member(
        &self,
        caller: &Caller,
        new: NewHouseholdMember,
    ) -> Result<HouseholdMember, RegistryError> {
        let identity = caller.require_authenticated()?;
        new.validate()?;

        let member = bounded(self.timeout, async {
            match self
                .store
                .get_household_head_by_household_id(new.household_id)
                .await
            {
                Ok(_) => {}
                Err(StoreError::NoRows) => {
                    return Err(RegistryError::NotFound(Entity::HouseholdHead))
                }
                Err(e) => return Err(e.into()),
            }

            self.store.insert_household_member(&new).await.map_err(|e| {
                if e.violates(constraints::UNIQUE_HOUSEHOLD_MEMBER) {
                    RegistryError::Conflict(Duplicate::MemberAlreadyExists)
                } else if e.violates(constraints::HOUSEHOLD_MEMBERS_HOUSEHOLD_ID_FKEY) {
                    RegistryError::NotFound(Entity::Household)
                } else {
                    e.into()
                }
            })
        })
        .await?;

        info!(
            household_id = member.household_id,
            member_id = member.id,
            identity_id = identity.id,
            "household member created"
        );
        Ok(member)
    }

    /// Read the joined household view with the head's phone number decrypted.
    pub async fn get_enriched(
        &self,
        caller: &Caller,
        household_id: i32,
    ) -> Result<EnrichedHousehold, RegistryError> {
        caller.require_authenticated()?;

        let mut household = bounded(self.timeout, async {
            match self.store.get_enriched_household(household_id).await {
                Ok(household) => Ok(household),
                Err(StoreError::NoRows) => Err(RegistryError::NotFound(Entity::Household)),
                Err(e) => Err(e.into()),
            }
        })
        .await?;

        if let Some(sealed) = household.phone_number.take() {
            household.phone_number = Some(self.cipher.decrypt(&sealed)?);
        }
        Ok(household)
    }
}
