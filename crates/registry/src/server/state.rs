//! Shared application state injected into every Axum handler.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;

use crate::auth::IdentityStore;
use crate::crypto::FieldCipher;
use crate::services::{GeoLocationService, HouseholdAggregate, ProgramService};
use crate::store::Store;

/// Application state shared across all request handlers.
///
/// Every field is `Arc`-backed, so Axum can clone the state per request
/// without copying anything expensive.
#[derive(Clone)]
pub struct AppState {
    /// Kept for readiness checks; the services hold their own handle.
    pub store: Arc<dyn Store>,
    pub identities: IdentityStore,
    pub programs: ProgramService,
    pub geolocations: GeoLocationService,
    pub households: HouseholdAggregate,
    /// Request header carrying the caller's API key.
    pub api_key_header: HeaderName,
    pub operation_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        cipher: FieldCipher,
        api_key_header: HeaderName,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            identities: IdentityStore::new(store.clone(), operation_timeout),
            programs: ProgramService::new(store.clone(), operation_timeout),
            geolocations: GeoLocationService::new(store.clone(), operation_timeout),
            households: HouseholdAggregate::new(store.clone(), cipher, operation_timeout),
            store,
            api_key_header,
            operation_timeout,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over a fresh in-memory store with a random 256-bit key.
    pub fn for_tests() -> (Self, Arc<crate::store::memory::MemoryStore>) {
        use crate::crypto::key::generate_key_hex;

        let store = Arc::new(crate::store::memory::MemoryStore::new());
        let cipher = FieldCipher::from_hex(&generate_key_hex(32).unwrap()).unwrap();
        let state = Self::new(
            store.clone(),
            cipher,
            HeaderName::from_static("apikey"),
            Duration::from_secs(5),
        );
        (state, store)
    }
}
