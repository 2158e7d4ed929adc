//! Administrative locations.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::bounded;
use crate::error::{Duplicate, RegistryError};
use crate::models::{GeoLocation, NewGeoLocation};
use crate::store::{constraints, Store};

#[derive(Clone)]
pub struct GeoLocationService {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl GeoLocationService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// # Errors
    ///
    /// [`RegistryError::Conflict`] if the sub-location is already registered.
    pub async fn create(&self, new: NewGeoLocation) -> Result<GeoLocation, RegistryError> {
        new.validate()?;
        let geolocation = bounded(self.timeout, async {
            self.store.insert_geolocation(&new).await.map_err(|e| {
                if e.violates(constraints::GEOLOCATIONS_SUB_LOCATION_KEY) {
                    RegistryError::Conflict(Duplicate::GeoLocation)
                } else {
                    e.into()
                }
            })
        })
        .await?;
        info!(geo_location_id = geolocation.id, "geo location created");
        Ok(geolocation)
    }
}
