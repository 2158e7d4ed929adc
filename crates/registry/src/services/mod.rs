//! Registry operations.
//!
//! Each service owns an `Arc<dyn Store>` and runs every store round-trip
//! under the configured operation deadline. Constraint violations coming
//! back from the store are translated into [`RegistryError`] here.

pub mod geolocations;
pub mod households;
pub mod programs;

pub use geolocations::GeoLocationService;
pub use households::HouseholdAggregate;
pub use programs::ProgramService;

use std::future::Future;
use std::time::Duration;

use crate::error::RegistryError;

/// Run `op` under `limit`; an expired deadline drops the in-flight call and
/// yields [`RegistryError::Timeout`].
pub(crate) async fn bounded<T, F>(limit: Duration, op: F) -> Result<T, RegistryError>
where
    F: Future<Output = Result<T, RegistryError>>,
{
    tokio::time::timeout(limit, op)
        .await
        .unwrap_or(Err(RegistryError::Timeout))
}
