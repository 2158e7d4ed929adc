//! API-key resolution and issuance.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use common::Validator;

use super::Caller;
use crate::crypto::token::{generate_api_key, hash_token, validate_token_plaintext};
use crate::crypto::ApiKey;
use crate::error::{Duplicate, Entity, RegistryError};
use crate::models::{Identity, NewIdentity};
use crate::services::bounded;
use crate::store::{constraints, Store, StoreError};

/// Resolves presented API keys to identities and issues new ones.
#[derive(Clone)]
pub struct IdentityStore {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl IdentityStore {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Look up the identity owning `plaintext`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] when no identity holds this token's digest;
    /// [`RegistryError::Storage`] (or a deadline error) when the store fails.
    pub async fn resolve_by_token(&self, plaintext: &str) -> Result<Identity, RegistryError> {
        let hash = hash_token(plaintext);
        bounded(self.timeout, async {
            match self.store.find_identity_by_token_hash(&hash).await {
                Ok(identity) => Ok(identity),
                Err(StoreError::NoRows) => Err(RegistryError::NotFound(Entity::Identity)),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// Turn the raw header value into a [`Caller`].
    ///
    /// A missing header is an anonymous caller. A header that is present but
    /// malformed or unknown is rejected outright; a malformed one never
    /// reaches the store.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidCredentials`] for a bad or unknown key; any
    /// store failure is passed through.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Caller, RegistryError> {
        let Some(plaintext) = header else {
            return Ok(Caller::Anonymous);
        };

        let mut v = Validator::new();
        validate_token_plaintext(&mut v, plaintext);
        if !v.is_valid() {
            debug!("rejected malformed api key");
            return Err(RegistryError::InvalidCredentials);
        }

        match self.resolve_by_token(plaintext).await {
            Ok(identity) => Ok(Caller::Authenticated(identity)),
            Err(RegistryError::NotFound(Entity::Identity)) => {
                debug!("rejected unknown api key");
                Err(RegistryError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    /// Register a caller and mint their API key.
    ///
    /// Only the digest is persisted; the returned [`ApiKey`] is the one and
    /// only place the plaintext appears.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ValidationFailed`], [`RegistryError::Conflict`] when
    /// the email is taken, [`RegistryError::Token`] if the RNG fails, or a
    /// store error.
    pub async fn issue(&self, new: NewIdentity) -> Result<(Identity, ApiKey), RegistryError> {
        new.validate()?;
        let key = generate_api_key()?;

        let identity = bounded(self.timeout, async {
            self.store
                .insert_identity(&new.email, &new.name, &key.hash)
                .await
                .map_err(|e| {
                    if e.violates(constraints::USERS_EMAIL_KEY) {
                        RegistryError::Conflict(Duplicate::Email)
                    } else {
                        e.into()
                    }
                })
        })
        .await?;

        info!(identity_id = identity.id, "issued api key");
        Ok((identity, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::{ConstraintKind, MockStore};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn registration(email: &str) -> NewIdentity {
        NewIdentity {
            email: email.into(),
            name: "Field Officer".into(),
        }
    }

    #[tokio::test]
    async fn missing_header_is_anonymous() {
        let mut mock = MockStore::new();
        mock.expect_find_identity_by_token_hash().never();
        let ids = IdentityStore::new(Arc::new(mock), TIMEOUT);
        assert_eq!(ids.authenticate(None).await.unwrap(), Caller::Anonymous);
    }

    #[tokio::test]
    async fn malformed_key_never_reaches_store() {
        let mut mock = MockStore::new();
        mock.expect_find_identity_by_token_hash().never();
        let ids = IdentityStore::new(Arc::new(mock), TIMEOUT);
        for bad in ["", "not-a-token", "y3ltq5mirxdivu6nvnq2rpztai"] {
            let err = ids.authenticate(Some(bad)).await.unwrap_err();
            assert!(matches!(err, RegistryError::InvalidCredentials), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn unknown_key_is_invalid_credentials() {
        let mut mock = MockStore::new();
        mock.expect_find_identity_by_token_hash()
            .times(1)
            .returning(|_| Err(StoreError::NoRows));
        let ids = IdentityStore::new(Arc::new(mock), TIMEOUT);
        let err = ids
            .authenticate(Some("Y3LTQ5MIRXDIVU6NVNQ2RPZTAI"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidCredentials));
    }

    #[tokio::test]
    async fn store_failure_is_not_masked_as_bad_credentials() {
        let mut mock = MockStore::new();
        mock.expect_find_identity_by_token_hash()
            .returning(|_| Err(StoreError::Database("connection reset".into())));
        let ids = IdentityStore::new(Arc::new(mock), TIMEOUT);
        let err = ids
            .authenticate(Some("Y3LTQ5MIRXDIVU6NVNQ2RPZTAI"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Storage(_)));
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn resolve_reports_not_found() {
        let ids = IdentityStore::new(Arc::new(MemoryStore::new()), TIMEOUT);
        let err = ids
            .resolve_by_token("Y3LTQ5MIRXDIVU6NVNQ2RPZTAI")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(Entity::Identity)));
    }

    #[tokio::test]
    async fn issued_key_authenticates() {
        let store = Arc::new(MemoryStore::new());
        let ids = IdentityStore::new(store, TIMEOUT);

        let (identity, key) = ids.issue(registration("officer@example.org")).await.unwrap();
        assert_eq!(identity.token_hash, key.hash);

        let caller = ids.authenticate(Some(&key.plaintext)).await.unwrap();
        assert_eq!(caller, Caller::Authenticated(identity));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let ids = IdentityStore::new(Arc::new(MemoryStore::new()), TIMEOUT);
        ids.issue(registration("officer@example.org")).await.unwrap();
        let err = ids
            .issue(registration("officer@example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(Duplicate::Email)));
    }

    #[tokio::test]
    async fn invalid_registration_skips_store() {
        let mut mock = MockStore::new();
        mock.expect_insert_identity().never();
        let ids = IdentityStore::new(Arc::new(mock), TIMEOUT);
        let err = ids.issue(registration("no-at-sign")).await.unwrap_err();
        assert!(matches!(err, RegistryError::ValidationFailed(ref f) if f.contains_key("email")));
    }

    #[tokio::test]
    async fn other_constraints_are_storage_errors() {
        let mut mock = MockStore::new();
        mock.expect_insert_identity().returning(|_, _, _| {
            Err(StoreError::constraint("users_api_key_key", ConstraintKind::Unique))
        });
        let ids = IdentityStore::new(Arc::new(mock), TIMEOUT);
        let err = ids
            .issue(registration("officer@example.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Storage(_)));
    }
}
