//! PostgreSQL implementation of [`Store`].
//!
//! Queries are checked at runtime (no `DATABASE_URL` needed to build). Column
//! names are aliased to the model field names in SQL so the models can derive
//! `FromRow` directly.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{ConstraintKind, Store, StoreError};
use crate::crypto::TokenHash;
use crate::models::{
    EnrichedHousehold, GeoLocation, Household, HouseholdHead, HouseholdMember, Identity,
    NewGeoLocation, NewHousehold, NewHouseholdHead, NewHouseholdMember, NewProgram, Program,
};

/// Pool-backed store.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a connection pool and verify it with a first connection.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect(
        dsn: &str,
        max_connections: u32,
        idle_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(idle_timeout)
            .acquire_timeout(Duration::from_secs(10))
            .connect(dsn)
            .await?;
        Ok(Self { pool })
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: i32,
    email: String,
    name: String,
    api_key: Vec<u8>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = StoreError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let token_hash = TokenHash::try_from(row.api_key.as_slice()).map_err(|len| {
            StoreError::DataCorruption(format!(
                "api key digest for user {} has {len} bytes",
                row.id
            ))
        })?;
        Ok(Identity {
            id: row.id,
            email: row.email,
            name: row.name,
            token_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Translate a driver error into a [`StoreError`], lifting constraint names
/// out of database errors.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NoRows,
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::PoolClosed => StoreError::Canceled,
        sqlx::Error::Database(db_err) => {
            let kind = match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => ConstraintKind::Unique,
                sqlx::error::ErrorKind::ForeignKeyViolation => ConstraintKind::ForeignKey,
                _ => ConstraintKind::Other,
            };
            match db_err.constraint().map(str::to_owned) {
                Some(name) => StoreError::Constraint { name, kind },
                None => StoreError::Database(Box::new(sqlx::Error::Database(db_err))),
            }
        }
        other => StoreError::Database(Box::new(other)),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }

    async fn find_identity_by_token_hash(&self, hash: &TokenHash) -> Result<Identity, StoreError> {
        let row: IdentityRow = sqlx::query_as(
            r#"
            SELECT id, email, name, api_key, created_at, updated_at
            FROM users
            WHERE api_key = $1
            "#,
        )
        .bind(hash.as_bytes())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        row.try_into()
    }

    async fn insert_identity(
        &self,
        email: &str,
        name: &str,
        hash: &TokenHash,
    ) -> Result<Identity, StoreError> {
        let row: IdentityRow = sqlx::query_as(
            r#"
            INSERT INTO users (email, name, api_key)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, api_key, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(hash.as_bytes())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        row.try_into()
    }

    async fn insert_geolocation(&self, new: &NewGeoLocation) -> Result<GeoLocation, StoreError> {
        sqlx::query_as(
            r#"
            INSERT INTO geolocations (county, sub_county, location, sub_location)
            VALUES ($1, $2, $3, $4)
            RETURNING id, county, sub_county, location, sub_location, created_at
            "#,
        )
        .bind(new.county.as_str())
        .bind(new.sub_county.as_str())
        .bind(new.location.as_str())
        .bind(new.sub_location.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_program(&self, new: &NewProgram) -> Result<Program, StoreError> {
        sqlx::query_as(
            r#"
            INSERT INTO programs (name, category, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, category, description, created_at, updated_at
            "#,
        )
        .bind(new.name.as_str())
        .bind(new.category.as_str())
        .bind(new.description.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn get_program_by_id(&self, id: i32) -> Result<Program, StoreError> {
        sqlx::query_as(
            r#"
            SELECT id, name, category, description, created_at, updated_at
            FROM programs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn update_program_by_id(&self, program: &Program) -> Result<DateTime<Utc>, StoreError> {
        sqlx::query_scalar(
            r#"
            UPDATE programs
            SET name = $2, category = $3, description = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING updated_at
            "#,
        )
        .bind(program.id)
        .bind(program.name.as_str())
        .bind(program.category.as_str())
        .bind(program.description.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_household(&self, new: &NewHousehold) -> Result<Household, StoreError> {
        sqlx::query_as(
            r#"
            INSERT INTO households (program_id, geolocation_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, program_id, geolocation_id AS geo_location_id, name, created_at
            "#,
        )
        .bind(new.program_id)
        .bind(new.geo_location_id)
        .bind(new.name.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_household_head(
        &self,
        new: &NewHouseholdHead,
    ) -> Result<HouseholdHead, StoreError> {
        sqlx::query_as(
            r#"
            INSERT INTO household_heads (household_id, name, national_id, phone_number, age)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, household_id, name, national_id, phone_number, age,
                      created_at, updated_at
            "#,
        )
        .bind(new.household_id)
        .bind(new.name.as_str())
        .bind(new.national_id.as_str())
        .bind(new.phone_number.as_str())
        .bind(new.age)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_household_member(
        &self,
        new: &NewHouseholdMember,
    ) -> Result<HouseholdMember, StoreError> {
        sqlx::query_as(
            r#"
            INSERT INTO household_members (household_id, name, age, relation)
            VALUES ($1, $2, $3, $4)
            RETURNING id, household_id, name, age, relation, created_at, updated_at
            "#,
        )
        .bind(new.household_id)
        .bind(new.name.as_str())
        .bind(new.age)
        .bind(new.relation.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn get_household_head_by_household_id(
        &self,
        household_id: i32,
    ) -> Result<HouseholdHead, StoreError> {
        sqlx::query_as(
            r#"
            SELECT id, household_id, name, national_id, phone_number, age,
                   created_at, updated_at
            FROM household_heads
            WHERE household_id = $1
            "#,
        )
        .bind(household_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn get_enriched_household(
        &self,
        household_id: i32,
    ) -> Result<EnrichedHousehold, StoreError> {
        sqlx::query_as(
            r#"
            SELECT h.id AS household_id,
                   p.id AS program_id,
                   p.name AS program_name,
                   g.id AS geo_location_id,
                   g.county,
                   g.sub_county,
                   hh.id AS household_head_id,
                   hh.name AS household_head_name,
                   hh.phone_number,
                   (SELECT COUNT(*) FROM household_members m WHERE m.household_id = h.id)
                       AS household_member_count
            FROM households h
            JOIN programs p ON p.id = h.program_id
            JOIN geolocations g ON g.id = h.geolocation_id
            LEFT JOIN household_heads hh ON hh.household_id = h.id
            WHERE h.id = $1
            "#,
        )
        .bind(household_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}
