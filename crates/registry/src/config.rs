//! Configuration loading and validation for the registry service.
//!
//! All values are read from `SOCIALAID_`-prefixed environment variables at
//! startup. The process exits with a clear error message if any required
//! variable is missing or invalid.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue};
use serde::Deserialize;

use crate::crypto::key::decode_key;

const ENV_PREFIX: &str = "SOCIALAID";
const ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];

/// Validated registry configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// PostgreSQL connection string. **Required.**
    pub db_dsn: String,

    /// Hex-encoded AES key (16, 24, or 32 bytes) for phone-number encryption.
    /// **Required.**
    pub data_encryption_key: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// `development`, `staging`, or `production`.
    #[serde(default = "default_env")]
    pub env: String,

    #[serde(default = "default_db_max_open_conns")]
    pub db_max_open_conns: u32,

    /// How long a pooled connection may sit idle before it is closed.
    #[serde(default = "default_db_max_idle_time_secs")]
    pub db_max_idle_time_secs: u64,

    /// Deadline for each registry operation.
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,

    /// Request header carrying the caller's API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Space-separated list of origins allowed by CORS.
    #[serde(default)]
    pub cors_trusted_origins: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP collector endpoint. Spans are only exported when set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_port() -> u16 {
    4000
}
fn default_env() -> String {
    "development".into()
}
fn default_db_max_open_conns() -> u32 {
    25
}
fn default_db_max_idle_time_secs() -> u64 {
    900
}
fn default_operation_timeout_secs() -> u64 {
    5
}
fn default_api_key_header() -> String {
    "ApiKey".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_dsn", &"[REDACTED]")
            .field("data_encryption_key", &"[REDACTED]")
            .field("port", &self.port)
            .field("env", &self.env)
            .field("db_max_open_conns", &self.db_max_open_conns)
            .field("db_max_idle_time_secs", &self.db_max_idle_time_secs)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .field("api_key_header", &self.api_key_header)
            .field("cors_trusted_origins", &self.cors_trusted_origins)
            .field("log_level", &self.log_level)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.db_dsn, "SOCIALAID_DB_DSN")?;
        ensure_non_empty(&self.data_encryption_key, "SOCIALAID_DATA_ENCRYPTION_KEY")?;

        // The key itself must never end up in the error chain.
        decode_key(&self.data_encryption_key)
            .map_err(|e| anyhow::anyhow!("SOCIALAID_DATA_ENCRYPTION_KEY is unusable: {e}"))?;

        if !ENVIRONMENTS.contains(&self.env.as_str()) {
            anyhow::bail!(
                "SOCIALAID_ENV must be one of {}, got {:?}",
                ENVIRONMENTS.join("|"),
                self.env
            );
        }
        if self.db_max_open_conns == 0 {
            anyhow::bail!("SOCIALAID_DB_MAX_OPEN_CONNS must be > 0");
        }
        if self.operation_timeout_secs == 0 {
            anyhow::bail!("SOCIALAID_OPERATION_TIMEOUT_SECS must be > 0");
        }
        self.api_key_header()?;
        self.trusted_origins()?;
        Ok(())
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn db_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.db_max_idle_time_secs)
    }

    /// The API key header as a typed name. Header names are case-insensitive
    /// and stored lowercased.
    pub fn api_key_header(&self) -> Result<HeaderName> {
        HeaderName::from_bytes(self.api_key_header.to_ascii_lowercase().as_bytes())
            .with_context(|| {
                format!(
                    "SOCIALAID_API_KEY_HEADER {:?} is not a valid header name",
                    self.api_key_header
                )
            })
    }

    pub fn trusted_origins(&self) -> Result<Vec<HeaderValue>> {
        self.cors_trusted_origins
            .split_whitespace()
            .map(|origin| {
                HeaderValue::from_str(origin).with_context(|| {
                    format!("SOCIALAID_CORS_TRUSTED_ORIGINS entry {origin:?} is not a valid origin")
                })
            })
            .collect()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
