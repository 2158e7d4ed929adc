//! Structured logging and optional OpenTelemetry span export.
//!
//! Logs are always written to stdout as JSON. When an OTLP endpoint is
//! configured, spans are additionally exported over OTLP/gRPC.
//!
//! # Telemetry invariants
//!
//! - **No PII or key material** must appear in any span attribute or log
//!   field: no phone numbers, API-key plaintexts, or encryption keys.
//! - Log level is configurable via `RUST_LOG`, falling back to
//!   `SOCIALAID_LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
