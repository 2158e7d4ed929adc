//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Resolve the caller's API key into a [`crate::auth::Caller`] per request.
//! - Map [`crate::error::RegistryError`] onto JSON error responses.
//! - Inject shared application state (`AppState`) into handlers.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;
