//! Axum middleware layers applied to the router.
//!
//! Request tracing, timeout enforcement, and response compression are
//! `tower-http` layers wired in [`super::router`]; caller authentication
//! lives here.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use tracing::debug;

use super::{response::ApiError, state::AppState};
use crate::error::RegistryError;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolve the API key header into a [`crate::auth::Caller`] and stash it in
/// the request extensions.
///
/// A missing header passes through as anonymous; the household operations
/// decide whether that is acceptable. A present but bad key is rejected here.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let vary = HeaderValue::from(state.api_key_header.clone());

    let presented = match req.headers().get(&state.api_key_header) {
        None => None,
        Some(value) => match value.to_str() {
            Ok(s) => Some(s.to_owned()),
            Err(_) => {
                let mut resp = ApiError::from(RegistryError::InvalidCredentials).into_response();
                resp.headers_mut().append(header::VARY, vary);
                return resp;
            }
        },
    };

    let mut resp = match state.identities.authenticate(presented.as_deref()).await {
        Ok(caller) => {
            debug!(anonymous = caller.is_anonymous(), "caller resolved");
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        Err(e) => ApiError::from(e).into_response(),
    };
    resp.headers_mut().append(header::VARY, vary);
    resp
}
