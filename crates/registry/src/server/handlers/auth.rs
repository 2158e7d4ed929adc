use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use common::protocol::{ApiKeyResponse, RegisterRequest};
use serde_json::{json, Value};

use crate::server::{response::ApiError, state::AppState};

/// `POST /v1/register`: create a caller and return their API key.
///
/// This is the only response that ever contains the key's plaintext.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload?;
    let (user, key) = state.identities.issue(req.into()).await?;
    let api_key = ApiKeyResponse {
        token: key.plaintext,
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({ "api_key": api_key, "user": user })),
    ))
}
