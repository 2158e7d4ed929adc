//! Household routes. All of them sit behind the authentication middleware.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use common::protocol::{
    CreateHouseholdHeadRequest, CreateHouseholdMemberRequest, CreateHouseholdRequest,
};
use serde_json::{json, Value};

use crate::server::{extract::CurrentCaller, response::ApiError, state::AppState};

/// `POST /v1/house_holds`
pub async fn create_household(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    payload: Result<Json<CreateHouseholdRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    caller.require_authenticated()?;
    let Json(req) = payload?;
    let household = state.households.create_household(&caller, req.into()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "house_hold": household }))))
}

/// `POST /v1/house_holds/head`
pub async fn create_head(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    payload: Result<Json<CreateHouseholdHeadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    caller.require_authenticated()?;
    let Json(req) = payload?;
    let head = state.households.create_head(&caller, req.into()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "house_hold_head": head }))))
}

/// `POST /v1/house_holds/member`
pub async fn create_member(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    payload: Result<Json<CreateHouseholdMemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    caller.require_authenticated()?;
    let Json(req) = payload?;
    let member = state.households.create_member(&caller, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "house_hold_member": member })),
    ))
}

/// `GET /v1/house_holds/:id`
pub async fn get_household(
    State(state): State<AppState>,
    CurrentCaller(caller): CurrentCaller,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    caller.require_authenticated()?;
    let Path(id) = id?;
    let household = state.households.get_enriched(&caller, id).await?;
    Ok(Json(json!({ "house_hold": household })))
}
