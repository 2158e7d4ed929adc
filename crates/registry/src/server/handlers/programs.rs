use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use common::protocol::{CreateProgramRequest, UpdateProgramRequest};
use serde_json::{json, Value};

use crate::server::{response::ApiError, state::AppState};

/// `POST /v1/programs`
pub async fn create_program(
    State(state): State<AppState>,
    payload: Result<Json<CreateProgramRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload?;
    let program = state.programs.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "program": program }))))
}

/// `PATCH /v1/programs/:id`. Only the supplied fields change.
pub async fn update_program(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateProgramRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let program = state.programs.update(id, req.into()).await?;
    Ok(Json(json!({ "program": program })))
}
