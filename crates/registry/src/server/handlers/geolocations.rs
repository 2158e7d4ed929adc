use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use common::protocol::CreateGeoLocationRequest;
use serde_json::{json, Value};

use crate::server::{response::ApiError, state::AppState};

/// `POST /v1/geo_locations`
pub async fn create_geolocation(
    State(state): State<AppState>,
    payload: Result<Json<CreateGeoLocationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload?;
    let geolocation = state.geolocations.create(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "geo_location": geolocation })),
    ))
}
