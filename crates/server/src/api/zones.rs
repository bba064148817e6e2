use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serenwalk::shared::Distance;

use crate::{
    api::{ApiError, coordinate_param},
    dto::{NearbyZoneDto, ZoneDto},
    state::AppState,
};

pub async fn zones(State(state): State<Arc<AppState>>) -> Response {
    let result: Vec<_> = state.registry.all().iter().map(ZoneDto::from).collect();
    Json(result).into_response()
}

pub async fn near(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let at = coordinate_param(&params, "at")?;
    let radius: f64 = match params.get("radius") {
        Some(value) => match value.parse() {
            Ok(value) => value,
            Err(_) => return Err((StatusCode::BAD_REQUEST, format!("Bad radius {value}"))),
        },
        None => 1000.0,
    };
    let found = state
        .registry
        .near(&at, Distance::from_meters(radius))
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    let result: Vec<_> = found
        .into_iter()
        .map(|(zone, distance)| NearbyZoneDto {
            zone: ZoneDto::from(zone),
            distance_m: distance.as_meters(),
        })
        .collect();
    Ok(Json(result).into_response())
}
