mod routing;
mod search;
mod sessions;
mod zones;

pub use routing::*;
pub use search::*;
pub use sessions::*;
pub use zones::*;

use axum::http::StatusCode;
use serenwalk::shared::Coordinate;
use std::collections::HashMap;

pub type ApiError = (StatusCode, String);

/// Parses `lat,lon`.
fn coordinate_from_str(str: &str) -> Result<Coordinate, ApiError> {
    let bad_request = || {
        (
            StatusCode::BAD_REQUEST,
            format!("Expected a coordinate as lat,lon, got {str:?}"),
        )
    };
    let (latitude, longitude) = str.split_once(',').ok_or_else(bad_request)?;
    let latitude: f64 = latitude.trim().parse().map_err(|_| bad_request())?;
    let longitude: f64 = longitude.trim().parse().map_err(|_| bad_request())?;
    Coordinate::new(latitude, longitude).map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))
}

fn coordinate_param(params: &HashMap<String, String>, key: &str) -> Result<Coordinate, ApiError> {
    let value = params
        .get(key)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Missing {key}")))?;
    coordinate_from_str(value)
}
