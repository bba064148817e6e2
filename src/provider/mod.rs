use std::{fmt::Display, future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod google;
pub use google::*;

use crate::shared::geo::{Coordinate, Distance};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider responded with HTTP {0}")]
    Http(u16),
    #[error("Provider returned status {status}: {message}")]
    Status { status: String, message: String },
    #[error("Could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid provider url: {0}")]
    Url(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    #[default]
    Walking,
    Driving,
    Bicycling,
    Transit,
}

impl Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelMode::Walking => f.write_str("walking"),
            TravelMode::Driving => f.write_str("driving"),
            TravelMode::Bicycling => f.write_str("bicycling"),
            TravelMode::Transit => f.write_str("transit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TravelMode,
}

impl DirectionsRequest {
    pub fn walking(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
            mode: TravelMode::Walking,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Encoded polyline of the whole route.
    pub polyline: String,
    pub distance: Distance,
    pub duration: Duration,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResponse {
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteRequest {
    pub input: String,
    /// ISO 3166-1 alpha-2 country filter, e.g. `ph`.
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub place_id: String,
    pub description: String,
}

/// Walking directions between two points.
pub trait DirectionsProvider: Send + Sync {
    fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> impl Future<Output = Result<DirectionsResponse, self::Error>> + Send;
}

/// Place suggestions for a partially typed destination.
pub trait AutocompleteProvider: Send + Sync {
    fn autocomplete(
        &self,
        request: &AutocompleteRequest,
    ) -> impl Future<Output = Result<Vec<Suggestion>, self::Error>> + Send;
}
