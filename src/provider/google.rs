use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    provider::{
        self, AutocompleteProvider, AutocompleteRequest, DirectionsProvider, DirectionsRequest,
        DirectionsResponse, Route, Suggestion,
    },
    shared::geo::{Coordinate, Distance},
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Google Directions and Place Autocomplete over HTTP.
#[derive(Debug, Clone)]
pub struct GoogleMaps {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleMaps {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    /// Points the provider at another host, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u8>, provider::Error> {
        let mut params: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        params.push(("key", self.api_key.as_str()));
        let url = Url::parse_with_params(&format!("{}/{}", self.base_url, path), &params)
            .map_err(|err| provider::Error::Url(err.to_string()))?;
        debug!("GET {}/{}", self.base_url, path);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            warn!("{path} responded with {}", response.status());
            return Err(provider::Error::Http(response.status().as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn lat_lng(coordinate: &Coordinate) -> String {
    format!("{},{}", coordinate.latitude, coordinate.longitude)
}

impl DirectionsProvider for GoogleMaps {
    async fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, provider::Error> {
        let body = self
            .get(
                "directions/json",
                &[
                    ("origin", lat_lng(&request.origin)),
                    ("destination", lat_lng(&request.destination)),
                    ("mode", request.mode.to_string()),
                ],
            )
            .await?;
        parse_directions(&body)
    }
}

impl AutocompleteProvider for GoogleMaps {
    async fn autocomplete(
        &self,
        request: &AutocompleteRequest,
    ) -> Result<Vec<Suggestion>, provider::Error> {
        let mut params = vec![("input", request.input.clone())];
        if let Some(country) = &request.country {
            params.push(("components", format!("country:{country}")));
        }
        let body = self.get("place/autocomplete/json", &params).await?;
        parse_autocomplete(&body)
    }
}

#[derive(Deserialize)]
struct GoogleDirections {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<GoogleRoute>,
}

#[derive(Deserialize)]
struct GoogleRoute {
    #[serde(default)]
    summary: String,
    overview_polyline: GooglePolyline,
    #[serde(default)]
    legs: Vec<GoogleLeg>,
}

#[derive(Deserialize)]
struct GooglePolyline {
    points: String,
}

#[derive(Deserialize)]
struct GoogleLeg {
    distance: GoogleValue,
    duration: GoogleValue,
}

#[derive(Deserialize)]
struct GoogleValue {
    value: f64,
}

#[derive(Deserialize)]
struct GoogleAutocomplete {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<GooglePrediction>,
}

#[derive(Deserialize)]
struct GooglePrediction {
    place_id: String,
    description: String,
}

fn check_status(status: String, message: Option<String>) -> Result<(), provider::Error> {
    match status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(()),
        _ => Err(provider::Error::Status {
            status,
            message: message.unwrap_or_default(),
        }),
    }
}

pub(crate) fn parse_directions(body: &[u8]) -> Result<DirectionsResponse, provider::Error> {
    let parsed: GoogleDirections = serde_json::from_slice(body)?;
    check_status(parsed.status, parsed.error_message)?;
    let routes = parsed
        .routes
        .into_iter()
        .map(|route| -> Result<Route, provider::Error> {
            let (meters, seconds) = route.legs.iter().fold((0.0, 0.0), |(m, s), leg| {
                (m + leg.distance.value, s + leg.duration.value)
            });
            let duration = Duration::try_from_secs_f64(seconds.max(0.0)).map_err(|err| {
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "route duration {seconds}: {err}"
                ))
            })?;
            Ok(Route {
                polyline: route.overview_polyline.points,
                distance: Distance::from_meters(meters),
                duration,
                summary: route.summary,
            })
        })
        .collect::<Result<_, provider::Error>>()?;
    Ok(DirectionsResponse { routes })
}

pub(crate) fn parse_autocomplete(body: &[u8]) -> Result<Vec<Suggestion>, provider::Error> {
    let parsed: GoogleAutocomplete = serde_json::from_slice(body)?;
    check_status(parsed.status, parsed.error_message)?;
    Ok(parsed
        .predictions
        .into_iter()
        .map(|prediction| Suggestion {
            place_id: prediction.place_id,
            description: prediction.description,
        })
        .collect())
}
