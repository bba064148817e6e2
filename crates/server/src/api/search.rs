use std::{collections::HashMap, sync::Arc};

use crate::{api::ApiError, state::AppState};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serenwalk::provider::{AutocompleteProvider, AutocompleteRequest};
use tracing::error;

pub async fn autocomplete(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    if let Some(query) = params.get("q").filter(|query| !query.trim().is_empty()) {
        let count: usize = match params.get("count") {
            Some(value) => match value.parse() {
                Ok(value) => value,
                Err(_) => return Err((StatusCode::BAD_REQUEST, format!("Bad count {value}"))),
            },
            None => 5,
        };
        let request = AutocompleteRequest {
            input: query.clone(),
            country: Some(state.config.country.clone()),
        };
        let result: Vec<_> = state
            .maps
            .autocomplete(&request)
            .await
            .map_err(|err| {
                error!("Autocomplete failed: {err}");
                (StatusCode::BAD_GATEWAY, err.to_string())
            })?
            .into_iter()
            .take(count)
            .collect();
        Ok(Json(result).into_response())
    } else {
        Err((StatusCode::BAD_REQUEST, "Missing q".into()))
    }
}
