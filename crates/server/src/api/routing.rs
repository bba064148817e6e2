use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serenwalk::route::{self, RouteOverlay};
use tracing::{error, warn};

use crate::{
    api::{ApiError, coordinate_param},
    state::AppState,
};

pub async fn routing(
    Path(id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let from = coordinate_param(&params, "from")?;
    let to = coordinate_param(&params, "to")?;

    let routes = state
        .sessions
        .read()
        .await
        .get(&id)
        .map(|session| {
            session.touch();
            session.routes.clone()
        })
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No session {id}")))?;

    match routes.request(from, to).await {
        Ok(overlay) => Ok(Json(overlay).into_response()),
        Err(route::Error::Superseded) => {
            warn!("Route request for session {id} superseded");
            Err((StatusCode::CONFLICT, route::Error::Superseded.to_string()))
        }
        Err(err @ route::Error::Geo(_)) => Err((StatusCode::BAD_REQUEST, err.to_string())),
        Err(err @ route::Error::RouteUnavailable(_)) => {
            error!("Route for session {id}: {err}");
            Err((StatusCode::BAD_GATEWAY, err.to_string()))
        }
    }
}

pub async fn current_route(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No session {id}")))?;
    session.touch();
    let overlay: Option<RouteOverlay> = session.routes.current();
    Ok(Json(overlay).into_response())
}
