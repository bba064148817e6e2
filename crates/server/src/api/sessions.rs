use std::{sync::Arc, time::Duration};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::{
    api::ApiError,
    dto::{EventsDto, PositionUpdateDto, SessionCreatedDto, SessionDto},
    state::{ActiveSession, AppState},
};

fn not_found(id: u64) -> ApiError {
    (StatusCode::NOT_FOUND, format!("No session {id}"))
}

pub async fn start_session(State(state): State<Arc<AppState>>) -> Response {
    let id = state.next_session_id();
    let session = ActiveSession::start(&state);
    state.sessions.write().await.insert(id, session);
    info!("Started session {id}");
    (StatusCode::CREATED, Json(SessionCreatedDto { id })).into_response()
}

pub async fn push_position(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<PositionUpdateDto>,
) -> Result<Response, ApiError> {
    let update = update
        .into_update()
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
    session.touch();
    session.positions.send(update).map_err(|_| {
        error!("Session {id} is no longer accepting positions");
        (StatusCode::GONE, format!("Session {id} has ended"))
    })?;
    Ok(StatusCode::ACCEPTED.into_response())
}

pub async fn session(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
    session.touch();
    let containment = session.handle.snapshot();
    let inside = state
        .registry
        .all()
        .iter()
        .filter(|zone| containment.is_inside(&zone.id))
        .map(|zone| zone.id.to_string())
        .collect();
    Ok(Json(SessionDto {
        id,
        status: session.handle.status(),
        inside,
        containment,
    })
    .into_response())
}

pub async fn events(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or_else(|| not_found(id))?;
    session.touch();
    Ok(Json(EventsDto {
        events: session.events.drain(),
    })
    .into_response())
}

pub async fn stop_session(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let session = state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| not_found(id))?;
    session.routes.clear();
    session.handle.stop().await.map_err(|err| {
        error!("Failed to stop session {id}: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    })?;
    info!("Stopped session {id}");
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn stop_removed(sessions: Vec<(u64, ActiveSession)>) {
    for (id, session) in sessions {
        session.routes.clear();
        if let Err(err) = session.handle.stop().await {
            error!("Failed to stop session {id}: {err}");
        }
    }
}

/// Stops every session, used on shutdown.
pub async fn stop_all(state: &AppState) {
    let sessions: Vec<_> = state.sessions.write().await.drain().collect();
    stop_removed(sessions).await;
}

/// Periodically stops sessions that clients have abandoned.
pub async fn evict_idle_sessions(state: Arc<AppState>) {
    let period = (state.config.session_idle_timeout / 4).max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let idle = state.evict_idle(Instant::now()).await;
        for (id, _) in &idle {
            info!("Evicting idle session {id}");
        }
        stop_removed(idle).await;
    }
}
