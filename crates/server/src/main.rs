mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::{get, post};
use serenwalk::prelude::*;
use std::{sync::Arc, time::Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting server...");
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Bad configuration: {err}");
            std::process::exit(1);
        }
    };
    let args: Vec<_> = std::env::args().collect();
    if let Some(path) = args.get(1) {
        config.zones_path = path.into();
    }

    info!("Loading zones...");
    let now = Instant::now();
    let registry = match ZoneRegistry::from_csv_path(&config.zones_path) {
        Ok(registry) => registry,
        Err(err) => {
            error!("Failed to load {}: {err}", config.zones_path.display());
            std::process::exit(1);
        }
    };
    info!("Loading zones took {:?}", now.elapsed());

    let maps = match &config.maps_api_key {
        Some(key) => GoogleMaps::new(key.clone()),
        None => {
            warn!("GOOGLE_MAPS_API_KEY is not set, routes and autocomplete will fail");
            GoogleMaps::new("")
        }
    };
    let port = config.port;
    let state = Arc::new(AppState::new(config, registry, maps));
    let sweeper = tokio::spawn(api::evict_idle_sessions(state.clone()));

    let app = axum::Router::new()
        .route("/zones", get(api::zones))
        .route("/zones/near", get(api::near))
        .route("/autocomplete", get(api::autocomplete))
        .route("/sessions", post(api::start_session))
        .route(
            "/sessions/{id}",
            get(api::session).delete(api::stop_session),
        )
        .route("/sessions/{id}/positions", post(api::push_position))
        .route("/sessions/{id}/events", get(api::events))
        .route(
            "/sessions/{id}/route",
            get(api::current_route).post(api::routing),
        )
        .with_state(state.clone());
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {port}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {port}");
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown: {err}");
        }
    };
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!("Server error: {err}");
    }
    sweeper.abort();
    info!("Stopping sessions...");
    api::stop_all(&state).await;
}
