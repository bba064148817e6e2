use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod polyline;

use crate::{
    provider::{self, DirectionsProvider, DirectionsRequest, DirectionsResponse},
    shared::geo::{self, Coordinate, Distance},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route unavailable: {0}")]
    RouteUnavailable(#[from] Unavailable),
    #[error("Route request was superseded by a newer request")]
    Superseded,
    #[error(transparent)]
    Geo(#[from] geo::Error),
}

/// Why a directions fetch produced no route.
#[derive(Error, Debug)]
pub enum Unavailable {
    #[error(transparent)]
    Provider(#[from] provider::Error),
    #[error("Directions timed out after {0:?}")]
    Timeout(Duration),
    #[error("No routes returned")]
    NoRoutes,
    #[error(transparent)]
    Polyline(#[from] polyline::Error),
    #[error("Route point out of range: {0}")]
    InvalidPoint(geo::Error),
}

/// A decoded walking path, replaced as a whole on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOverlay {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub points: Arc<[Coordinate]>,
    pub distance: Distance,
    pub duration: Duration,
    pub summary: String,
}

impl RouteOverlay {
    fn from_response(
        request: &DirectionsRequest,
        response: DirectionsResponse,
    ) -> Result<Self, Unavailable> {
        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or(Unavailable::NoRoutes)?;
        let points = polyline::decode(&route.polyline)?;
        if points.is_empty() {
            return Err(Unavailable::NoRoutes);
        }
        points
            .iter()
            .try_for_each(Coordinate::validate)
            .map_err(Unavailable::InvalidPoint)?;
        Ok(Self {
            origin: request.origin,
            destination: request.destination,
            points: points.into(),
            distance: route.distance,
            duration: route.duration,
            summary: route.summary,
        })
    }
}

/// Fetches routes and owns the current overlay.
///
/// Requests may overlap. Each one takes a generation number and only the
/// newest generation may write the overlay, so a slow stale response can
/// never replace a fresher one.
pub struct RouteOverlayBuilder<P> {
    provider: P,
    timeout: Duration,
    generation: AtomicU64,
    overlay: Mutex<Option<RouteOverlay>>,
}

impl<P: DirectionsProvider> RouteOverlayBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
            generation: AtomicU64::new(0),
            overlay: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetches walking directions and replaces the overlay.
    ///
    /// On failure the overlay is cleared rather than left showing a path to
    /// some earlier destination.
    pub async fn request(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteOverlay, self::Error> {
        origin.validate()?;
        destination.validate()?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let request = DirectionsRequest::walking(origin, destination);
        debug!("Route request #{generation} from {origin} to {destination}");

        let result =
            match tokio::time::timeout(self.timeout, self.provider.directions(&request)).await {
                Ok(Ok(response)) => RouteOverlay::from_response(&request, response),
                Ok(Err(err)) => Err(Unavailable::Provider(err)),
                Err(_) => Err(Unavailable::Timeout(self.timeout)),
            };

        let mut overlay = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding superseded route response #{generation}");
            return Err(Error::Superseded);
        }
        match result {
            Ok(route) => {
                info!(
                    "Route to {destination}: {} points, {}",
                    route.points.len(),
                    route.distance
                );
                *overlay = Some(route.clone());
                Ok(route)
            }
            Err(cause) => {
                warn!("No route to {destination}: {cause}");
                *overlay = None;
                Err(cause.into())
            }
        }
    }

    pub fn current(&self) -> Option<RouteOverlay> {
        self.lock().clone()
    }

    /// Drops the overlay. Requests still in flight are superseded.
    pub fn clear(&self) {
        let mut overlay = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *overlay = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<RouteOverlay>> {
        self.overlay.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
