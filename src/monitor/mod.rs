use std::{collections::HashMap, fmt::Display, sync::Arc};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

mod alert;
pub use alert::*;

use crate::{
    session::PositionSample,
    shared::geo,
    zones::{Category, Zone, ZoneRegistry},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Geo(#[from] geo::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Enter,
    Exit,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Enter => f.write_str("ENTER"),
            EventKind::Exit => f.write_str("EXIT"),
        }
    }
}

/// A containment change for one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneEvent {
    pub kind: EventKind,
    pub zone_id: Arc<str>,
    pub label: Arc<str>,
    pub category: Category,
    pub at: DateTime<Utc>,
}

impl ZoneEvent {
    fn new(kind: EventKind, zone: &Zone, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            zone_id: zone.id.clone(),
            label: zone.label.clone(),
            category: zone.category,
            at,
        }
    }
}

/// Zone id to "currently inside". A zone only has an entry once it has been
/// evaluated against at least one sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainmentState(HashMap<Arc<str>, bool>);

impl ContainmentState {
    pub fn get(&self, id: &str) -> Option<bool> {
        self.0.get(id).copied()
    }

    pub fn is_inside(&self, id: &str) -> bool {
        self.get(id).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(id, inside)| (id.as_ref(), *inside))
    }

    fn insert(&mut self, id: Arc<str>, inside: bool) -> Option<bool> {
        self.0.insert(id, inside)
    }
}

/// Edge-triggered geofence state machine.
///
/// Every zone starts OUTSIDE. A sample at or within a zone's radius moves it
/// to INSIDE and yields one [`EventKind::Enter`]; leaving yields one
/// [`EventKind::Exit`]. Samples that do not change a zone yield nothing.
#[derive(Debug, Clone)]
pub struct GeofenceMonitor {
    registry: Arc<ZoneRegistry>,
    state: ContainmentState,
    stopped: bool,
}

impl GeofenceMonitor {
    pub fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self {
            registry,
            state: ContainmentState::default(),
            stopped: false,
        }
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// Evaluates one sample against every zone.
    ///
    /// Events come back in registry order. A stopped monitor ignores samples.
    /// An invalid sample leaves the state untouched.
    pub fn process(&mut self, sample: &PositionSample) -> Result<Vec<ZoneEvent>, self::Error> {
        if self.stopped {
            trace!("Monitor stopped, ignoring sample at {}", sample.coordinate);
            return Ok(Vec::new());
        }
        let position = sample.coordinate;
        position.validate()?;

        let contained: Vec<bool> = self
            .registry
            .all()
            .par_iter()
            .map(|zone| {
                zone.center
                    .distance(&position)
                    .map(|distance| distance <= zone.radius)
            })
            .collect::<Result<_, geo::Error>>()?;

        let mut events = Vec::new();
        for (zone, inside) in self.registry.all().iter().zip(contained) {
            let previous = self.state.get(&zone.id);
            if previous == Some(inside) {
                continue;
            }
            self.state.insert(zone.id.clone(), inside);
            let kind = match (previous.unwrap_or(false), inside) {
                (false, true) => EventKind::Enter,
                (true, false) => EventKind::Exit,
                _ => continue,
            };
            debug!("{kind} {} ({}) at {}", zone.id, zone.category, position);
            events.push(ZoneEvent::new(kind, zone, sample.timestamp));
        }
        Ok(events)
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn snapshot(&self) -> ContainmentState {
        self.state.clone()
    }

    pub fn is_inside(&self, id: &str) -> Option<bool> {
        self.state.get(id)
    }

    /// Zones currently contained, in registry order.
    pub fn inside(&self) -> Vec<&Zone> {
        self.registry
            .all()
            .iter()
            .filter(|zone| self.state.is_inside(&zone.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::geo::{Coordinate, Distance};

    fn registry() -> Arc<ZoneRegistry> {
        let zone = Zone::new(
            "police1",
            "Precinct 3",
            Coordinate::from((14.6, 121.0)),
            Distance::from_meters(200.0),
            Category::Police,
        )
        .unwrap();
        Arc::new(ZoneRegistry::new(vec![zone]).unwrap())
    }

    #[test]
    fn first_outside_sample_records_state_without_event() {
        let mut monitor = GeofenceMonitor::new(registry());
        assert!(monitor.snapshot().is_empty());
        let events = monitor
            .process(&PositionSample::new(Coordinate::from((15.0, 121.0))))
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(monitor.is_inside("police1"), Some(false));
    }

    #[test]
    fn invalid_sample_leaves_state_untouched() {
        let mut monitor = GeofenceMonitor::new(registry());
        let err = monitor
            .process(&PositionSample::new(Coordinate::from((f64::NAN, 121.0))))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Geo(geo::Error::InvalidCoordinate { .. })
        ));
        assert!(monitor.snapshot().is_empty());
    }
}
