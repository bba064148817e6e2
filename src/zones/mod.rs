use std::{collections::HashMap, fs::File, io, path::Path, sync::Arc};

use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

mod models;
pub use models::*;

use crate::shared::geo::{Coordinate, Distance};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Zone {id} has an invalid radius: {radius}")]
    InvalidRadius { id: String, radius: f64 },
    #[error("Zone {id} has an invalid center: {center}")]
    InvalidCenter { id: String, center: Coordinate },
    #[error("Zone id {0} is used more than once")]
    DuplicateId(String),
    #[error("Unknown zone category: {0}")]
    UnknownCategory(String),
    #[error("Unknown zone severity: {0}")]
    UnknownSeverity(String),
    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<Error>,
    },
}

/// The ordered, read-only set of zones for a navigation session.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    zones: Arc<[Zone]>,
    lookup: Arc<HashMap<Arc<str>, usize>>,
}

impl ZoneRegistry {
    pub fn new(zones: Vec<Zone>) -> Result<Self, self::Error> {
        let mut lookup: HashMap<Arc<str>, usize> = HashMap::with_capacity(zones.len());
        for (i, zone) in zones.iter().enumerate() {
            if lookup.insert(zone.id.clone(), i).is_some() {
                return Err(Error::DuplicateId(zone.id.to_string()));
            }
        }
        Ok(Self {
            zones: zones.into(),
            lookup: lookup.into(),
        })
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, self::Error> {
        let file = File::open(path.as_ref())?;
        let registry = Self::from_csv_reader(file)?;
        info!(
            "Loaded {} zones from {}",
            registry.len(),
            path.as_ref().display()
        );
        Ok(registry)
    }

    /// Rows keep their file order. The first bad row fails the whole load.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, self::Error> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut zones: Vec<Zone> = Vec::new();
        for (i, result) in rdr.deserialize::<CsvZone>().enumerate() {
            // Header is line 1
            let row = i + 2;
            let zone = result
                .map_err(Error::from)
                .and_then(Zone::try_from)
                .map_err(|err| Error::Row {
                    row,
                    source: Box::new(err),
                })?;
            zones.push(zone);
        }
        Self::new(zones)
    }

    pub fn all(&self) -> &[Zone] {
        &self.zones
    }

    pub fn get(&self, id: &str) -> Option<&Zone> {
        let index = self.lookup.get(id)?;
        Some(&self.zones[*index])
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones whose center lies within `distance` of `coordinate`, nearest first.
    pub fn near(
        &self,
        coordinate: &Coordinate,
        distance: Distance,
    ) -> Result<Vec<(&Zone, Distance)>, crate::shared::geo::Error> {
        coordinate.validate()?;
        let mut found: Vec<(&Zone, Distance)> = self
            .zones
            .par_iter()
            .filter_map(|zone| {
                let d = zone.center.distance(coordinate).ok()?;
                (d <= distance).then_some((zone, d))
            })
            .collect();
        found.sort_by(|(_, a), (_, b)| a.as_meters().total_cmp(&b.as_meters()));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_radius() {
        let err = Zone::new(
            "z",
            "Zero",
            Coordinate::from((14.0, 121.0)),
            Distance::from_meters(0.0),
            Category::Safe,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRadius { .. }));
    }

    #[test]
    fn rejects_invalid_center() {
        let err = Zone::new(
            "z",
            "Nowhere",
            Coordinate::from((91.0, 121.0)),
            Distance::from_meters(10.0),
            Category::Police,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCenter { .. }));
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("DANGER".parse::<Category>().unwrap(), Category::Danger);
        assert_eq!(" police ".parse::<Category>().unwrap(), Category::Police);
        assert!("unsafe".parse::<Category>().is_err());
    }
}
