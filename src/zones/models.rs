use std::{fmt::Display, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    shared::geo::{Coordinate, Distance},
    zones,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Safe,
    Danger,
    Police,
}

impl FromStr for Category {
    type Err = zones::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" => Ok(Self::Safe),
            "danger" => Ok(Self::Danger),
            "police" => Ok(Self::Police),
            _ => Err(zones::Error::UnknownCategory(s.to_string())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Safe => f.write_str("Safe Zone"),
            Category::Danger => f.write_str("Danger Zone"),
            Category::Police => f.write_str("Police Zone"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl FromStr for Severity {
    type Err = zones::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(zones::Error::UnknownSeverity(s.to_string())),
        }
    }
}

/// A named circular zone. Immutable once it is part of a registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: Arc<str>,
    pub label: Arc<str>,
    pub center: Coordinate,
    pub radius: Distance,
    pub category: Category,
    pub severity: Option<Severity>,
}

impl Zone {
    pub fn new(
        id: impl Into<Arc<str>>,
        label: impl Into<Arc<str>>,
        center: Coordinate,
        radius: Distance,
        category: Category,
    ) -> Result<Self, zones::Error> {
        let id = id.into();
        if !center.is_valid() {
            return Err(zones::Error::InvalidCenter {
                id: id.to_string(),
                center,
            });
        }
        if !(radius.as_meters().is_finite() && radius.as_meters() > 0.0) {
            return Err(zones::Error::InvalidRadius {
                id: id.to_string(),
                radius: radius.as_meters(),
            });
        }
        Ok(Self {
            id,
            label: label.into(),
            center,
            radius,
            category,
            severity: None,
        })
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// One row of a zones csv file.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct CsvZone {
    pub zone_id: String,
    pub zone_label: String,
    pub zone_lat: f64,
    pub zone_lon: f64,
    pub zone_radius: f64,
    pub zone_category: String,
    pub zone_severity: Option<String>,
}

impl TryFrom<CsvZone> for Zone {
    type Error = zones::Error;

    fn try_from(value: CsvZone) -> Result<Self, Self::Error> {
        let category: Category = value.zone_category.parse()?;
        let zone = Zone::new(
            value.zone_id,
            value.zone_label,
            Coordinate {
                latitude: value.zone_lat,
                longitude: value.zone_lon,
            },
            Distance::from_meters(value.zone_radius),
            category,
        )?;
        match value.zone_severity.as_deref().map(str::trim) {
            None | Some("") => Ok(zone),
            Some(severity) => Ok(zone.with_severity(severity.parse()?)),
        }
    }
}
