use serde::{Deserialize, Serialize};
use serenwalk::{
    shared::Coordinate,
    zones::{Category, Severity, Zone},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDto {
    pub id: String,
    pub label: String,
    pub coordinate: Coordinate,
    pub radius_m: f64,
    pub category: Category,
    pub severity: Option<Severity>,
}

impl ZoneDto {
    pub fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id.to_string(),
            label: zone.label.to_string(),
            coordinate: zone.center,
            radius_m: zone.radius.as_meters(),
            category: zone.category,
            severity: zone.severity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyZoneDto {
    #[serde(flatten)]
    pub zone: ZoneDto,
    pub distance_m: f64,
}
