use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenwalk::{
    session::{PositionError, PositionSample},
    shared::{Coordinate, Distance, geo},
};

/// What the device location provider pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PositionUpdateDto {
    Sample {
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
        speed: Option<f64>,
        timestamp: Option<DateTime<Utc>>,
    },
    PermissionDenied,
    Unavailable {
        reason: String,
    },
}

impl PositionUpdateDto {
    pub fn into_update(self) -> Result<Result<PositionSample, PositionError>, geo::Error> {
        match self {
            PositionUpdateDto::Sample {
                latitude,
                longitude,
                accuracy,
                speed,
                timestamp,
            } => {
                let mut sample = PositionSample::new(Coordinate::new(latitude, longitude)?);
                if let Some(accuracy) = accuracy {
                    sample = sample.with_accuracy(Distance::from_meters(accuracy));
                }
                if let Some(speed) = speed {
                    sample = sample.with_speed(speed);
                }
                if let Some(timestamp) = timestamp {
                    sample = sample.with_timestamp(timestamp);
                }
                Ok(Ok(sample))
            }
            PositionUpdateDto::PermissionDenied => Ok(Err(PositionError::PermissionDenied)),
            PositionUpdateDto::Unavailable { reason } => {
                Ok(Err(PositionError::Unavailable(reason)))
            }
        }
    }
}
