use std::{
    cmp,
    fmt::Display,
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean earth radius used by the haversine formula.
pub const EARTH_RADIUS: Distance = Distance::from_meters(6_371_000.0);

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    #[error("Invalid coordinate: {latitude}, {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl From<f64> for Distance {
    fn from(value: f64) -> Self {
        Self::from_meters(value)
    }
}

impl Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 >= 1000.0 {
            write!(f, "{:.2} km", self.as_kilometers())
        } else {
            write!(f, "{:.0} m", self.0)
        }
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }
}

/// A WGS84 position in degrees.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl Coordinate {
    /// Builds a coordinate, rejecting NaN, infinite and out of range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, self::Error> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> Result<(), self::Error> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Great-circle surface distance using the haversine formula.
    pub fn distance(&self, coord: &Self) -> Result<Distance, self::Error> {
        self.validate()?;
        coord.validate()?;
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        // Rounding can push `a` just past 1 for antipodal points.
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Ok(Distance::from_meters(EARTH_RADIUS.as_meters() * c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_eq_test() {
        let dist_a = Distance::from_meters(1000.0);
        let dist_b = Distance::from_kilometers(1.0);
        assert_eq!(dist_a, dist_b)
    }

    #[test]
    fn distance_cmp_test() {
        let dist_a = Distance::from_meters(1000.0);
        let dist_b = Distance::from_kilometers(0.5);
        assert!(dist_a > dist_b)
    }

    #[test]
    fn distance_display_test() {
        assert_eq!(Distance::from_meters(250.4).to_string(), "250 m");
        assert_eq!(Distance::from_meters(1500.0).to_string(), "1.50 km");
    }

    #[test]
    fn antipodal_is_finite() {
        let a = Coordinate::from((0.0, 0.0));
        let b = Coordinate::from((0.0, 180.0));
        let d = a.distance(&b).unwrap();
        assert!(d.as_meters().is_finite());
        assert!((d.as_kilometers() - 20_015.0).abs() < 1.0);
    }
}
