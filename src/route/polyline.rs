//! Encoded polyline format used by directions APIs, at precision 5.

use thiserror::Error;

use crate::shared::geo::Coordinate;

const PRECISION: f64 = 1e5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Polyline ends in the middle of a value")]
    Truncated,
    #[error("Invalid polyline character {character:?} at {index}")]
    InvalidCharacter { index: usize, character: char },
    #[error("Polyline value at {index} overflows")]
    Overflow { index: usize },
}

pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, self::Error> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;
    let mut points = Vec::with_capacity(bytes.len() / 4);
    while index < bytes.len() {
        let start = index;
        latitude = latitude
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or(Error::Overflow { index: start })?;
        let start = index;
        longitude = longitude
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or(Error::Overflow { index: start })?;
        points.push(Coordinate {
            latitude: latitude as f64 / PRECISION,
            longitude: longitude as f64 / PRECISION,
        });
    }
    Ok(points)
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, self::Error> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let byte = *bytes.get(*index).ok_or(Error::Truncated)?;
        let chunk = i64::from(byte) - 63;
        if !(0..64).contains(&chunk) {
            return Err(Error::InvalidCharacter {
                index: *index,
                character: char::from(byte),
            });
        }
        if shift > 55 {
            return Err(Error::Overflow { index: *index });
        }
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *index += 1;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let (mut prev_lat, mut prev_lon) = (0i64, 0i64);
    for point in points {
        let lat = (point.latitude * PRECISION).round() as i64;
        let lon = (point.longitude * PRECISION).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lon - prev_lon, &mut out);
        prev_lat = lat;
        prev_lon = lon;
    }
    out
}

fn encode_value(value: i64, out: &mut String) {
    let mut value = if value < 0 {
        !(value << 1)
    } else {
        value << 1
    };
    while value >= 0x20 {
        out.push(char::from((0x20 | (value & 0x1f)) as u8 + 63));
        value >>= 5;
    }
    out.push(char::from(value as u8 + 63));
}
