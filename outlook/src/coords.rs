//! Decoding the fixed-width coordinate groups of a bulletin.
//!
//! Each coordinate is eight digits: four for latitude and four for longitude,
//! both in hundredths of a degree. Longitudes are all west (so negative), and
//! the leading "1" of longitudes past 100°W is dropped: `0512` means 105.12°W.

use planar::Point;
use serde::Serialize;

/// The latitude that separates one polyline from the next.
pub const SENTINEL_LAT: f64 = 99.99;

/// A latitude and longitude, in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coordinate {
    /// Degrees north.
    pub lat: f64,
    /// Degrees east (so negative, for bulletins).
    pub lon: f64,
}

impl Coordinate {
    /// Decodes an eight-digit group. Returns `None` if it isn't exactly eight ASCII digits.
    pub fn decode(group: &str) -> Option<Coordinate> {
        if group.len() != 8 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let lat = group[..4].parse::<u16>().ok()? as f64 / 100.0;
        let lon = group[4..].parse::<u16>().ok()? as f64 / 100.0;
        let lon = if lon < 50.0 { -(lon + 100.0) } else { -lon };
        Some(Coordinate { lat, lon })
    }

    /// Encodes this coordinate back into eight digits.
    pub fn encode(&self) -> String {
        let lon = -self.lon;
        let lon = if lon >= 100.0 { lon - 100.0 } else { lon };
        format!(
            "{:04}{:04}",
            (self.lat * 100.0).round() as u32,
            (lon * 100.0).round() as u32
        )
    }

    /// Is this the separator between polylines rather than a real coordinate?
    pub fn is_sentinel(&self) -> bool {
        self.lat == SENTINEL_LAT
    }

    /// The planar point for this coordinate: longitude is `x`, latitude is `y`.
    pub fn to_point(self) -> Point {
        Point::new(self.lon, self.lat)
    }
}
