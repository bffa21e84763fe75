//! Great-circle distance and coordinate bucketing helpers.
//!
//! Longitude spans are widened by `1 / cos(lat)` so a box keeps roughly the
//! same physical width regardless of latitude.

use std::f64::consts::PI;

use crate::types::Coordinate;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

const KM_PER_LAT_DEGREE: f64 = 111.32;

/// Cache bucket granularity in degrees (~1.1 km of latitude).
const BUCKET_DEGREES: f64 = 0.01;

/// Great-circle distance between two points in kilometres.
#[must_use]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box of half-width `radius_km` around `center`, clamped to WGS84 bounds.
    #[must_use]
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_LAT_DEGREE;
        let cos_lat = (center.latitude * PI / 180.0).cos().abs().max(0.01);
        let lon_delta = (radius_km / (KM_PER_LAT_DEGREE * cos_lat)).min(180.0);

        Self {
            min_lat: (center.latitude - lat_delta).max(-90.0),
            min_lon: (center.longitude - lon_delta).max(-180.0),
            max_lat: (center.latitude + lat_delta).min(90.0),
            max_lon: (center.longitude + lon_delta).min(180.0),
        }
    }
}

/// Snap a coordinate to the ~1 km cache grid, e.g. `"40.71,-74.01"`.
#[must_use]
pub fn bucket_key(coord: Coordinate) -> String {
    let lat = snap(coord.latitude, BUCKET_DEGREES);
    let lon = snap(coord.longitude, BUCKET_DEGREES);
    format!("{lat:.2},{lon:.2}")
}

/// Coordinate rounded to 4 decimal degrees (~11 m), e.g. `"40.7128,-74.0060"`.
#[must_use]
pub fn coordinate_key(coord: Coordinate) -> String {
    let lat = snap(coord.latitude, 0.0001);
    let lon = snap(coord.longitude, 0.0001);
    format!("{lat:.4},{lon:.4}")
}

fn snap(value: f64, step: f64) -> f64 {
    let snapped = (value / step).round() * step;
    // Normalise -0.0 so both sides of the meridian share a key.
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}
