//! Canonical data model shared by adapters, the engine, and callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo;
use crate::place_type::PlaceType;

pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 15.0;
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `true` when both components are finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One candidate place in the canonical schema.
///
/// Adapters fill everything except `distance_km` (only when an anchor is
/// known) and `composite_score`, which later pipeline stages overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub place_name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub place_type: Option<PlaceType>,
    /// Textual relevance against the query, in `[0, 1]`.
    pub relevance: f64,
    /// Distance from the anchor in kilometres.
    pub distance_km: Option<f64>,
    /// Key of the adapter that produced this candidate.
    pub source: String,
    pub place_id: Option<String>,
    /// Blended ranking value in `[0, 100]`. Set by the scorer.
    #[serde(default)]
    pub composite_score: f64,
    /// Provider-specific fields (rating, price level, raw categories).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl GeocodedLocation {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Identity used for deduplication: the provider place ID when present,
    /// otherwise the coordinate rounded to 4 decimal degrees (~11 m).
    #[must_use]
    pub fn dedup_key(&self) -> String {
        match self.place_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => format!("id:{id}"),
            _ => format!("geo:{}", geo::coordinate_key(self.coordinate())),
        }
    }
}

/// Last-known position of the user, used as the default proximity anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in metres as reported by the device.
    pub accuracy_m: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl UserLocation {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: None,
            timestamp: Some(Utc::now()),
        }
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl From<Coordinate> for UserLocation {
    fn from(coord: Coordinate) -> Self {
        Self::new(coord.latitude, coord.longitude)
    }
}

/// Administrative context of a coordinate, as returned by reverse geocoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2, lower-case.
    pub country_code: Option<String>,
}

impl Locality {
    /// Most specific place label available: city, then state.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.city
            .as_deref()
            .or(self.state.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// Per-call search tuning. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub max_results: usize,
    pub search_radius_km: f64,
    /// Explicit proximity anchor; overrides the stored user location.
    pub anchor: Option<Coordinate>,
    /// Upper bound for a single adapter call.
    pub timeout_ms: u64,
    /// Upper bound for the whole multi-adapter, multi-pass search.
    pub overall_timeout_ms: Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            search_radius_km: DEFAULT_SEARCH_RADIUS_KM,
            anchor: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            overall_timeout_ms: None,
        }
    }
}

impl SearchOptions {
    #[must_use]
    pub fn with_anchor(mut self, latitude: f64, longitude: f64) -> Self {
        self.anchor = Some(Coordinate::new(latitude, longitude));
        self
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    #[must_use]
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.search_radius_km = radius_km;
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_overall_timeout_ms(mut self, overall_timeout_ms: u64) -> Self {
        self.overall_timeout_ms = Some(overall_timeout_ms);
        self
    }

    /// Check the option invariants.
    ///
    /// # Errors
    ///
    /// Returns `Err` with a human-readable reason when a value is out of range.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_results == 0 {
            return Err("max_results must be at least 1".to_string());
        }
        if !self.search_radius_km.is_finite() || self.search_radius_km <= 0.0 {
            return Err(format!(
                "search_radius_km must be a positive number, got {}",
                self.search_radius_km
            ));
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be at least 1".to_string());
        }
        if self.overall_timeout_ms == Some(0) {
            return Err("overall_timeout_ms must be at least 1 when set".to_string());
        }
        if let Some(anchor) = self.anchor {
            if !anchor.is_valid() {
                return Err(format!(
                    "anchor ({}, {}) is outside WGS84 bounds",
                    anchor.latitude, anchor.longitude
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of one `resolve` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSearchResult {
    pub query: String,
    pub locations: Vec<GeocodedLocation>,
    /// Head of `locations`; `None` only when no candidate exists.
    pub best_match: Option<GeocodedLocation>,
    pub total_results: usize,
    pub search_radius_km: f64,
    /// Soft adapter failures, for logging only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default)]
    pub from_cache: bool,
    #[serde(default)]
    pub used_fallback: bool,
}

impl LocationSearchResult {
    /// Build a result whose `best_match` and `total_results` follow `locations`.
    #[must_use]
    pub fn from_locations(
        query: &str,
        locations: Vec<GeocodedLocation>,
        search_radius_km: f64,
        errors: Vec<String>,
    ) -> Self {
        Self {
            query: query.to_string(),
            best_match: locations.first().cloned(),
            total_results: locations.len(),
            locations,
            search_radius_km,
            errors,
            from_cache: false,
            used_fallback: false,
        }
    }

    #[must_use]
    pub fn empty(query: &str, search_radius_km: f64) -> Self {
        Self::from_locations(query, Vec::new(), search_radius_km, Vec::new())
    }
}

/// Registry view of one provider adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub key: String,
    pub display_name: String,
    /// Lower is tried first.
    pub priority: u32,
    pub enabled: bool,
    pub credential_present: bool,
}

/// Snapshot of the search cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}
