use wayfind_core::{Coordinate, GeocodedLocation, PlaceType};
use wayfind_providers::trust::FALLBACK_SOURCE;

/// Relevance stamped on synthetic results.
pub const FALLBACK_RELEVANCE: f64 = 0.2;

/// Used when the search had no anchor.
pub const DEFAULT_FALLBACK_COORDINATE: Coordinate = Coordinate {
    latitude: 0.0,
    longitude: 0.0,
};

/// Produces the single low-confidence placeholder returned when a search
/// yields no candidates.
#[derive(Debug, Clone, Copy)]
pub struct FallbackProvider {
    default_coordinate: Coordinate,
}

impl Default for FallbackProvider {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_COORDINATE)
    }
}

impl FallbackProvider {
    #[must_use]
    pub fn new(default_coordinate: Coordinate) -> Self {
        Self { default_coordinate }
    }

    /// Placeholder centred on the anchor (or the default coordinate), named
    /// after the query.
    #[must_use]
    pub fn locate(&self, query: &str, anchor: Option<Coordinate>) -> GeocodedLocation {
        let point = anchor.unwrap_or(self.default_coordinate);
        let mut extras = serde_json::Map::new();
        extras.insert("synthetic".to_string(), serde_json::Value::Bool(true));

        GeocodedLocation {
            latitude: point.latitude,
            longitude: point.longitude,
            address: query.to_string(),
            place_name: query.to_string(),
            city: None,
            state: None,
            country: None,
            place_type: Some(PlaceType::Place),
            relevance: FALLBACK_RELEVANCE,
            distance_km: anchor.map(|_| 0.0),
            source: FALLBACK_SOURCE.to_string(),
            place_id: None,
            // Scored on relevance alone.
            composite_score: FALLBACK_RELEVANCE * 35.0,
            extras,
        }
    }
}
