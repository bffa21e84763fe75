use std::collections::HashSet;

use wayfind_core::GeocodedLocation;

/// Collapse candidates that refer to the same place.
///
/// Identity is the provider place ID, else the coordinate rounded to ~11 m.
/// The first candidate seen per identity is kept and later ones are dropped
/// unmerged, so the highest-priority adapter's record wins.
#[must_use]
pub fn dedup(candidates: Vec<GeocodedLocation>) -> Vec<GeocodedLocation> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(source: &str, place_id: Option<&str>, lat: f64, lon: f64) -> GeocodedLocation {
        GeocodedLocation {
            latitude: lat,
            longitude: lon,
            address: String::new(),
            place_name: format!("{source} place"),
            city: None,
            state: None,
            country: None,
            place_type: None,
            relevance: 0.5,
            distance_km: None,
            source: source.to_string(),
            place_id: place_id.map(str::to_string),
            composite_score: 0.0,
            extras: serde_json::Map::new(),
        }
    }

    #[test]
    fn same_place_id_keeps_first() {
        let out = dedup(vec![
            candidate("google_places", Some("abc"), 40.0, -73.0),
            candidate("foursquare", Some("abc"), 41.0, -74.0),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, "google_places");
    }

    #[test]
    fn nearby_coordinates_without_ids_collapse() {
        let out = dedup(vec![
            candidate("mapbox", None, 40.712_81, -74.006_02),
            candidate("nominatim", None, 40.712_83, -74.006_04),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, "mapbox");
    }

    #[test]
    fn distinct_places_survive_in_order() {
        let out = dedup(vec![
            candidate("a", Some("1"), 40.0, -73.0),
            candidate("b", None, 40.1, -73.0),
            candidate("c", Some("2"), 40.0, -73.0),
        ]);
        let sources: Vec<&str> = out.iter().map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["a", "b", "c"]);
    }
}
