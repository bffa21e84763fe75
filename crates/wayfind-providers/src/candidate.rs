//! Shared construction of canonical candidates from parsed provider fields.

use wayfind_core::{haversine_km, text_relevance, Coordinate, GeocodedLocation, PlaceType};

use crate::provider::ProviderRequest;

/// Provider-agnostic fields extracted from one raw result.
#[derive(Debug, Default)]
pub(crate) struct RawCandidate {
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    /// Category strings as the provider reports them.
    pub categories: Vec<String>,
    pub place_id: Option<String>,
    pub extras: serde_json::Map<String, serde_json::Value>,
}

impl RawCandidate {
    /// Finish the candidate: classify it, score text relevance against the
    /// query, and measure distance from the anchor. Returns `None` when the
    /// coordinate is out of range.
    pub(crate) fn into_location(
        self,
        source: &str,
        request: &ProviderRequest,
    ) -> Option<GeocodedLocation> {
        let point = Coordinate::new(self.latitude, self.longitude);
        if !point.is_valid() {
            tracing::debug!(
                source,
                name = %self.name,
                latitude = self.latitude,
                longitude = self.longitude,
                "dropping candidate with invalid coordinates"
            );
            return None;
        }

        let place_type = PlaceType::classify_any(
            self.categories
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(self.name.as_str())),
        );
        let relevance = text_relevance(&request.query, &self.name);
        let distance_km = request.anchor.map(|anchor| haversine_km(anchor, point));
        let address = self
            .address
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| self.name.clone());

        Some(GeocodedLocation {
            latitude: self.latitude,
            longitude: self.longitude,
            address,
            place_name: self.name,
            city: self.city,
            state: self.state,
            country: self.country,
            place_type: Some(place_type),
            relevance,
            distance_km,
            source: source.to_string(),
            place_id: self.place_id,
            composite_score: 0.0,
            extras: self.extras,
        })
    }
}

/// Split a comma-separated postal address into `(city, state, country)`.
///
/// Handles the common `street, city, state [postcode], country` shape used by
/// Google and Foursquare formatted addresses. Postcode tokens are stripped
/// from the state segment.
pub(crate) fn split_formatted_address(
    address: &str,
) -> (Option<String>, Option<String>, Option<String>) {
    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() < 3 {
        return (None, None, parts.last().map(|s| (*s).to_string()));
    }

    let country = parts[parts.len() - 1].to_string();
    let state = strip_postcode(parts[parts.len() - 2]);
    let city = parts[parts.len() - 3].to_string();
    (Some(city), state, Some(country))
}

fn strip_postcode(segment: &str) -> Option<String> {
    let words: Vec<&str> = segment
        .split_whitespace()
        .filter(|w| !w.chars().any(|c| c.is_ascii_digit()))
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
