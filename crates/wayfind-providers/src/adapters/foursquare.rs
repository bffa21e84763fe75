//! Foursquare Places API v3 search.

use async_trait::async_trait;
use wayfind_core::config::DEFAULT_FOURSQUARE_BASE_URL;
use wayfind_core::GeocodedLocation;

use crate::candidate::RawCandidate;
use crate::error::ProviderError;
use crate::fetch::{endpoint, fetch_json, parse_base_url, str_field, value_as_f64};
use crate::provider::{GeocodingProvider, ProviderRequest};

pub const SOURCE: &str = "foursquare";

const SEARCH_PATH: &str = "/v3/places/search";
const MAX_RADIUS_M: u32 = 100_000;
const MAX_LIMIT: usize = 50;

pub struct FoursquareAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FoursquareAdapter {
    /// # Errors
    ///
    /// Fails only for a blank credential; see
    /// [`FoursquareAdapter::with_base_url`].
    pub fn new(client: reqwest::Client, api_key: &str) -> Result<Self, ProviderError> {
        Self::with_base_url(client, api_key, DEFAULT_FOURSQUARE_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::MissingCredential`] for a blank credential and
    /// [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: reqwest::Client,
        api_key: &str,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential(SOURCE));
        }
        Ok(Self {
            client,
            api_key: api_key.trim().to_owned(),
            base_url: parse_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl GeocodingProvider for FoursquareAdapter {
    fn key(&self) -> &str {
        SOURCE
    }

    async fn search(
        &self,
        request: &ProviderRequest,
    ) -> Result<Vec<GeocodedLocation>, ProviderError> {
        let mut url = endpoint(&self.base_url, SEARCH_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &request.query);
            pairs.append_pair("limit", &request.max_results.clamp(1, MAX_LIMIT).to_string());
            if let Some(anchor) = request.anchor {
                pairs.append_pair("ll", &format!("{},{}", anchor.latitude, anchor.longitude));
                pairs.append_pair("radius", &request.radius_m(MAX_RADIUS_M).to_string());
                pairs.append_pair("sort", "DISTANCE");
            } else {
                pairs.append_pair("sort", "RELEVANCE");
            }
        }

        let call = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .header(reqwest::header::ACCEPT, "application/json");

        let body = fetch_json(SOURCE, call).await?;
        Ok(parse_places(&body, request))
    }
}

/// Map a `/v3/places/search` response body to canonical candidates.
#[must_use]
pub fn parse_places(body: &serde_json::Value, request: &ProviderRequest) -> Vec<GeocodedLocation> {
    let Some(results) = body.get("results").and_then(serde_json::Value::as_array) else {
        return vec![];
    };

    results
        .iter()
        .filter_map(|place| {
            let name = str_field(place, "name")?;
            let main = place.get("geocodes")?.get("main")?;
            let latitude = value_as_f64(main.get("latitude")?)?;
            let longitude = value_as_f64(main.get("longitude")?)?;

            let location = place.get("location");
            let field = |key: &str| location.and_then(|l| str_field(l, key));
            let address = field("formatted_address").or_else(|| field("address"));

            let categories = place
                .get("categories")
                .and_then(serde_json::Value::as_array)
                .map(|cats| cats.iter().filter_map(|c| str_field(c, "name")).collect())
                .unwrap_or_default();

            let mut extras = serde_json::Map::new();
            for key in ["rating", "price", "distance", "popularity"] {
                if let Some(v) = place.get(key).filter(|v| !v.is_null()) {
                    extras.insert(key.to_string(), v.clone());
                }
            }

            RawCandidate {
                name,
                address,
                latitude,
                longitude,
                city: field("locality"),
                state: field("region"),
                country: field("country"),
                categories,
                place_id: str_field(place, "fsq_id"),
                extras,
            }
            .into_location(SOURCE, request)
        })
        .take(request.max_results)
        .collect()
}

#[cfg(test)]
mod tests {
    use wayfind_core::{Coordinate, PlaceType};

    use super::*;

    fn request() -> ProviderRequest {
        ProviderRequest::new("coffee", 10, 5.0)
            .with_anchor(Some(Coordinate::new(47.6097, -122.3422)))
    }

    #[test]
    fn parse_places_maps_nested_fields() {
        let body = serde_json::json!({
            "results": [{
                "fsq_id": "4b0588",
                "name": "Storyville Coffee",
                "geocodes": { "main": { "latitude": 47.6089, "longitude": -122.3404 } },
                "location": {
                    "address": "94 Pike St",
                    "formatted_address": "94 Pike St, Seattle, WA 98101",
                    "locality": "Seattle",
                    "region": "WA",
                    "country": "US"
                },
                "categories": [{ "id": 13035, "name": "Coffee Shop" }],
                "distance": 160
            }]
        });

        let locations = parse_places(&body, &request());
        assert_eq!(locations.len(), 1);
        let loc = &locations[0];
        assert_eq!(loc.place_id.as_deref(), Some("4b0588"));
        assert_eq!(loc.address, "94 Pike St, Seattle, WA 98101");
        assert_eq!(loc.city.as_deref(), Some("Seattle"));
        assert_eq!(loc.state.as_deref(), Some("WA"));
        assert_eq!(loc.country.as_deref(), Some("US"));
        assert_eq!(loc.place_type, Some(PlaceType::Cafe));
        assert!((loc.relevance - 0.9).abs() < f64::EPSILON);
        assert!(loc.distance_km.unwrap() < 0.5);
        assert_eq!(loc.extras.get("distance"), Some(&serde_json::json!(160)));
    }

    #[test]
    fn parse_places_handles_missing_results() {
        assert!(parse_places(&serde_json::json!({}), &request()).is_empty());
    }

    #[test]
    fn parse_places_skips_entries_without_geocodes() {
        let body = serde_json::json!({
            "results": [{ "fsq_id": "x", "name": "Ghost Cafe", "location": {} }]
        });
        assert!(parse_places(&body, &request()).is_empty());
    }
}
