//! Mapbox Geocoding v5 forward search.

use async_trait::async_trait;
use wayfind_core::config::DEFAULT_MAPBOX_BASE_URL;
use wayfind_core::{BoundingBox, GeocodedLocation};

use crate::candidate::RawCandidate;
use crate::error::ProviderError;
use crate::fetch::{endpoint, fetch_json, parse_base_url, str_field, value_as_f64};
use crate::provider::{GeocodingProvider, ProviderRequest};

pub const SOURCE: &str = "mapbox";

const GEOCODING_PATH: &str = "/geocoding/v5/mapbox.places";
const MAX_LIMIT: usize = 10;

/// The bounding box is never tighter than this, so the engine's relaxed
/// radius filter still has candidates to work with.
const MIN_BBOX_RADIUS_KM: f64 = 50.0;

pub struct MapboxAdapter {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl MapboxAdapter {
    /// # Errors
    ///
    /// Fails only for a blank credential; see
    /// [`MapboxAdapter::with_base_url`].
    pub fn new(client: reqwest::Client, access_token: &str) -> Result<Self, ProviderError> {
        Self::with_base_url(client, access_token, DEFAULT_MAPBOX_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::MissingCredential`] for a blank credential and
    /// [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: reqwest::Client,
        access_token: &str,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        if access_token.trim().is_empty() {
            return Err(ProviderError::MissingCredential(SOURCE));
        }
        Ok(Self {
            client,
            access_token: access_token.trim().to_owned(),
            base_url: parse_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl GeocodingProvider for MapboxAdapter {
    fn key(&self) -> &str {
        SOURCE
    }

    async fn search(
        &self,
        request: &ProviderRequest,
    ) -> Result<Vec<GeocodedLocation>, ProviderError> {
        let mut url = endpoint(&self.base_url, GEOCODING_PATH)?;
        url.path_segments_mut()
            .map_err(|()| ProviderError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "cannot be a base".to_string(),
            })?
            .push(&format!("{}.json", request.query));
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("access_token", &self.access_token);
            pairs.append_pair("limit", &request.max_results.clamp(1, MAX_LIMIT).to_string());
            if let Some(anchor) = request.anchor {
                pairs.append_pair(
                    "proximity",
                    &format!("{},{}", anchor.longitude, anchor.latitude),
                );
                let bbox =
                    BoundingBox::around(anchor, request.radius_km.max(MIN_BBOX_RADIUS_KM));
                pairs.append_pair(
                    "bbox",
                    &format!(
                        "{},{},{},{}",
                        bbox.min_lon, bbox.min_lat, bbox.max_lon, bbox.max_lat
                    ),
                );
            }
            if let Some(cc) = request.country_code.as_deref() {
                pairs.append_pair("country", cc);
            }
        }

        let body = fetch_json(SOURCE, self.client.get(url)).await?;
        Ok(parse_features(&body, request))
    }
}

/// Map a geocoding `FeatureCollection` to canonical candidates.
///
/// `relevance` is the local name match; Mapbox's own score is kept in
/// `extras["provider_relevance"]`.
#[must_use]
pub fn parse_features(
    body: &serde_json::Value,
    request: &ProviderRequest,
) -> Vec<GeocodedLocation> {
    let Some(features) = body.get("features").and_then(serde_json::Value::as_array) else {
        return vec![];
    };

    features
        .iter()
        .filter_map(|feature| {
            let name = str_field(feature, "text")?;
            let center = feature.get("center")?.as_array()?;
            let longitude = value_as_f64(center.first()?)?;
            let latitude = value_as_f64(center.get(1)?)?;

            let kinds: Vec<String> = feature
                .get("place_type")
                .and_then(serde_json::Value::as_array)
                .map(|v| {
                    v.iter()
                        .filter_map(serde_json::Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            let context = parse_context(feature);
            let city = context.city.or_else(|| {
                kinds
                    .iter()
                    .any(|k| k == "place")
                    .then(|| name.clone())
            });

            let mut categories: Vec<String> = feature
                .get("properties")
                .and_then(|p| str_field(p, "category"))
                .map(|raw| raw.split(',').map(|c| c.trim().to_string()).collect())
                .unwrap_or_default();
            categories.extend(kinds);

            let provider_relevance = feature.get("relevance").and_then(value_as_f64);
            let mut extras = serde_json::Map::new();
            if let Some(r) = provider_relevance {
                extras.insert("provider_relevance".to_string(), serde_json::json!(r));
            }
            if let Some(code) = context.country_code {
                extras.insert("country_code".to_string(), serde_json::json!(code));
            }

            RawCandidate {
                name,
                address: str_field(feature, "place_name"),
                latitude,
                longitude,
                city,
                state: context.state,
                country: context.country,
                categories,
                place_id: str_field(feature, "id"),
                extras,
            }
            .into_location(SOURCE, request)
        })
        .take(request.max_results)
        .collect()
}

#[derive(Default)]
struct FeatureContext {
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

/// Walk the `context` array, keyed by the `id` prefix (`place.`, `region.`,
/// `country.`).
fn parse_context(feature: &serde_json::Value) -> FeatureContext {
    let mut ctx = FeatureContext::default();
    let Some(entries) = feature.get("context").and_then(serde_json::Value::as_array) else {
        return ctx;
    };

    for entry in entries {
        let Some(id) = entry.get("id").and_then(serde_json::Value::as_str) else {
            continue;
        };
        let text = str_field(entry, "text");
        match id.split('.').next().unwrap_or_default() {
            "place" => ctx.city = text,
            "region" => ctx.state = text,
            "country" => {
                ctx.country = text;
                ctx.country_code = str_field(entry, "short_code").map(|c| c.to_lowercase());
            }
            _ => {}
        }
    }
    ctx
}

#[cfg(test)]
mod tests {
    use wayfind_core::{Coordinate, PlaceType};

    use super::*;

    fn request() -> ProviderRequest {
        ProviderRequest::new("Blue Bottle", 5, 15.0)
            .with_anchor(Some(Coordinate::new(37.8044, -122.2712)))
    }

    fn feature_collection() -> serde_json::Value {
        serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "id": "poi.5583",
                "type": "Feature",
                "place_type": ["poi"],
                "relevance": 0.8,
                "text": "Blue Bottle Coffee",
                "place_name": "Blue Bottle Coffee, 300 Webster St, Oakland, California 94607, United States",
                "center": [-122.2773, 37.7986],
                "properties": { "category": "coffee, cafe" },
                "context": [
                    { "id": "postcode.1", "text": "94607" },
                    { "id": "place.2", "text": "Oakland" },
                    { "id": "region.3", "text": "California", "short_code": "US-CA" },
                    { "id": "country.4", "text": "United States", "short_code": "us" }
                ]
            }]
        })
    }

    #[test]
    fn parse_features_reads_center_as_lon_lat() {
        let locations = parse_features(&feature_collection(), &request());
        assert_eq!(locations.len(), 1);
        let loc = &locations[0];
        assert!((loc.latitude - 37.7986).abs() < 1e-9);
        assert!((loc.longitude + 122.2773).abs() < 1e-9);
    }

    #[test]
    fn parse_features_reads_context() {
        let loc = &parse_features(&feature_collection(), &request())[0];
        assert_eq!(loc.city.as_deref(), Some("Oakland"));
        assert_eq!(loc.state.as_deref(), Some("California"));
        assert_eq!(loc.country.as_deref(), Some("United States"));
        assert_eq!(loc.extras.get("country_code"), Some(&serde_json::json!("us")));
        assert_eq!(loc.place_type, Some(PlaceType::Cafe));
        assert_eq!(loc.place_id.as_deref(), Some("poi.5583"));
    }

    #[test]
    fn parse_features_keeps_text_relevance() {
        let loc = &parse_features(&feature_collection(), &request())[0];
        // "Blue Bottle" is a strict substring of the name.
        assert!((loc.relevance - 0.9).abs() < 1e-9, "got {}", loc.relevance);
        assert_eq!(loc.extras.get("provider_relevance"), Some(&serde_json::json!(0.8)));
    }

    #[test]
    fn exact_name_scores_full_relevance_despite_low_provider_score() {
        let body = serde_json::json!({
            "features": [{
                "id": "poi.1",
                "place_type": ["poi"],
                "relevance": 0.6,
                "text": "Blue Bottle",
                "center": [-122.2773, 37.7986]
            }]
        });
        let loc = &parse_features(&body, &request())[0];
        assert!((loc.relevance - 1.0).abs() < f64::EPSILON, "got {}", loc.relevance);
        assert_eq!(loc.extras.get("provider_relevance"), Some(&serde_json::json!(0.6)));
    }

    #[test]
    fn parse_features_city_feature_names_itself() {
        let body = serde_json::json!({
            "features": [{
                "id": "place.99",
                "place_type": ["place"],
                "text": "Oakland",
                "center": [-122.27, 37.80],
                "context": [{ "id": "country.4", "text": "United States", "short_code": "us" }]
            }]
        });
        let loc = &parse_features(&body, &request())[0];
        assert_eq!(loc.city.as_deref(), Some("Oakland"));
        assert_eq!(loc.address, "Oakland");
    }
}
