//! Google Places Text Search.
//!
//! `GET /maps/api/place/textsearch/json`. Google reports failures inside a
//! 200 envelope via the `status` field, so `OK` and `ZERO_RESULTS` are the
//! only successful outcomes.

use async_trait::async_trait;
use wayfind_core::config::DEFAULT_GOOGLE_PLACES_BASE_URL;
use wayfind_core::GeocodedLocation;

use crate::candidate::{split_formatted_address, RawCandidate};
use crate::error::ProviderError;
use crate::fetch::{endpoint, fetch_json, parse_base_url, str_field, value_as_f64};
use crate::provider::{GeocodingProvider, ProviderRequest};

pub const SOURCE: &str = "google_places";

const TEXT_SEARCH_PATH: &str = "/maps/api/place/textsearch/json";

/// Google rejects larger radii.
const MAX_RADIUS_M: u32 = 50_000;

pub struct GooglePlacesAdapter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GooglePlacesAdapter {
    /// # Errors
    ///
    /// Fails only for a blank credential; see
    /// [`GooglePlacesAdapter::with_base_url`].
    pub fn new(client: reqwest::Client, api_key: &str) -> Result<Self, ProviderError> {
        Self::with_base_url(client, api_key, DEFAULT_GOOGLE_PLACES_BASE_URL)
    }

    /// Point the adapter at a different host (for wiremock).
    ///
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
impl GeocodingProvider for GooglePlacesAdapter {
    fn key(&self) -> &str {
        SOURCE
    }

    async fn search(
        &self,
        request: &ProviderRequest,
    ) -> Result<Vec<GeocodedLocation>, ProviderError> {
        let mut url = endpoint(&self.base_url, TEXT_SEARCH_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &request.query);
            pairs.append_pair("key", &self.api_key);
            if let Some(anchor) = request.anchor {
                pairs.append_pair(
                    "location",
                    &format!("{},{}", anchor.latitude, anchor.longitude),
                );
                pairs.append_pair("radius", &request.radius_m(MAX_RADIUS_M).to_string());
            }
            if let Some(cc) = request.country_code.as_deref() {
                pairs.append_pair("region", cc);
            }
        }

        let body = fetch_json(SOURCE, self.client.get(url)).await?;
        parse_text_search(&body, request)
    }
}

/// Map a Text Search response body to canonical candidates.
///
/// # Errors
///
/// Returns [`ProviderError::Api`] for any `status` other than `OK` or
/// `ZERO_RESULTS`.
pub fn parse_text_search(
    body: &serde_json::Value,
    request: &ProviderRequest,
) -> Result<Vec<GeocodedLocation>, ProviderError> {
    let status = body
        .get("status")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("UNKNOWN_ERROR");

    match status {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(vec![]),
        other => {
            let message = match str_field(body, "error_message") {
                Some(detail) => format!("{other}: {detail}"),
                None => other.to_string(),
            };
            return Err(ProviderError::Api {
                provider: SOURCE,
                message,
            });
        }
    }

    let Some(results) = body.get("results").and_then(serde_json::Value::as_array) else {
        return Ok(vec![]);
    };

    let locations = results
        .iter()
        .filter_map(|place| {
            let name = str_field(place, "name")?;
            let location = place.get("geometry")?.get("location")?;
            let latitude = value_as_f64(location.get("lat")?)?;
            let longitude = value_as_f64(location.get("lng")?)?;
            let address = str_field(place, "formatted_address");
            let (city, state, country) = address
                .as_deref()
                .map(split_formatted_address)
                .unwrap_or_default();

            let categories = place
                .get("types")
                .and_then(serde_json::Value::as_array)
                .map(|types| {
                    types
                        .iter()
                        .filter_map(serde_json::Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            let mut extras = serde_json::Map::new();
            for key in ["rating", "user_ratings_total", "price_level", "business_status"] {
                if let Some(v) = place.get(key).filter(|v| !v.is_null()) {
                    extras.insert(key.to_string(), v.clone());
                }
            }

            RawCandidate {
                name,
                address,
                latitude,
                longitude,
                city,
                state,
                country,
                categories,
                place_id: str_field(place, "place_id"),
                extras,
            }
            .into_location(SOURCE, request)
        })
        .take(request.max_results)
        .collect();

    Ok(locations)
}
