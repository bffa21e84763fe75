//! OpenStreetMap Nominatim search and reverse geocoding.
//!
//! Needs no credential, so the registry always offers it. The usage policy
//! requires an identifying `User-Agent`, which the shared client sets.

use async_trait::async_trait;
use wayfind_core::config::DEFAULT_NOMINATIM_BASE_URL;
use wayfind_core::{BoundingBox, Coordinate, GeocodedLocation, Locality};

use crate::candidate::RawCandidate;
use crate::error::ProviderError;
use crate::fetch::{endpoint, fetch_json, parse_base_url, str_field, value_as_f64};
use crate::provider::{GeocodingProvider, ProviderRequest, ReverseGeocoder};

pub const SOURCE: &str = "nominatim";

const SEARCH_PATH: &str = "/search";
const REVERSE_PATH: &str = "/reverse";
const MAX_LIMIT: usize = 40;

/// Zoom 10 resolves to city level.
const REVERSE_ZOOM: &str = "10";

/// Address keys that name the settlement, most specific first.
const CITY_KEYS: &[&str] = &["city", "town", "village", "hamlet", "municipality", "suburb"];

pub struct NominatimAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimAdapter {
    /// # Errors
    ///
    /// Never fails for the built-in base URL; the `Result` mirrors
    /// [`NominatimAdapter::with_base_url`].
    pub fn new(client: reqwest::Client) -> Result<Self, ProviderError> {
        Self::with_base_url(client, DEFAULT_NOMINATIM_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Result<Self, ProviderError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl GeocodingProvider for NominatimAdapter {
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
            pairs.append_pair("q", &request.query);
            pairs.append_pair("format", "jsonv2");
            pairs.append_pair("addressdetails", "1");
            pairs.append_pair("limit", &request.max_results.clamp(1, MAX_LIMIT).to_string());
            if let Some(anchor) = request.anchor {
                // viewbox is <left>,<top>,<right>,<bottom>; bounded=0 keeps it a bias.
                let bbox = BoundingBox::around(anchor, request.radius_km);
                pairs.append_pair(
                    "viewbox",
                    &format!(
                        "{},{},{},{}",
                        bbox.min_lon, bbox.max_lat, bbox.max_lon, bbox.min_lat
                    ),
                );
                pairs.append_pair("bounded", "0");
            }
            if let Some(cc) = request.country_code.as_deref() {
                pairs.append_pair("countrycodes", cc);
            }
        }

        let body = fetch_json(SOURCE, self.client.get(url)).await?;
        parse_search(&body, request)
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimAdapter {
    async fn reverse(&self, point: Coordinate) -> Result<Locality, ProviderError> {
        let mut url = endpoint(&self.base_url, REVERSE_PATH)?;
        url.query_pairs_mut()
            .append_pair("lat", &point.latitude.to_string())
            .append_pair("lon", &point.longitude.to_string())
            .append_pair("format", "jsonv2")
            .append_pair("zoom", REVERSE_ZOOM)
            .append_pair("addressdetails", "1");

        let body = fetch_json(SOURCE, self.client.get(url)).await?;
        parse_reverse(&body)
    }
}

/// Map a `/search?format=jsonv2` array to canonical candidates.
///
/// # Errors
///
/// Returns [`ProviderError::Api`] when Nominatim answers with an `error`
/// object instead of a result array.
pub fn parse_search(
    body: &serde_json::Value,
    request: &ProviderRequest,
) -> Result<Vec<GeocodedLocation>, ProviderError> {
    if let Some(message) = error_message(body) {
        return Err(ProviderError::Api {
            provider: SOURCE,
            message,
        });
    }
    let Some(results) = body.as_array() else {
        return Ok(vec![]);
    };

    let locations = results
        .iter()
        .filter_map(|place| {
            let latitude = value_as_f64(place.get("lat")?)?;
            let longitude = value_as_f64(place.get("lon")?)?;
            let display_name = str_field(place, "display_name");
            let name = str_field(place, "name").or_else(|| {
                display_name
                    .as_deref()
                    .and_then(|d| d.split(',').next())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })?;

            let address = place.get("address");
            let locality = address.map(locality_from_address).unwrap_or_default();

            let categories = ["type", "category"]
                .iter()
                .filter_map(|k| str_field(place, k))
                .collect();

            let place_id = match (str_field(place, "osm_type"), place.get("osm_id")) {
                (Some(kind), Some(id)) if !id.is_null() => Some(format!("osm:{kind}:{id}")),
                _ => place.get("place_id").filter(|v| !v.is_null()).map(|v| {
                    v.as_str().map_or_else(|| v.to_string(), str::to_string)
                }),
            };

            let mut extras = serde_json::Map::new();
            if let Some(importance) = place.get("importance").filter(|v| !v.is_null()) {
                extras.insert("importance".to_string(), importance.clone());
            }
            if let Some(code) = locality.country_code.clone() {
                extras.insert("country_code".to_string(), serde_json::json!(code));
            }

            RawCandidate {
                name,
                address: display_name,
                latitude,
                longitude,
                city: locality.city,
                state: locality.state,
                country: locality.country,
                categories,
                place_id,
                extras,
            }
            .into_location(SOURCE, request)
        })
        .take(request.max_results)
        .collect();

    Ok(locations)
}

/// Map a `/reverse?format=jsonv2` body to a [`Locality`].
///
/// # Errors
///
/// Returns [`ProviderError::Api`] when the coordinate cannot be resolved.
pub fn parse_reverse(body: &serde_json::Value) -> Result<Locality, ProviderError> {
    if let Some(message) = error_message(body) {
        return Err(ProviderError::Api {
            provider: SOURCE,
            message,
        });
    }
    Ok(body
        .get("address")
        .map(locality_from_address)
        .unwrap_or_default())
}

fn locality_from_address(address: &serde_json::Value) -> Locality {
    Locality {
        city: CITY_KEYS.iter().find_map(|k| str_field(address, k)),
        state: str_field(address, "state").or_else(|| str_field(address, "region")),
        country: str_field(address, "country"),
        country_code: str_field(address, "country_code").map(|c| c.to_lowercase()),
    }
}

fn error_message(body: &serde_json::Value) -> Option<String> {
    match body.get("error")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => str_field(other, "message").or_else(|| Some(other.to_string())),
    }
}
