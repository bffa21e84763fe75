use async_trait::async_trait;
use wayfind_core::{Coordinate, GeocodedLocation, Locality};

use crate::error::ProviderError;

/// One adapter invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub query: String,
    /// Proximity anchor; adapters bias toward it and compute distances from it.
    pub anchor: Option<Coordinate>,
    pub radius_km: f64,
    pub max_results: usize,
    /// Lower-case ISO country code implied by the anchor, when known.
    pub country_code: Option<String>,
}

impl ProviderRequest {
    #[must_use]
    pub fn new(query: &str, max_results: usize, radius_km: f64) -> Self {
        Self {
            query: query.to_string(),
            anchor: None,
            radius_km,
            max_results,
            country_code: None,
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: Option<Coordinate>) -> Self {
        self.anchor = anchor;
        self
    }

    #[must_use]
    pub fn with_country_code(mut self, country_code: Option<String>) -> Self {
        self.country_code = country_code;
        self
    }

    /// Search radius in whole metres, capped at `max_m`.
    #[must_use]
    pub fn radius_m(&self, max_m: u32) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let metres = (self.radius_km * 1_000.0).round().max(1.0) as u32;
        metres.min(max_m)
    }
}

/// A geocoding or place-search backend.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Stable source key written into every candidate (e.g. `"nominatim"`).
    fn key(&self) -> &str;

    /// Run one search and map the response into canonical candidates.
    async fn search(
        &self,
        request: &ProviderRequest,
    ) -> Result<Vec<GeocodedLocation>, ProviderError>;
}

/// Coordinate → administrative context lookup.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, point: Coordinate) -> Result<Locality, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_m_converts_and_caps() {
        let req = ProviderRequest::new("cafe", 5, 15.0);
        assert_eq!(req.radius_m(50_000), 15_000);
        assert_eq!(req.radius_m(10_000), 10_000);
    }

    #[test]
    fn radius_m_is_at_least_one_metre() {
        let req = ProviderRequest::new("cafe", 5, 0.000_1);
        assert_eq!(req.radius_m(50_000), 1);
    }
}
