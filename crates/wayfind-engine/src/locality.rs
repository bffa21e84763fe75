//! Anchor locality lookup and the region and radius filters built on it.

use std::sync::Arc;
use std::time::Duration;

use wayfind_core::geo::bucket_key;
use wayfind_core::{Coordinate, GeocodedLocation, Locality};
use wayfind_providers::ReverseGeocoder;

use crate::cache::TtlCache;
use crate::selector::generous_cap_km;
use crate::telemetry::{SearchEvent, SearchObserver};

/// Reverse-geocodes anchors, caching successful lookups per ~1 km bucket.
pub struct LocalityResolver {
    geocoder: Option<Arc<dyn ReverseGeocoder>>,
    cache: TtlCache<Locality>,
}

impl LocalityResolver {
    #[must_use]
    pub fn new(
        geocoder: Option<Arc<dyn ReverseGeocoder>>,
        ttl: Duration,
        max_entries: usize,
    ) -> Self {
        Self {
            geocoder,
            cache: TtlCache::new(ttl, max_entries),
        }
    }

    /// `None` when no geocoder is configured or the lookup fails; failures
    /// are reported to `observer` and never cached.
    pub async fn resolve(
        &self,
        anchor: Coordinate,
        timeout: Duration,
        observer: &dyn SearchObserver,
    ) -> Option<Locality> {
        let geocoder = self.geocoder.as_ref()?;
        let key = bucket_key(anchor);
        if let Some(hit) = self.cache.get(&key).await {
            return Some(hit);
        }

        let reason = match tokio::time::timeout(timeout, geocoder.reverse(anchor)).await {
            Ok(Ok(locality)) => {
                self.cache.insert(key, locality.clone()).await;
                return Some(locality);
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {} ms", timeout.as_millis()),
        };
        observer.on_event(&SearchEvent::ReverseGeocodeFailed { reason });
        None
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }
}

/// ISO country code of a candidate, when the provider reported one.
fn candidate_country_code(candidate: &GeocodedLocation) -> Option<String> {
    if let Some(code) = candidate
        .extras
        .get("country_code")
        .and_then(serde_json::Value::as_str)
    {
        return Some(code.to_ascii_lowercase());
    }
    candidate
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
        .map(str::to_ascii_lowercase)
}

/// `false` only when both the candidate and the anchor have a known country
/// code and the codes differ.
#[must_use]
pub fn region_consistent(candidate: &GeocodedLocation, anchor_locality: &Locality) -> bool {
    let Some(anchor_code) = anchor_locality.country_code.as_deref() else {
        return true;
    };
    candidate_country_code(candidate).is_none_or(|code| code.eq_ignore_ascii_case(anchor_code))
}

/// Keep candidates within `radius_km`. If none qualify, retry with the
/// generous cap before giving up.
#[must_use]
pub fn within_radius(candidates: Vec<GeocodedLocation>, radius_km: f64) -> Vec<GeocodedLocation> {
    let inside = |limit: f64| {
        move |c: &GeocodedLocation| c.distance_km.is_some_and(|d| d <= limit)
    };
    if candidates.iter().any(inside(radius_km)) {
        return candidates.into_iter().filter(inside(radius_km)).collect();
    }
    let cap = generous_cap_km(radius_km);
    candidates.into_iter().filter(inside(cap)).collect()
}
