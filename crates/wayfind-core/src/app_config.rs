use crate::config::{
    DEFAULT_FOURSQUARE_BASE_URL, DEFAULT_GOOGLE_PLACES_BASE_URL, DEFAULT_MAPBOX_BASE_URL,
    DEFAULT_NOMINATIM_BASE_URL, DEFAULT_USER_AGENT,
};
use crate::types::{DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_RADIUS_KM, DEFAULT_TIMEOUT_MS};

/// Engine and HTTP settings loaded from the environment.
///
/// Provider credentials and feature flags are not stored here; the service
/// registry re-reads them on every query.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    pub user_agent: String,
    pub http_connect_timeout_secs: u64,
    pub default_max_results: usize,
    pub default_radius_km: f64,
    pub default_timeout_ms: u64,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
    pub retry_max_attempts: u32,
    pub retry_backoff_base_ms: u64,
    pub exhaustive_cascade: bool,
    pub google_places_base_url: String,
    pub foursquare_base_url: String,
    pub mapbox_base_url: String,
    pub nominatim_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_connect_timeout_secs: 10,
            default_max_results: DEFAULT_MAX_RESULTS,
            default_radius_km: DEFAULT_SEARCH_RADIUS_KM,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            cache_ttl_secs: 300,
            cache_max_entries: 100,
            retry_max_attempts: 3,
            retry_backoff_base_ms: 500,
            exhaustive_cascade: false,
            google_places_base_url: DEFAULT_GOOGLE_PLACES_BASE_URL.to_string(),
            foursquare_base_url: DEFAULT_FOURSQUARE_BASE_URL.to_string(),
            mapbox_base_url: DEFAULT_MAPBOX_BASE_URL.to_string(),
            nominatim_base_url: DEFAULT_NOMINATIM_BASE_URL.to_string(),
        }
    }
}
