use crate::app_config::AppConfig;
use crate::ConfigError;

pub const GOOGLE_PLACES_API_KEY: &str = "GOOGLE_PLACES_API_KEY";
pub const FOURSQUARE_API_KEY: &str = "FOURSQUARE_API_KEY";
pub const MAPBOX_ACCESS_TOKEN: &str = "MAPBOX_ACCESS_TOKEN";

pub const ENABLE_GOOGLE_PLACES: &str = "WAYFIND_ENABLE_GOOGLE_PLACES";
pub const ENABLE_FOURSQUARE: &str = "WAYFIND_ENABLE_FOURSQUARE";
pub const ENABLE_MAPBOX: &str = "WAYFIND_ENABLE_MAPBOX";

pub const DEFAULT_GOOGLE_PLACES_BASE_URL: &str = "https://maps.googleapis.com";
pub const DEFAULT_FOURSQUARE_BASE_URL: &str = "https://api.foursquare.com";
pub const DEFAULT_MAPBOX_BASE_URL: &str = "https://api.mapbox.com";
pub const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

pub const DEFAULT_USER_AGENT: &str = "wayfind/0.1 (location-resolution)";

/// Shortest string accepted as a real provider credential.
const MIN_CREDENTIAL_LEN: usize = 10;

const PLACEHOLDER_MARKERS: &[&str] = &[
    "your_",
    "your-",
    "placeholder",
    "changeme",
    "change_me",
    "replace",
    "example",
    "xxxx",
    "todo",
    "<",
];

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a `HashMap` lookup.
pub(crate) fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_flag(&raw)
                .ok_or_else(|| invalid(var, format!("expected a boolean, got '{raw}'"))),
            Err(_) => Ok(default),
        }
    };

    let log_level = or_default("WAYFIND_LOG_LEVEL", "info");
    let user_agent = or_default("WAYFIND_USER_AGENT", DEFAULT_USER_AGENT);
    let http_connect_timeout_secs = parse_u64("WAYFIND_HTTP_CONNECT_TIMEOUT_SECS", "10")?;

    let default_max_results = parse_usize("WAYFIND_DEFAULT_MAX_RESULTS", "10")?;
    if default_max_results == 0 {
        return Err(invalid(
            "WAYFIND_DEFAULT_MAX_RESULTS",
            "must be at least 1".to_string(),
        ));
    }

    let radius_raw = or_default("WAYFIND_DEFAULT_RADIUS_KM", "15");
    let default_radius_km = radius_raw
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid("WAYFIND_DEFAULT_RADIUS_KM", e.to_string()))?;
    if !default_radius_km.is_finite() || default_radius_km <= 0.0 {
        return Err(invalid(
            "WAYFIND_DEFAULT_RADIUS_KM",
            format!("must be a positive number, got {radius_raw}"),
        ));
    }

    let default_timeout_ms = parse_u64("WAYFIND_DEFAULT_TIMEOUT_MS", "15000")?;
    let cache_ttl_secs = parse_u64("WAYFIND_CACHE_TTL_SECS", "300")?;
    let cache_max_entries = parse_usize("WAYFIND_CACHE_MAX_ENTRIES", "100")?;
    let retry_max_attempts = parse_u32("WAYFIND_RETRY_MAX_ATTEMPTS", "3")?;
    let retry_backoff_base_ms = parse_u64("WAYFIND_RETRY_BACKOFF_BASE_MS", "500")?;
    let exhaustive_cascade = parse_bool("WAYFIND_EXHAUSTIVE_CASCADE", false)?;

    Ok(AppConfig {
        log_level,
        user_agent,
        http_connect_timeout_secs,
        default_max_results,
        default_radius_km,
        default_timeout_ms,
        cache_ttl_secs,
        cache_max_entries,
        retry_max_attempts,
        retry_backoff_base_ms,
        exhaustive_cascade,
        google_places_base_url: or_default(
            "WAYFIND_GOOGLE_PLACES_BASE_URL",
            DEFAULT_GOOGLE_PLACES_BASE_URL,
        ),
        foursquare_base_url: or_default("WAYFIND_FOURSQUARE_BASE_URL", DEFAULT_FOURSQUARE_BASE_URL),
        mapbox_base_url: or_default("WAYFIND_MAPBOX_BASE_URL", DEFAULT_MAPBOX_BASE_URL),
        nominatim_base_url: or_default("WAYFIND_NOMINATIM_BASE_URL", DEFAULT_NOMINATIM_BASE_URL),
    })
}

/// Parse a boolean feature flag. Returns `None` for unrecognised input.
#[must_use]
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `true` when `raw` looks like a real credential rather than an unset
/// template value.
#[must_use]
pub fn credential_is_usable(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.len() < MIN_CREDENTIAL_LEN {
        return false;
    }
    let lowered = trimmed.to_ascii_lowercase();
    !PLACEHOLDER_MARKERS.iter().any(|m| lowered.contains(m))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
