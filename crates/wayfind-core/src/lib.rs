//! Shared domain model for the wayfind location resolution engine.
//!
//! Holds the canonical candidate schema every provider adapter produces,
//! the geographic and textual math the pipeline stages share, and the
//! environment-driven application configuration.

pub mod app_config;
pub mod config;
pub mod geo;
pub mod place_type;
pub mod text;
pub mod types;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{credential_is_usable, load_app_config, load_app_config_from_env, parse_flag};
pub use geo::{haversine_km, BoundingBox};
pub use place_type::PlaceType;
pub use text::{match_name, normalize_query, text_relevance, tokenize, NameMatch};
pub use types::{
    CacheStats, Coordinate, GeocodedLocation, Locality, LocationSearchResult, SearchOptions,
    ServiceDescriptor, UserLocation,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
