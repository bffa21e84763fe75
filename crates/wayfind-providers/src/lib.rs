//! Geocoding and place-search provider adapters.
//!
//! Each adapter translates one external API (Google Places, Foursquare,
//! Mapbox, Nominatim) into the canonical [`GeocodedLocation`] schema. Adapters
//! never decide aggregate failure: they return `Err` for transport, status,
//! and API-reported errors and leave the cascade to the engine.
//!
//! [`GeocodedLocation`]: wayfind_core::GeocodedLocation

pub mod adapters;
pub mod error;
pub mod fetch;
pub mod provider;
pub mod trust;

mod candidate;

pub use adapters::{FoursquareAdapter, GooglePlacesAdapter, MapboxAdapter, NominatimAdapter};
pub use error::ProviderError;
pub use fetch::build_http_client;
pub use provider::{GeocodingProvider, ProviderRequest, ReverseGeocoder};
pub use trust::{source_tier, SourceTier};
