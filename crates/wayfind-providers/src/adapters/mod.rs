//! One module per upstream API. Each exposes a `SOURCE` key, a pure
//! `parse_*` function over the response JSON, and an adapter struct that
//! implements [`GeocodingProvider`](crate::GeocodingProvider).

pub mod foursquare;
pub mod google_places;
pub mod mapbox;
pub mod nominatim;

pub use foursquare::FoursquareAdapter;
pub use google_places::GooglePlacesAdapter;
pub use mapbox::MapboxAdapter;
pub use nominatim::NominatimAdapter;
