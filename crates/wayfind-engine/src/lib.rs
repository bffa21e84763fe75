//! Proximity-aware location resolution.
//!
//! [`LocationEngine`] turns free text plus an optional anchor into ranked
//! candidates by cascading over the provider adapters in priority order,
//! then deduplicating, scoring and ordering what they return. Searches are
//! cached per (query, ~1 km anchor bucket, radius) and never come back
//! empty for a non-blank query.

pub mod cache;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod locality;
pub mod registry;
pub mod retry;
pub mod scorer;
pub mod selector;
pub mod telemetry;
pub mod user_location;

mod orchestrator;

pub use cache::{CachedSearch, SearchCache, TtlCache};
pub use engine::{LocationEngine, LocationEngineBuilder};
pub use error::EngineError;
pub use fallback::FallbackProvider;
pub use orchestrator::INNER_RADIUS_KM;
pub use registry::{ActiveProvider, EnvLookup, ProviderFactory, ServiceRegistry};
pub use retry::RetryPolicy;
pub use telemetry::{Pass, SearchEvent, SearchObserver, TracingObserver};
pub use tokio_util::sync::CancellationToken;
pub use user_location::UserLocationStore;
