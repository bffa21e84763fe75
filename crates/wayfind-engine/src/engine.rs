use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wayfind_core::{
    AppConfig, CacheStats, Coordinate, LocationSearchResult, SearchOptions, ServiceDescriptor,
    UserLocation,
};
use wayfind_providers::{build_http_client, NominatimAdapter, ReverseGeocoder};

use crate::cache::{SearchCache, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use crate::error::EngineError;
use crate::fallback::FallbackProvider;
use crate::locality::LocalityResolver;
use crate::orchestrator::Orchestrator;
use crate::registry::ServiceRegistry;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::telemetry::{SearchObserver, TracingObserver};
use crate::user_location::UserLocationStore;

/// Entry point for location resolution.
///
/// Owns the orchestrator and the shared state it reads: the user location
/// store, the search cache, and the service registry. Cheap to share behind
/// an `Arc`; every method takes `&self`.
pub struct LocationEngine {
    orchestrator: Orchestrator,
    defaults: SearchOptions,
    retry: RetryPolicy,
}

pub struct LocationEngineBuilder {
    registry: Arc<ServiceRegistry>,
    user_location: Option<Arc<UserLocationStore>>,
    observer: Arc<dyn SearchObserver>,
    reverse_geocoder: Option<Arc<dyn ReverseGeocoder>>,
    cache_ttl: Duration,
    cache_max_entries: usize,
    exhaustive_cascade: bool,
    fallback: FallbackProvider,
    defaults: SearchOptions,
    retry: RetryPolicy,
}

impl LocationEngineBuilder {
    #[must_use]
    pub fn new(registry: ServiceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            user_location: None,
            observer: Arc::new(TracingObserver),
            reverse_geocoder: None,
            cache_ttl: DEFAULT_TTL,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            exhaustive_cascade: false,
            fallback: FallbackProvider::default(),
            defaults: SearchOptions::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Share a store with the host so GPS callbacks and searches see the
    /// same position.
    #[must_use]
    pub fn user_location(mut self, store: Arc<UserLocationStore>) -> Self {
        self.user_location = Some(store);
        self
    }

    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Enables the region filter and the locality-augmented second pass.
    #[must_use]
    pub fn reverse_geocoder(mut self, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        self.reverse_geocoder = Some(geocoder);
        self
    }

    #[must_use]
    pub fn cache(mut self, ttl: Duration, max_entries: usize) -> Self {
        self.cache_ttl = ttl;
        self.cache_max_entries = max_entries;
        self
    }

    #[must_use]
    pub fn exhaustive_cascade(mut self, exhaustive: bool) -> Self {
        self.exhaustive_cascade = exhaustive;
        self
    }

    #[must_use]
    pub fn fallback_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.fallback = FallbackProvider::new(coordinate);
        self
    }

    #[must_use]
    pub fn default_options(mut self, defaults: SearchOptions) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cache bounds, cascade mode, default options and retry policy from
    /// `config`.
    #[must_use]
    pub fn apply_config(self, config: &AppConfig) -> Self {
        let defaults = SearchOptions {
            max_results: config.default_max_results,
            search_radius_km: config.default_radius_km,
            timeout_ms: config.default_timeout_ms,
            ..SearchOptions::default()
        };
        self.cache(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_max_entries,
        )
        .exhaustive_cascade(config.exhaustive_cascade)
        .default_options(defaults)
        .retry_policy(RetryPolicy::from_config(config))
    }

    #[must_use]
    pub fn build(self) -> LocationEngine {
        let orchestrator = Orchestrator {
            registry: self.registry,
            user_location: self.user_location.unwrap_or_default(),
            cache: Arc::new(SearchCache::new(self.cache_ttl, self.cache_max_entries)),
            localities: LocalityResolver::new(
                self.reverse_geocoder,
                self.cache_ttl,
                self.cache_max_entries,
            ),
            observer: self.observer,
            fallback: self.fallback,
            exhaustive_cascade: self.exhaustive_cascade,
        };
        LocationEngine {
            orchestrator,
            defaults: self.defaults,
            retry: self.retry,
        }
    }
}

impl LocationEngine {
    #[must_use]
    pub fn builder(registry: ServiceRegistry) -> LocationEngineBuilder {
        LocationEngineBuilder::new(registry)
    }

    /// Production engine: the four built-in adapters over one HTTP client,
    /// credentials read from the process environment at query time, and
    /// Nominatim as the anchor reverse geocoder.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Setup`] if the HTTP client cannot be built or a
    /// configured base URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, EngineError> {
        let client = build_http_client(&config.user_agent, config.http_connect_timeout_secs)?;
        let registry = ServiceRegistry::standard(
            config,
            &client,
            Arc::new(|key: &str| std::env::var(key).ok()),
        )?;
        let reverse = NominatimAdapter::with_base_url(client, &config.nominatim_base_url)?;

        Ok(Self::builder(registry)
            .reverse_geocoder(Arc::new(reverse))
            .apply_config(config)
            .build())
    }

    /// Resolve `query` to ranked candidates.
    ///
    /// Never returns zero locations for a non-blank query: when every
    /// adapter fails or finds nothing the result holds one fallback
    /// candidate. A blank query returns an empty result without calling any
    /// adapter.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidOptions`] for out-of-range options and
    /// [`EngineError::CallerTimeout`] when `overall_timeout_ms` elapses.
    pub async fn resolve(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<LocationSearchResult, EngineError> {
        self.orchestrator
            .run(query, &options, &CancellationToken::new())
            .await
    }

    /// As [`resolve`](Self::resolve), aborting with
    /// [`EngineError::Cancelled`] once `cancel` fires. An in-flight adapter
    /// call is dropped.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve), plus [`EngineError::Cancelled`].
    pub async fn resolve_cancellable(
        &self,
        query: &str,
        options: SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<LocationSearchResult, EngineError> {
        self.orchestrator.run(query, &options, cancel).await
    }

    /// Whole-search retries on [`EngineError::CallerTimeout`]. Attempt *n*
    /// runs with an overall budget of `base × 2^n`, where `base` is the
    /// options' `overall_timeout_ms` or else `policy.base_budget_ms`.
    ///
    /// # Errors
    ///
    /// The last attempt's error once `policy.max_attempts` is exhausted, or
    /// the first non-timeout error.
    pub async fn resolve_with_retry(
        &self,
        query: &str,
        options: SearchOptions,
        policy: &RetryPolicy,
    ) -> Result<LocationSearchResult, EngineError> {
        let base_ms = options.overall_timeout_ms.unwrap_or(policy.base_budget_ms);
        retry_with_backoff(policy, |attempt| {
            let attempt_options = options
                .clone()
                .with_overall_timeout_ms(RetryPolicy::budget_for(base_ms, attempt));
            async move { self.resolve(query, attempt_options).await }
        })
        .await
    }

    /// Store the latest device position as the default anchor.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOptions`] for coordinates outside WGS84.
    pub async fn set_user_location(&self, location: UserLocation) -> Result<(), EngineError> {
        if !location.coordinate().is_valid() {
            return Err(EngineError::InvalidOptions(format!(
                "user location ({}, {}) is outside WGS84 bounds",
                location.latitude, location.longitude
            )));
        }
        self.orchestrator.user_location.set(location).await;
        Ok(())
    }

    pub async fn user_location(&self) -> Option<UserLocation> {
        self.orchestrator.user_location.get().await
    }

    pub async fn clear_user_location(&self) {
        self.orchestrator.user_location.clear().await;
    }

    /// Drop cached searches and cached anchor localities.
    pub async fn clear_cache(&self) {
        self.orchestrator.cache.clear().await;
        self.orchestrator.localities.clear().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.orchestrator.cache.stats().await
    }

    /// Registry view of every adapter, ordered by priority.
    #[must_use]
    pub fn providers(&self) -> Vec<ServiceDescriptor> {
        self.orchestrator.registry.descriptors()
    }

    /// Options used by callers that have no preference of their own.
    #[must_use]
    pub fn default_options(&self) -> SearchOptions {
        self.defaults.clone()
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn empty_registry() -> ServiceRegistry {
        let env: HashMap<String, String> = HashMap::new();
        ServiceRegistry::with_lookup(Arc::new(move |k: &str| env.get(k).cloned()))
    }

    #[test]
    fn apply_config_sets_defaults_and_retry() {
        let config = AppConfig {
            default_max_results: 4,
            default_radius_km: 8.0,
            default_timeout_ms: 900,
            retry_max_attempts: 5,
            ..AppConfig::default()
        };
        let engine = LocationEngine::builder(empty_registry())
            .apply_config(&config)
            .build();
        let defaults = engine.default_options();
        assert_eq!(defaults.max_results, 4);
        assert!((defaults.search_radius_km - 8.0).abs() < f64::EPSILON);
        assert_eq!(defaults.timeout_ms, 900);
        assert_eq!(engine.retry_policy().max_attempts, 5);
        assert_eq!(engine.retry_policy().base_budget_ms, 900);
    }

    #[tokio::test]
    async fn rejects_out_of_range_user_location() {
        let engine = LocationEngine::builder(empty_registry()).build();
        let err = engine
            .set_user_location(UserLocation::new(123.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidOptions(_)));
        assert!(engine.user_location().await.is_none());
    }

    #[tokio::test]
    async fn shared_store_is_visible_to_host() {
        let store = Arc::new(UserLocationStore::new());
        let engine = LocationEngine::builder(empty_registry())
            .user_location(Arc::clone(&store))
            .build();
        engine
            .set_user_location(UserLocation::new(47.6, -122.3))
            .await
            .unwrap();
        assert_eq!(
            store.get().await.map(|l| l.coordinate()),
            Some(Coordinate::new(47.6, -122.3))
        );
    }
}
