//! Service registry: which adapters a search may call, and in what order.
//!
//! Eligibility is recomputed from the environment on every query, so a
//! rotated credential or flipped feature flag takes effect without a
//! restart.

use std::sync::Arc;

use wayfind_core::config::{
    ENABLE_FOURSQUARE, ENABLE_GOOGLE_PLACES, ENABLE_MAPBOX, FOURSQUARE_API_KEY,
    GOOGLE_PLACES_API_KEY, MAPBOX_ACCESS_TOKEN,
};
use wayfind_core::{credential_is_usable, parse_flag, AppConfig, ServiceDescriptor};
use wayfind_providers::adapters::{foursquare, google_places, mapbox, nominatim};
use wayfind_providers::{
    FoursquareAdapter, GeocodingProvider, GooglePlacesAdapter, MapboxAdapter, NominatimAdapter,
    ProviderError,
};

/// Adapters at or below this priority may end the cascade early.
pub const HIGH_PRIORITY_MAX: u32 = 2;

pub const GOOGLE_PLACES_PRIORITY: u32 = 1;
pub const FOURSQUARE_PRIORITY: u32 = 2;
pub const MAPBOX_PRIORITY: u32 = 3;
pub const NOMINATIM_PRIORITY: u32 = 10;

/// Reads one configuration value; `None` when unset.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builds a credentialed adapter from the credential current at query time.
pub type ProviderFactory =
    Arc<dyn Fn(&str) -> Result<Arc<dyn GeocodingProvider>, ProviderError> + Send + Sync>;

enum Backend {
    /// No credential; always constructed.
    Free(Arc<dyn GeocodingProvider>),
    Credentialed {
        credential_var: String,
        factory: ProviderFactory,
    },
}

struct Registration {
    key: String,
    display_name: String,
    priority: u32,
    enable_var: Option<String>,
    backend: Backend,
}

/// An eligible adapter, ready to call.
#[derive(Clone)]
pub struct ActiveProvider {
    pub descriptor: ServiceDescriptor,
    pub provider: Arc<dyn GeocodingProvider>,
}

pub struct ServiceRegistry {
    registrations: Vec<Registration>,
    lookup: EnvLookup,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceRegistry {
    /// Empty registry reading the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lookup(Arc::new(|key: &str| std::env::var(key).ok()))
    }

    /// Empty registry reading configuration through `lookup` (tests pass a
    /// `HashMap`-backed closure).
    #[must_use]
    pub fn with_lookup(lookup: EnvLookup) -> Self {
        Self {
            registrations: Vec::new(),
            lookup,
        }
    }

    /// The four built-in adapters sharing one HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidBaseUrl`] if the Nominatim base URL in
    /// `config` does not parse. Credentialed adapters are built lazily per
    /// query, so their base URLs are checked then.
    pub fn standard(
        config: &AppConfig,
        client: &reqwest::Client,
        lookup: EnvLookup,
    ) -> Result<Self, ProviderError> {
        let nominatim = NominatimAdapter::with_base_url(client.clone(), &config.nominatim_base_url)?;

        let mut registry = Self::with_lookup(lookup);

        let (c, base) = (client.clone(), config.google_places_base_url.clone());
        registry.register_credentialed(
            google_places::SOURCE,
            "Google Places",
            GOOGLE_PLACES_PRIORITY,
            ENABLE_GOOGLE_PLACES,
            GOOGLE_PLACES_API_KEY,
            Arc::new(move |key: &str| {
                let adapter = GooglePlacesAdapter::with_base_url(c.clone(), key, &base)?;
                Ok(Arc::new(adapter) as Arc<dyn GeocodingProvider>)
            }),
        );

        let (c, base) = (client.clone(), config.foursquare_base_url.clone());
        registry.register_credentialed(
            foursquare::SOURCE,
            "Foursquare",
            FOURSQUARE_PRIORITY,
            ENABLE_FOURSQUARE,
            FOURSQUARE_API_KEY,
            Arc::new(move |key: &str| {
                let adapter = FoursquareAdapter::with_base_url(c.clone(), key, &base)?;
                Ok(Arc::new(adapter) as Arc<dyn GeocodingProvider>)
            }),
        );

        let (c, base) = (client.clone(), config.mapbox_base_url.clone());
        registry.register_credentialed(
            mapbox::SOURCE,
            "Mapbox",
            MAPBOX_PRIORITY,
            ENABLE_MAPBOX,
            MAPBOX_ACCESS_TOKEN,
            Arc::new(move |token: &str| {
                let adapter = MapboxAdapter::with_base_url(c.clone(), token, &base)?;
                Ok(Arc::new(adapter) as Arc<dyn GeocodingProvider>)
            }),
        );

        registry.register_free(
            nominatim::SOURCE,
            "OpenStreetMap Nominatim",
            NOMINATIM_PRIORITY,
            Arc::new(nominatim),
        );

        Ok(registry)
    }

    /// Register an adapter that needs no credential and has no feature flag.
    pub fn register_free(
        &mut self,
        key: &str,
        display_name: &str,
        priority: u32,
        provider: Arc<dyn GeocodingProvider>,
    ) {
        self.registrations.push(Registration {
            key: key.to_string(),
            display_name: display_name.to_string(),
            priority,
            enable_var: None,
            backend: Backend::Free(provider),
        });
    }

    /// Register an adapter gated by a feature flag (default on) and a
    /// credential.
    pub fn register_credentialed(
        &mut self,
        key: &str,
        display_name: &str,
        priority: u32,
        enable_var: &str,
        credential_var: &str,
        factory: ProviderFactory,
    ) {
        self.registrations.push(Registration {
            key: key.to_string(),
            display_name: display_name.to_string(),
            priority,
            enable_var: Some(enable_var.to_string()),
            backend: Backend::Credentialed {
                credential_var: credential_var.to_string(),
                factory,
            },
        });
    }

    /// Every registered adapter, eligible or not, sorted by priority.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        let mut all: Vec<ServiceDescriptor> = self
            .registrations
            .iter()
            .map(|reg| self.describe(reg).0)
            .collect();
        all.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.key.cmp(&b.key)));
        all
    }

    /// Eligible adapters sorted ascending by priority.
    #[must_use]
    pub fn enabled_adapters(&self) -> Vec<ServiceDescriptor> {
        self.descriptors().into_iter().filter(|d| d.enabled).collect()
    }

    /// Eligible adapters, constructed and ready to call, in priority order.
    ///
    /// An adapter whose construction fails is logged and skipped.
    #[must_use]
    pub fn active_providers(&self) -> Vec<ActiveProvider> {
        let mut active: Vec<ActiveProvider> = self
            .registrations
            .iter()
            .filter_map(|reg| {
                let (descriptor, credential) = self.describe(reg);
                if !descriptor.enabled {
                    return None;
                }
                let provider = match (&reg.backend, credential) {
                    (Backend::Free(provider), _) => Arc::clone(provider),
                    (Backend::Credentialed { factory, .. }, Some(credential)) => {
                        match factory(&credential) {
                            Ok(provider) => provider,
                            Err(e) => {
                                tracing::warn!(
                                    adapter = %reg.key,
                                    error = %e,
                                    "adapter construction failed; skipping"
                                );
                                return None;
                            }
                        }
                    }
                    (Backend::Credentialed { .. }, None) => return None,
                };
                Some(ActiveProvider {
                    descriptor,
                    provider,
                })
            })
            .collect();
        active.sort_by(|a, b| {
            a.descriptor
                .priority
                .cmp(&b.descriptor.priority)
                .then_with(|| a.descriptor.key.cmp(&b.descriptor.key))
        });
        active
    }

    /// Descriptor for one registration plus the usable credential, if any.
    fn describe(&self, reg: &Registration) -> (ServiceDescriptor, Option<String>) {
        let flag_on = reg.enable_var.as_deref().is_none_or(|var| {
            match (self.lookup)(var) {
                None => true,
                Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                    tracing::warn!(var, value = %raw, "unrecognised feature flag; treating as enabled");
                    true
                }),
            }
        });

        let (credential_present, credential) = match &reg.backend {
            Backend::Free(_) => (true, None),
            Backend::Credentialed { credential_var, .. } => {
                let usable = (self.lookup)(credential_var)
                    .map(|raw| raw.trim().to_string())
                    .filter(|raw| credential_is_usable(raw));
                (usable.is_some(), usable)
            }
        };

        let descriptor = ServiceDescriptor {
            key: reg.key.clone(),
            display_name: reg.display_name.clone(),
            priority: reg.priority,
            enabled: flag_on && credential_present,
            credential_present,
        };
        (descriptor, credential)
    }
}
