//! Priority cascade across the active adapters.
//!
//! One search runs: anchor resolution, cache lookup, anchor locality lookup,
//! the primary cascade, radius and region filtering, an optional
//! locality-augmented second pass, then dedup, scoring and ordering. An
//! empty outcome becomes a single fallback candidate.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use wayfind_core::geo::haversine_km;
use wayfind_core::{Coordinate, GeocodedLocation, LocationSearchResult, Locality, SearchOptions};
use wayfind_providers::ProviderRequest;

use crate::cache::SearchCache;
use crate::dedup::dedup;
use crate::error::EngineError;
use crate::fallback::FallbackProvider;
use crate::locality::{region_consistent, within_radius, LocalityResolver};
use crate::registry::{ServiceRegistry, HIGH_PRIORITY_MAX};
use crate::scorer::score_all;
use crate::selector::order;
use crate::telemetry::{Pass, SearchEvent, SearchObserver};
use crate::user_location::UserLocationStore;

/// Candidates this close to the anchor count as "very close".
pub const INNER_RADIUS_KM: f64 = 10.0;

#[derive(Debug, Default)]
struct CascadeOutcome {
    candidates: Vec<GeocodedLocation>,
    errors: Vec<String>,
}

pub(crate) struct Orchestrator {
    pub(crate) registry: Arc<ServiceRegistry>,
    pub(crate) user_location: Arc<UserLocationStore>,
    pub(crate) cache: Arc<SearchCache>,
    pub(crate) localities: LocalityResolver,
    pub(crate) observer: Arc<dyn SearchObserver>,
    pub(crate) fallback: FallbackProvider,
    pub(crate) exhaustive_cascade: bool,
}

impl Orchestrator {
    /// Run one search under the caller's cancellation token and overall
    /// budget.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOptions`] before any work starts,
    /// [`EngineError::Cancelled`] when `cancel` fires, and
    /// [`EngineError::CallerTimeout`] when `overall_timeout_ms` elapses.
    pub(crate) async fn run(
        &self,
        query: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<LocationSearchResult, EngineError> {
        options.validate().map_err(EngineError::InvalidOptions)?;

        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(LocationSearchResult::empty(query, options.search_radius_km));
        }

        let search = async {
            tokio::select! {
                biased;
                () = cancel.cancelled() => Err(EngineError::Cancelled),
                result = self.search(trimmed, options) => Ok(result),
            }
        };

        match options.overall_timeout_ms {
            Some(budget_ms) => tokio::time::timeout(Duration::from_millis(budget_ms), search)
                .await
                .map_err(|_| EngineError::CallerTimeout { budget_ms })?,
            None => search.await,
        }
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> LocationSearchResult {
        let radius_km = options.search_radius_km;
        let per_call = Duration::from_millis(options.timeout_ms);
        let anchor = self.effective_anchor(options).await;

        if let Some(cached) = self.cache.lookup(query, anchor, radius_km).await {
            self.observer.on_event(&SearchEvent::CacheHit {
                key: SearchCache::key(query, anchor, radius_km),
                count: cached.results.len(),
            });
            let mut locations = cached.results;
            locations.truncate(options.max_results);
            let mut result =
                LocationSearchResult::from_locations(query, locations, radius_km, Vec::new());
            result.from_cache = true;
            return result;
        }

        let locality = match anchor {
            Some(point) => {
                self.localities
                    .resolve(point, per_call, self.observer.as_ref())
                    .await
            }
            None => None,
        };
        let country_code = locality.as_ref().and_then(|l| l.country_code.clone());

        let request = ProviderRequest::new(query, options.max_results, radius_km)
            .with_anchor(anchor)
            .with_country_code(country_code.clone());
        let primary = self.cascade(&request, per_call, Pass::Primary).await;
        let mut errors = primary.errors;
        let mut candidates = filter(primary.candidates, anchor, radius_km, locality.as_ref());

        if let (Some(point), Some(locality)) = (anchor, locality.as_ref()) {
            if needs_second_pass(&candidates, options.max_results) {
                if let Some(label) = locality.label() {
                    let widened = format!("{query} {label}");
                    let cap = (options.max_results / 2).max(1);
                    let second_request = ProviderRequest::new(&widened, cap, radius_km)
                        .with_anchor(Some(point))
                        .with_country_code(country_code);
                    let second = self.cascade(&second_request, per_call, Pass::Second).await;
                    errors.extend(second.errors);

                    let closest = closest_distance(&candidates);
                    let kept: Vec<GeocodedLocation> =
                        filter(second.candidates, anchor, radius_km, Some(locality))
                            .into_iter()
                            .filter(|c| c.distance_km.is_some_and(|d| d < closest))
                            .collect();
                    self.observer.on_event(&SearchEvent::SecondPass {
                        query: widened,
                        kept: kept.len(),
                    });
                    candidates.extend(kept);
                }
            }
        }

        let mut candidates = dedup(candidates);
        score_all(query, &mut candidates);
        let ordered = order(candidates, anchor.is_some(), radius_km);

        if ordered.is_empty() {
            self.observer.on_event(&SearchEvent::FallbackUsed {
                query: query.to_string(),
                error_count: errors.len(),
            });
            let placeholder = self.fallback.locate(query, anchor);
            let mut result =
                LocationSearchResult::from_locations(query, vec![placeholder], radius_km, errors);
            result.used_fallback = true;
            return result;
        }

        self.cache
            .store(query, anchor, radius_km, ordered.clone())
            .await;
        let mut locations = ordered;
        locations.truncate(options.max_results);
        LocationSearchResult::from_locations(query, locations, radius_km, errors)
    }

    /// Explicit anchor wins and becomes the stored location; otherwise the
    /// stored location, if valid.
    async fn effective_anchor(&self, options: &SearchOptions) -> Option<Coordinate> {
        if let Some(anchor) = options.anchor {
            self.user_location.set(anchor.into()).await;
            return Some(anchor);
        }
        self.user_location
            .get()
            .await
            .map(|location| location.coordinate())
            .filter(Coordinate::is_valid)
    }

    async fn cascade(
        &self,
        request: &ProviderRequest,
        per_call: Duration,
        pass: Pass,
    ) -> CascadeOutcome {
        let mut outcome = CascadeOutcome::default();
        let mut trusted_contributed = false;

        for active in self.registry.active_providers() {
            let adapter = active.descriptor.key.clone();
            self.observer.on_event(&SearchEvent::AdapterAttempted {
                adapter: adapter.clone(),
                pass,
            });

            let started = Instant::now();
            let reason = match tokio::time::timeout(per_call, active.provider.search(request)).await
            {
                Ok(Ok(mut found)) => {
                    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                    self.observer.on_event(&SearchEvent::AdapterSucceeded {
                        adapter: adapter.clone(),
                        pass,
                        count: found.len(),
                        elapsed_ms,
                    });
                    if !found.is_empty() {
                        if let Some(anchor) = request.anchor {
                            attach_distances(&mut found, anchor);
                        }
                        trusted_contributed |= active.descriptor.priority <= HIGH_PRIORITY_MAX;
                        outcome.candidates.extend(found);
                    }
                    None
                }
                Ok(Err(e)) => Some((e.is_transport(), e.to_string())),
                Err(_) => Some((true, format!("timed out after {} ms", per_call.as_millis()))),
            };

            if let Some((transport, reason)) = reason {
                outcome
                    .errors
                    .push(format!("{adapter} ({}): {reason}", failure_class(transport)));
                self.observer.on_event(&SearchEvent::AdapterFailed {
                    adapter,
                    pass,
                    transport,
                    reason,
                });
                continue;
            }

            if trusted_contributed && self.may_stop(&outcome.candidates, request) {
                self.observer.on_event(&SearchEvent::EarlyTermination {
                    adapter,
                    count: outcome.candidates.len(),
                });
                break;
            }
        }
        outcome
    }

    /// Stop once enough candidates are in hand, provided one of them is
    /// already very close when the search is anchored.
    fn may_stop(&self, candidates: &[GeocodedLocation], request: &ProviderRequest) -> bool {
        if self.exhaustive_cascade || candidates.len() < request.max_results {
            return false;
        }
        request.anchor.is_none()
            || candidates
                .iter()
                .any(|c| c.distance_km.is_some_and(|d| d <= INNER_RADIUS_KM))
    }
}

/// Label prefixed to entries in `errors`.
fn failure_class(transport: bool) -> &'static str {
    if transport {
        "transport"
    } else {
        "provider"
    }
}

fn attach_distances(candidates: &mut [GeocodedLocation], anchor: Coordinate) {
    for candidate in candidates {
        if candidate.distance_km.is_none() {
            candidate.distance_km = Some(haversine_km(anchor, candidate.coordinate()));
        }
    }
}

/// Region then radius filter. Unanchored searches pass through untouched.
fn filter(
    candidates: Vec<GeocodedLocation>,
    anchor: Option<Coordinate>,
    radius_km: f64,
    locality: Option<&Locality>,
) -> Vec<GeocodedLocation> {
    if anchor.is_none() {
        return candidates;
    }
    let regional: Vec<GeocodedLocation> = match locality {
        Some(locality) => candidates
            .into_iter()
            .filter(|c| region_consistent(c, locality))
            .collect(),
        None => candidates,
    };
    within_radius(regional, radius_km)
}

fn needs_second_pass(candidates: &[GeocodedLocation], max_results: usize) -> bool {
    !candidates.is_empty()
        && candidates.len() < max_results
        && !candidates
            .iter()
            .any(|c| c.distance_km.is_some_and(|d| d <= INNER_RADIUS_KM))
}

fn closest_distance(candidates: &[GeocodedLocation]) -> f64 {
    candidates
        .iter()
        .filter_map(|c| c.distance_km)
        .fold(f64::INFINITY, f64::min)
}
