//! Structured search events and the observer seam that receives them.

use std::fmt;

/// Which cascade produced an adapter event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Primary,
    /// The locality-augmented retry.
    Second,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Second => f.write_str("second"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    AdapterAttempted {
        adapter: String,
        pass: Pass,
    },
    AdapterSucceeded {
        adapter: String,
        pass: Pass,
        count: usize,
        elapsed_ms: u64,
    },
    /// `transport` is set for timeouts and network-level failures;
    /// clear when the provider reported the error itself.
    AdapterFailed {
        adapter: String,
        pass: Pass,
        transport: bool,
        reason: String,
    },
    CacheHit {
        key: String,
        count: usize,
    },
    FallbackUsed {
        query: String,
        error_count: usize,
    },
    SecondPass {
        query: String,
        kept: usize,
    },
    EarlyTermination {
        adapter: String,
        count: usize,
    },
    ReverseGeocodeFailed {
        reason: String,
    },
}

impl SearchEvent {
    /// Stable snake_case event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AdapterAttempted { .. } => "adapter_attempted",
            Self::AdapterSucceeded { .. } => "adapter_succeeded",
            Self::AdapterFailed { .. } => "adapter_failed",
            Self::CacheHit { .. } => "cache_hit",
            Self::FallbackUsed { .. } => "fallback_used",
            Self::SecondPass { .. } => "second_pass",
            Self::EarlyTermination { .. } => "early_termination",
            Self::ReverseGeocodeFailed { .. } => "reverse_geocode_failed",
        }
    }
}

/// Receives every [`SearchEvent`] the engine emits.
pub trait SearchObserver: Send + Sync {
    fn on_event(&self, event: &SearchEvent);
}

/// Default observer: forwards events to `tracing` at a level that matches
/// their severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_event(&self, event: &SearchEvent) {
        let name = event.name();
        match event {
            SearchEvent::AdapterAttempted { adapter, pass } => {
                tracing::debug!(event = name, adapter = %adapter, %pass, "calling adapter");
            }
            SearchEvent::AdapterSucceeded {
                adapter,
                pass,
                count,
                elapsed_ms,
            } => {
                tracing::debug!(event = name, adapter = %adapter, %pass, count, elapsed_ms, "adapter returned");
            }
            SearchEvent::AdapterFailed {
                adapter,
                pass,
                transport,
                reason,
            } => {
                tracing::warn!(event = name, adapter = %adapter, %pass, transport, reason = %reason, "adapter failed");
            }
            SearchEvent::CacheHit { key, count } => {
                tracing::debug!(event = name, key = %key, count, "search cache hit");
            }
            SearchEvent::FallbackUsed { query, error_count } => {
                tracing::info!(event = name, query = %query, error_count, "no candidates; using fallback");
            }
            SearchEvent::SecondPass { query, kept } => {
                tracing::debug!(event = name, query = %query, kept, "locality-augmented pass finished");
            }
            SearchEvent::EarlyTermination { adapter, count } => {
                tracing::debug!(event = name, adapter = %adapter, count, "cascade stopped early");
            }
            SearchEvent::ReverseGeocodeFailed { reason } => {
                tracing::warn!(event = name, reason = %reason, "anchor reverse geocode failed");
            }
        }
    }
}
