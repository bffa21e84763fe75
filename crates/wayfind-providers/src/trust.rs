//! Source trust tiers for candidates.
//!
//! Tiers feed the scorer's trust bonus. Unknown source keys are treated as
//! community data.

use serde::{Deserialize, Serialize};

use crate::adapters::{foursquare, google_places, mapbox, nominatim};

/// Key written into candidates produced by the last-resort fallback.
pub const FALLBACK_SOURCE: &str = "fallback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    /// Placeholder result; never a real place.
    Synthetic,
    /// Open, crowd-sourced data.
    Community,
    Premium,
    /// Commercial POI databases with verified listings.
    Authoritative,
}

impl SourceTier {
    /// Score points added by the scorer for this tier.
    #[must_use]
    pub fn trust_bonus(self) -> f64 {
        match self {
            Self::Authoritative => 5.0,
            Self::Premium => 3.0,
            Self::Community => 1.0,
            Self::Synthetic => 0.0,
        }
    }
}

/// Map an adapter key to its trust tier.
#[must_use]
pub fn source_tier(source: &str) -> SourceTier {
    match source {
        google_places::SOURCE | mapbox::SOURCE => SourceTier::Authoritative,
        foursquare::SOURCE => SourceTier::Premium,
        FALLBACK_SOURCE => SourceTier::Synthetic,
        nominatim::SOURCE => SourceTier::Community,
        other => {
            tracing::trace!(source = other, "unknown source key; treating as community");
            SourceTier::Community
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sources_map_to_tiers() {
        assert_eq!(source_tier("google_places"), SourceTier::Authoritative);
        assert_eq!(source_tier("mapbox"), SourceTier::Authoritative);
        assert_eq!(source_tier("foursquare"), SourceTier::Premium);
        assert_eq!(source_tier("nominatim"), SourceTier::Community);
        assert_eq!(source_tier("fallback"), SourceTier::Synthetic);
    }

    #[test]
    fn unknown_source_is_community() {
        assert_eq!(source_tier("bing"), SourceTier::Community);
    }

    #[test]
    fn tiers_order_by_trust() {
        assert!(SourceTier::Authoritative > SourceTier::Premium);
        assert!(SourceTier::Premium > SourceTier::Community);
        assert!(SourceTier::Community > SourceTier::Synthetic);
        assert!(
            SourceTier::Authoritative.trust_bonus() > SourceTier::Community.trust_bonus()
        );
    }
}
