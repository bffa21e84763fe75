//! Composite 0–100 candidate score.
//!
//! | Component      | Points                                   |
//! |----------------|------------------------------------------|
//! | Relevance      | `relevance × 35`                         |
//! | Proximity      | 45 → 0, piecewise-linear over distance   |
//! | Name match     | 0–15                                     |
//! | Place type     | 0–5                                      |
//! | Source trust   | 0–5                                      |
//! | Far penalty    | −10 / −25 / −40 beyond 50 / 100 / 200 km |

use wayfind_core::{match_name, tokenize, GeocodedLocation};
use wayfind_providers::source_tier;

const RELEVANCE_WEIGHT: f64 = 35.0;
const NAME_MATCH_MAX: f64 = 15.0;
const TYPE_KEYWORD_BONUS: f64 = 3.0;
const TYPE_UTILITY_BONUS: f64 = 2.0;
const TYPE_BONUS_MAX: f64 = 5.0;

/// `(upper bound km, points at lower bound, points at upper bound)`.
const PROXIMITY_BANDS: &[(f64, f64, f64)] = &[
    (1.0, 45.0, 40.0),
    (5.0, 40.0, 30.0),
    (15.0, 30.0, 15.0),
    (50.0, 15.0, 5.0),
    (200.0, 5.0, 0.0),
];

/// `(beyond km, penalty)`, checked from the farthest threshold down.
const DISTANCE_PENALTIES: &[(f64, f64)] = &[(200.0, 40.0), (100.0, 25.0), (50.0, 10.0)];

/// Proximity points for a distance. No distance (no anchor) earns nothing.
#[must_use]
pub fn proximity_points(distance_km: Option<f64>) -> f64 {
    let Some(distance) = distance_km.filter(|d| d.is_finite()) else {
        return 0.0;
    };
    let distance = distance.max(0.0);

    let mut lower = 0.0;
    for &(upper, start, end) in PROXIMITY_BANDS {
        if distance <= upper {
            let t = (distance - lower) / (upper - lower);
            return start + (end - start) * t;
        }
        lower = upper;
    }
    0.0
}

#[must_use]
pub fn distance_penalty(distance_km: Option<f64>) -> f64 {
    let Some(distance) = distance_km else {
        return 0.0;
    };
    DISTANCE_PENALTIES
        .iter()
        .find(|(beyond, _)| distance > *beyond)
        .map_or(0.0, |(_, penalty)| *penalty)
}

/// Type-fit bonus: the query mentions a word for the candidate's type, plus a
/// fixed bonus for commonly searched types.
#[must_use]
pub fn type_bonus(query: &str, candidate: &GeocodedLocation) -> f64 {
    let Some(kind) = candidate.place_type else {
        return 0.0;
    };
    let tokens = tokenize(query);
    let mut bonus = 0.0;
    if tokens
        .iter()
        .any(|t| kind.keywords().contains(&t.as_str()))
    {
        bonus += TYPE_KEYWORD_BONUS;
    }
    if kind.is_high_utility() {
        bonus += TYPE_UTILITY_BONUS;
    }
    bonus.min(TYPE_BONUS_MAX)
}

/// Composite score for one candidate, clamped to `[0, 100]`.
#[must_use]
pub fn composite_score(query: &str, candidate: &GeocodedLocation) -> f64 {
    let relevance = candidate.relevance.clamp(0.0, 1.0) * RELEVANCE_WEIGHT;
    let proximity = proximity_points(candidate.distance_km);
    let name = NAME_MATCH_MAX * match_name(query, &candidate.place_name).fraction();
    let kind = type_bonus(query, candidate);
    let trust = source_tier(&candidate.source).trust_bonus();
    let penalty = distance_penalty(candidate.distance_km);

    (relevance + proximity + name + kind + trust - penalty).clamp(0.0, 100.0)
}

/// Overwrite `composite_score` on every candidate.
pub fn score_all(query: &str, candidates: &mut [GeocodedLocation]) {
    for candidate in candidates {
        candidate.composite_score = composite_score(query, candidate);
    }
}
