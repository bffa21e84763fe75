//! Query normalisation and name-match relevance.
//!
//! A single matcher backs both the adapter-side `relevance` value and the
//! scorer's name-match bonus, so the two can never disagree on what counts
//! as an exact or partial hit.

use std::sync::LazyLock;

use regex::Regex;

static TOKEN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));

/// Weight of a whole-token hit relative to a partial (substring) hit.
const EXACT_TOKEN_WEIGHT: f64 = 3.0;
const PARTIAL_TOKEN_WEIGHT: f64 = 1.0;

/// Token-overlap relevance is scaled below the containment tier.
const OVERLAP_CEILING: f64 = 0.85;

/// Minimum token length considered for substring (partial) matches.
const MIN_PARTIAL_LEN: usize = 3;

/// How a candidate name relates to the query text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NameMatch {
    /// Case-insensitive equality after trimming.
    Exact,
    /// One string contains the other.
    Contains,
    /// Weighted token overlap ratio in `[0, 1]`.
    Overlap(f64),
}

impl NameMatch {
    /// Share of the full name-match credit this match earns.
    #[must_use]
    pub fn fraction(self) -> f64 {
        match self {
            Self::Exact => 1.0,
            Self::Contains => 0.9,
            Self::Overlap(ratio) => ratio.clamp(0.0, 1.0),
        }
    }
}

/// Trim, lower-case, and collapse internal whitespace.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lower-cased alphanumeric tokens of `text`.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_SPLIT
        .split(&text.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Classify how `name` matches `query`.
#[must_use]
pub fn match_name(query: &str, name: &str) -> NameMatch {
    let q = normalize_query(query);
    let n = normalize_query(name);
    if q.is_empty() || n.is_empty() {
        return NameMatch::Overlap(0.0);
    }
    if q == n {
        return NameMatch::Exact;
    }
    if n.contains(&q) || q.contains(&n) {
        return NameMatch::Contains;
    }
    NameMatch::Overlap(token_overlap(&tokenize(&q), &tokenize(&n)))
}

/// Textual relevance in `[0, 1]`: 1.0 exact, 0.9 containment, otherwise the
/// weighted token overlap scaled below the containment tier.
#[must_use]
pub fn text_relevance(query: &str, name: &str) -> f64 {
    match match_name(query, name) {
        NameMatch::Exact => 1.0,
        NameMatch::Contains => 0.9,
        NameMatch::Overlap(ratio) => ratio * OVERLAP_CEILING,
    }
}

/// Weighted share of query tokens found in `name_tokens`.
///
/// A whole-token hit earns three times the credit of a substring hit.
#[must_use]
pub fn token_overlap(query_tokens: &[String], name_tokens: &[String]) -> f64 {
    if query_tokens.is_empty() || name_tokens.is_empty() {
        return 0.0;
    }

    let earned: f64 = query_tokens
        .iter()
        .map(|q| {
            if name_tokens.iter().any(|n| n == q) {
                EXACT_TOKEN_WEIGHT
            } else if name_tokens.iter().any(|n| is_partial_hit(q, n)) {
                PARTIAL_TOKEN_WEIGHT
            } else {
                0.0
            }
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let possible = query_tokens.len() as f64 * EXACT_TOKEN_WEIGHT;
    (earned / possible).clamp(0.0, 1.0)
}

fn is_partial_hit(query_token: &str, name_token: &str) -> bool {
    let (short, long) = if query_token.len() <= name_token.len() {
        (query_token, name_token)
    } else {
        (name_token, query_token)
    };
    short.chars().count() >= MIN_PARTIAL_LEN && long.contains(short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_query_trims_lowercases_and_collapses() {
        assert_eq!(normalize_query("  Joe's   COFFEE \t"), "joe's coffee");
    }

    #[test]
    fn tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("Joe's Coffee-House, NYC"),
            vec!["joe", "s", "coffee", "house", "nyc"]
        );
    }

    #[test]
    fn exact_match_scores_one() {
        assert!((text_relevance("Blue Bottle", "blue bottle") - 1.0).abs() < f64::EPSILON);
        assert_eq!(match_name("Blue Bottle", "  BLUE BOTTLE "), NameMatch::Exact);
    }

    #[test]
    fn strict_substring_scores_below_one_but_at_least_point_eight() {
        let r = text_relevance("Blue Bottle", "Blue Bottle Coffee Roasters");
        assert!(r < 1.0);
        assert!(r >= 0.8);
    }

    #[test]
    fn containment_works_in_both_directions() {
        assert_eq!(
            match_name("Blue Bottle Coffee Oakland", "Blue Bottle Coffee"),
            NameMatch::Contains
        );
    }

    #[test]
    fn unrelated_name_scores_below_half() {
        assert!(text_relevance("Blue Bottle", "Central Park Zoo") < 0.5);
        assert!(text_relevance("Blue Bottle", "Central Park Zoo").abs() < f64::EPSILON);
    }

    #[test]
    fn exact_tokens_outweigh_partial_tokens() {
        let exact = text_relevance("pizza place", "Place for Pizza");
        let partial = text_relevance("pizza place", "Pizzeria Placeholder");
        assert!(exact > partial, "exact={exact} partial={partial}");
        assert!(partial > 0.0);
    }

    #[test]
    fn overlap_never_reaches_containment_tier() {
        let r = text_relevance("coffee blue", "Blue Coffee");
        assert!(r < 0.9, "got {r}");
        assert!(r > 0.8, "all tokens hit exactly, got {r}");
    }

    #[test]
    fn short_tokens_do_not_count_as_partial_hits() {
        assert!(token_overlap(&tokenize("a"), &tokenize("alpha")).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert!(text_relevance("", "Anything").abs() < f64::EPSILON);
        assert!(text_relevance("cafe", "").abs() < f64::EPSILON);
    }

    #[test]
    fn fraction_tracks_match_tier() {
        assert!((NameMatch::Exact.fraction() - 1.0).abs() < f64::EPSILON);
        assert!((NameMatch::Contains.fraction() - 0.9).abs() < f64::EPSILON);
        assert!((NameMatch::Overlap(1.4).fraction() - 1.0).abs() < f64::EPSILON);
    }
}
