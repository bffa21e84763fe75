use std::cmp::Ordering;

use wayfind_core::GeocodedLocation;

/// Floor for the "still local" distance cap used when ordering.
pub const GENEROUS_CAP_KM: f64 = 50.0;

/// `max(radius, 50 km)`.
#[must_use]
pub fn generous_cap_km(search_radius_km: f64) -> f64 {
    search_radius_km.max(GENEROUS_CAP_KM)
}

/// Order scored candidates for presentation. The head is the best match;
/// callers truncate to `max_results`.
///
/// With an anchor, candidates inside the generous cap come first, each group
/// ordered by ascending distance with ties broken by descending score.
/// Without an anchor the order is descending score.
#[must_use]
pub fn order(
    mut candidates: Vec<GeocodedLocation>,
    anchored: bool,
    search_radius_km: f64,
) -> Vec<GeocodedLocation> {
    if anchored {
        let cap = generous_cap_km(search_radius_km);
        candidates.sort_by(|a, b| {
            let a_local = a.distance_km.is_some_and(|d| d <= cap);
            let b_local = b.distance_km.is_some_and(|d| d <= cap);
            b_local
                .cmp(&a_local)
                .then_with(|| compare_distance(a.distance_km, b.distance_km))
                .then_with(|| by_score_desc(a, b))
        });
    } else {
        candidates.sort_by(by_score_desc);
    }
    candidates
}

/// Known distances ascend; unknown distances sort last.
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn by_score_desc(a: &GeocodedLocation, b: &GeocodedLocation) -> Ordering {
    b.composite_score.total_cmp(&a.composite_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, distance_km: Option<f64>, score: f64) -> GeocodedLocation {
        GeocodedLocation {
            latitude: 0.0,
            longitude: 0.0,
            address: String::new(),
            place_name: name.to_string(),
            city: None,
            state: None,
            country: None,
            place_type: None,
            relevance: 0.5,
            distance_km,
            source: "test".to_string(),
            place_id: None,
            composite_score: score,
            extras: serde_json::Map::new(),
        }
    }

    fn names(list: &[GeocodedLocation]) -> Vec<&str> {
        list.iter().map(|c| c.place_name.as_str()).collect()
    }

    #[test]
    fn anchored_orders_by_distance_over_score() {
        let out = order(
            vec![
                candidate("far-perfect", Some(40.0), 95.0),
                candidate("near-mediocre", Some(0.3), 60.0),
                candidate("mid", Some(5.0), 70.0),
            ],
            true,
            15.0,
        );
        assert_eq!(names(&out), vec!["near-mediocre", "mid", "far-perfect"]);
    }

    #[test]
    fn anchored_ties_break_on_score() {
        let out = order(
            vec![
                candidate("low", Some(2.0), 10.0),
                candidate("high", Some(2.0), 80.0),
            ],
            true,
            15.0,
        );
        assert_eq!(names(&out), vec!["high", "low"]);
    }

    #[test]
    fn local_candidates_precede_distant_ones() {
        let out = order(
            vec![
                candidate("beyond-cap", Some(120.0), 99.0),
                candidate("unknown", None, 99.0),
                candidate("inside-cap", Some(45.0), 1.0),
            ],
            true,
            15.0,
        );
        assert_eq!(names(&out), vec!["inside-cap", "beyond-cap", "unknown"]);
    }

    #[test]
    fn unanchored_orders_by_score() {
        let out = order(
            vec![
                candidate("b", None, 50.0),
                candidate("a", None, 90.0),
                candidate("c", None, 10.0),
            ],
            false,
            15.0,
        );
        assert_eq!(names(&out), vec!["a", "b", "c"]);
    }

    #[test]
    fn anchored_output_is_distance_non_decreasing() {
        let input: Vec<_> = [7.0, 0.5, 33.0, 2.0, 14.9, 49.0]
            .iter()
            .enumerate()
            .map(|(i, d)| {
                #[allow(clippy::cast_precision_loss)]
                let score = 100.0 - i as f64;
                candidate(&format!("c{i}"), Some(*d), score)
            })
            .collect();
        let out = order(input, true, 15.0);
        for pair in out.windows(2) {
            assert!(pair[0].distance_km.unwrap() <= pair[1].distance_km.unwrap());
        }
    }

    #[test]
    fn generous_cap_never_below_fifty() {
        assert!((generous_cap_km(15.0) - 50.0).abs() < f64::EPSILON);
        assert!((generous_cap_km(80.0) - 80.0).abs() < f64::EPSILON);
    }
}
