//! Canonical place-type vocabulary.
//!
//! Providers describe places with hundreds of category strings; the engine
//! only reasons about this small set.

use serde::{Deserialize, Serialize};

use crate::text::tokenize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    Restaurant,
    Cafe,
    Store,
    Park,
    Museum,
    Accommodation,
    Healthcare,
    Education,
    Entertainment,
    Shopping,
    Place,
}

/// Keyword table, checked in order. Earlier rows win when a raw category
/// mentions several (e.g. `"coffee_shop"` is a cafe, not a store).
const KEYWORDS: &[(PlaceType, &[&str])] = &[
    (
        PlaceType::Cafe,
        &["cafe", "café", "coffee", "espresso", "tea", "bakery", "teahouse"],
    ),
    (
        PlaceType::Restaurant,
        &[
            "restaurant", "food", "diner", "bistro", "pizza", "pizzeria", "sushi", "burger",
            "grill", "eatery", "bar", "pub", "meal", "takeaway", "steakhouse", "fast",
        ],
    ),
    (
        PlaceType::Park,
        &["park", "garden", "playground", "trail", "nature", "beach", "campground"],
    ),
    (
        PlaceType::Museum,
        &["museum", "gallery", "art", "exhibit", "memorial", "monument"],
    ),
    (
        PlaceType::Accommodation,
        &["hotel", "motel", "lodging", "hostel", "inn", "resort", "accommodation"],
    ),
    (
        PlaceType::Healthcare,
        &[
            "hospital", "clinic", "doctor", "pharmacy", "dentist", "health", "medical",
            "healthcare",
        ],
    ),
    (
        PlaceType::Education,
        &["school", "university", "college", "library", "education", "academy"],
    ),
    (
        PlaceType::Entertainment,
        &[
            "cinema", "theater", "theatre", "movie", "stadium", "arena", "club", "bowling",
            "casino", "amusement", "entertainment", "zoo", "aquarium",
        ],
    ),
    (
        PlaceType::Shopping,
        &["mall", "shopping", "market", "outlet", "department"],
    ),
    (
        PlaceType::Store,
        &[
            "store", "shop", "supermarket", "grocery", "convenience", "boutique", "retail",
            "hardware",
        ],
    ),
];

impl PlaceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Cafe => "cafe",
            Self::Store => "store",
            Self::Park => "park",
            Self::Museum => "museum",
            Self::Accommodation => "accommodation",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Place => "place",
        }
    }

    /// Map a raw provider category (e.g. `"coffee_shop"`, `"Hotel"`) to the
    /// canonical set. Unknown categories become [`PlaceType::Place`].
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let tokens = tokenize(raw);
        KEYWORDS
            .iter()
            .find(|(_, words)| tokens.iter().any(|t| words.contains(&t.as_str())))
            .map_or(Self::Place, |(kind, _)| *kind)
    }

    /// Classify the first recognisable entry of a category list.
    #[must_use]
    pub fn classify_any<'a, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        raw.into_iter()
            .map(Self::classify)
            .find(|kind| *kind != Self::Place)
            .unwrap_or(Self::Place)
    }

    /// Query words that signal the user is looking for this kind of place.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        KEYWORDS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or(&[], |(_, words)| *words)
    }

    /// Types that are most often the target of a free-text place search.
    #[must_use]
    pub fn is_high_utility(self) -> bool {
        matches!(
            self,
            Self::Restaurant | Self::Cafe | Self::Park | Self::Museum | Self::Store
        )
    }
}

impl std::fmt::Display for PlaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
