//! Faceted filtering: filter state, per-record matching, option lists and
//! post-filter deduplication.

pub mod dedupe;
pub mod matcher;
pub mod options;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_ALL_AREAS_LABEL;
use crate::dates::DateFormat;
use crate::domain::Venue;
use crate::normalize::NormalizedRecord;

pub use dedupe::{dedupe, Identified};
pub use matcher::{matches, MatchRules, PreparedFilter};
pub use options::{options, options_for, tag_groups, FacetOptions};

/// One independent filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Area,
    Vibe,
    Date,
    Genre,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Area, Facet::Vibe, Facet::Date, Facet::Genre];

    /// Key used for this facet in option maps and query strings.
    pub fn key(&self) -> &'static str {
        match self {
            Facet::Area => "areas",
            Facet::Vibe => "vibes",
            Facet::Date => "dates",
            Facet::Genre => "genres",
        }
    }

    fn index(&self) -> usize {
        match self {
            Facet::Area => 0,
            Facet::Vibe => 1,
            Facet::Date => 2,
            Facet::Genre => 3,
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "area" | "areas" => Ok(Facet::Area),
            "vibe" | "vibes" => Ok(Facet::Vibe),
            "date" | "dates" => Ok(Facet::Date),
            "genre" | "genres" => Ok(Facet::Genre),
            other => Err(format!("unknown facet '{}'", other)),
        }
    }
}

/// The caller's current selections. Empty lists (or the all-areas
/// sentinel) impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    pub selected_areas: Vec<String>,
    pub active_vibes: Vec<String>,
    pub active_dates: Vec<String>,
    pub active_genres: Vec<String>,
    pub search_query: String,
}

impl FilterState {
    /// The landing state: all areas, nothing else selected.
    pub fn all_areas() -> Self {
        Self {
            selected_areas: vec![DEFAULT_ALL_AREAS_LABEL.to_string()],
            ..Self::default()
        }
    }

    /// Build a state from query parameters (`areas`, `vibes`, `dates`,
    /// `genres`, `search`). Values are comma-separated; dates may also be
    /// pipe-joined. Unknown keys are ignored.
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "areas" => state.selected_areas.extend(split_list(value, &[','])),
                "vibes" => state.active_vibes.extend(split_list(value, &[','])),
                "dates" => state.active_dates.extend(split_list(value, &[',', '|'])),
                "genres" => state.active_genres.extend(split_list(value, &[','])),
                "search" | "q" => state.search_query = value.trim().to_string(),
                _ => {}
            }
        }
        state
    }

    /// A copy of this state without any selection for `facet`.
    pub fn without(&self, facet: Facet) -> Self {
        let mut state = self.clone();
        match facet {
            Facet::Area => state.selected_areas.clear(),
            Facet::Vibe => state.active_vibes.clear(),
            Facet::Date => state.active_dates.clear(),
            Facet::Genre => state.active_genres.clear(),
        }
        state
    }

    /// Display format of the caller's date selections, `default` when none is recognizable.
    pub fn date_format(&self, default: DateFormat) -> DateFormat {
        self.active_dates
            .iter()
            .find_map(|d| DateFormat::detect(d))
            .unwrap_or(default)
    }
}

fn split_list(value: &str, delimiters: &[char]) -> Vec<String> {
    value
        .split(|c: char| delimiters.contains(&c))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run the full multi-facet filter and collapse duplicates, in that order.
pub fn apply(records: &[NormalizedRecord], state: &FilterState, rules: &MatchRules) -> Vec<Venue> {
    let filter = PreparedFilter::new(state, rules);
    let matched = records.iter().filter(|record| filter.matches(record));
    dedupe(matched).into_iter().map(NormalizedRecord::to_venue).collect()
}
