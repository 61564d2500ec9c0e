use crate::config::FilterConfig;
use crate::constants::{default_area_aliases, ALL_AREAS_SENTINEL, DEFAULT_ALL_AREAS_LABEL};
use crate::dates::{parse_literal, CanonicalDate};
use crate::normalize::NormalizedRecord;
use crate::taxonomy::TagSet;

use super::{Facet, FilterState};

/// Area-matching rules that come from configuration rather than the filter state.
#[derive(Debug, Clone)]
pub struct MatchRules {
    all_areas_label: String,
    /// Lowercased abbreviation -> lowercased expansions
    area_aliases: Vec<(String, Vec<String>)>,
}

impl MatchRules {
    pub fn new<A, E>(all_areas_label: &str, aliases: A) -> Self
    where
        A: IntoIterator<Item = (String, E)>,
        E: IntoIterator<Item = String>,
    {
        Self {
            all_areas_label: all_areas_label.trim().to_lowercase(),
            area_aliases: aliases
                .into_iter()
                .map(|(short, expansions)| {
                    (
                        short.trim().to_lowercase(),
                        expansions.into_iter().map(|e| e.trim().to_lowercase()).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn is_all_areas(&self, selection: &str) -> bool {
        let selection = selection.trim().to_lowercase();
        selection == ALL_AREAS_SENTINEL || selection == self.all_areas_label
    }

    /// Substrings that satisfy one area selection: the selection itself plus
    /// the expansions of a matching alias.
    fn area_needles(&self, selection: &str) -> Vec<String> {
        let needle = selection.trim().to_lowercase();
        let mut needles = vec![needle.clone()];
        if let Some((_, expansions)) = self.area_aliases.iter().find(|(short, _)| *short == needle) {
            needles.extend(expansions.iter().cloned());
        }
        needles
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        Self::new(DEFAULT_ALL_AREAS_LABEL, default_area_aliases())
    }
}

impl From<&FilterConfig> for MatchRules {
    fn from(config: &FilterConfig) -> Self {
        Self::new(&config.all_areas_label, config.area_aliases.clone())
    }
}

/// A filter state with its selections pre-parsed so a pass over many
/// records does the parsing once.
#[derive(Debug, Clone)]
pub struct PreparedFilter {
    /// `None` when the area facet is inactive
    area_needles: Option<Vec<String>>,
    vibes: Vec<String>,
    genres: Vec<String>,
    /// `None` when inactive; unparseable selections are kept as `None` and never match
    dates: Option<Vec<Option<CanonicalDate>>>,
    search: Option<String>,
}

impl PreparedFilter {
    pub fn new(state: &FilterState, rules: &MatchRules) -> Self {
        let areas: Vec<&String> = state
            .selected_areas
            .iter()
            .filter(|area| !area.trim().is_empty())
            .collect();
        let area_needles = if areas.is_empty() || areas.iter().any(|a| rules.is_all_areas(a)) {
            None
        } else {
            Some(areas.iter().flat_map(|a| rules.area_needles(a)).collect())
        };

        let dates: Vec<Option<CanonicalDate>> = state
            .active_dates
            .iter()
            .filter(|d| !d.trim().is_empty())
            .map(|d| parse_literal(d))
            .collect();

        let search = Some(state.search_query.trim().to_lowercase()).filter(|q| !q.is_empty());

        Self {
            area_needles,
            vibes: non_blank(&state.active_vibes),
            genres: non_blank(&state.active_genres),
            dates: if dates.is_empty() { None } else { Some(dates) },
            search,
        }
    }

    pub fn is_active(&self, facet: Facet) -> bool {
        match facet {
            Facet::Area => self.area_needles.is_some(),
            Facet::Vibe => !self.vibes.is_empty(),
            Facet::Date => self.dates.is_some(),
            Facet::Genre => !self.genres.is_empty(),
        }
    }

    /// Every facet and the free-text search must pass.
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        Facet::ALL.iter().all(|facet| self.matches_facet(record, *facet))
            && self.matches_search(record)
    }

    /// Every facet except `skip` must pass. The free-text search is not a
    /// facet and is not consulted.
    pub fn matches_except(&self, record: &NormalizedRecord, skip: Facet) -> bool {
        Facet::ALL
            .iter()
            .filter(|facet| **facet != skip)
            .all(|facet| self.matches_facet(record, *facet))
    }

    pub fn matches_facet(&self, record: &NormalizedRecord, facet: Facet) -> bool {
        match facet {
            Facet::Area => self.matches_area(record),
            Facet::Vibe => all_selected(&self.vibes, &record.vibes),
            Facet::Date => self.matches_date(record),
            Facet::Genre => all_selected(&self.genres, &record.genres),
        }
    }

    fn matches_area(&self, record: &NormalizedRecord) -> bool {
        let Some(needles) = &self.area_needles else {
            return true;
        };
        match &record.area_key {
            Some(area) => needles.iter().any(|needle| area.contains(needle.as_str())),
            None => false,
        }
    }

    fn matches_date(&self, record: &NormalizedRecord) -> bool {
        let Some(selected) = &self.dates else {
            return true;
        };
        match record.date {
            Some(date) => selected.iter().any(|s| *s == Some(date)),
            None => false,
        }
    }

    pub fn matches_search(&self, record: &NormalizedRecord) -> bool {
        let Some(query) = &self.search else {
            return true;
        };
        if record.raw.name.to_lowercase().contains(query.as_str()) {
            return true;
        }
        let raw_category = record.raw.category.as_deref().unwrap_or_default();
        if raw_category.to_lowercase().contains(query.as_str()) {
            return true;
        }
        record.category.as_ref().is_some_and(|c| {
            c.display.to_lowercase().contains(query.as_str())
                || c.primary.to_lowercase().contains(query.as_str())
        })
    }
}

/// AND across selections: each selected value must name a primary or a secondary of the set.
fn all_selected(selected: &[String], tags: &TagSet) -> bool {
    selected.iter().all(|value| tags.contains(value))
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decide whether one record survives the full filter state.
pub fn matches(record: &NormalizedRecord, state: &FilterState, rules: &MatchRules) -> bool {
    PreparedFilter::new(state, rules).matches(record)
}
