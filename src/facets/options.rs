//! Per-facet option lists under self-exclusion: the options for a facet
//! honor every other active facet but never the facet's own selection, so
//! choosing one area still lists the other areas that have results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::dates::{CanonicalDate, DateFormat};
use crate::normalize::NormalizedRecord;
use crate::taxonomy::{TagGroup, Taxonomy, TaxonomyKind};

use super::matcher::{MatchRules, PreparedFilter};
use super::{Facet, FilterState};

/// Selectable values per facet, serialized as `{areas, vibes, dates, genres}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
    pub areas: Vec<String>,
    pub vibes: Vec<String>,
    pub dates: Vec<String>,
    pub genres: Vec<String>,
}

impl FacetOptions {
    pub fn get(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::Area => &self.areas,
            Facet::Vibe => &self.vibes,
            Facet::Date => &self.dates,
            Facet::Genre => &self.genres,
        }
    }

    fn slot(&mut self, facet: Facet) -> &mut Vec<String> {
        match facet {
            Facet::Area => &mut self.areas,
            Facet::Vibe => &mut self.vibes,
            Facet::Date => &mut self.dates,
            Facet::Genre => &mut self.genres,
        }
    }
}

/// Which facets one record passes, evaluated once and reused for every facet's view.
struct Verdict([bool; 4]);

impl Verdict {
    fn new(filter: &PreparedFilter, record: &NormalizedRecord) -> Self {
        let mut passes = [true; 4];
        for facet in Facet::ALL {
            passes[facet.index()] = filter.matches_facet(record, facet);
        }
        Self(passes)
    }

    fn passes_except(&self, skip: Facet) -> bool {
        Facet::ALL
            .iter()
            .filter(|facet| **facet != skip)
            .all(|facet| self.0[facet.index()])
    }
}

/// Options for a single facet.
pub fn options_for(
    facet: Facet,
    records: &[NormalizedRecord],
    state: &FilterState,
    rules: &MatchRules,
    default_format: DateFormat,
) -> Vec<String> {
    let filter = PreparedFilter::new(state, rules);
    let view = records
        .iter()
        .filter(|record| filter.matches_except(record, facet));
    project(facet, view, state.date_format(default_format))
}

/// Options for all four facets in one pass over the records.
pub fn options(
    records: &[NormalizedRecord],
    state: &FilterState,
    rules: &MatchRules,
    default_format: DateFormat,
) -> FacetOptions {
    let filter = PreparedFilter::new(state, rules);
    let verdicts: Vec<Verdict> = records.iter().map(|r| Verdict::new(&filter, r)).collect();
    let format = state.date_format(default_format);

    let mut result = FacetOptions::default();
    for facet in Facet::ALL {
        let view = records
            .iter()
            .zip(&verdicts)
            .filter(|(_, verdict)| verdict.passes_except(facet))
            .map(|(record, _)| record);
        *result.slot(facet) = project(facet, view, format);
    }
    result
}

/// Primary/secondary grouping of the vibe or genre options, with display
/// names and colors. Area and date facets have no grouping and yield nothing.
pub fn tag_groups(
    facet: Facet,
    records: &[NormalizedRecord],
    state: &FilterState,
    rules: &MatchRules,
) -> Vec<TagGroup> {
    let kind = match facet {
        Facet::Vibe => TaxonomyKind::Vibe,
        Facet::Genre => TaxonomyKind::Genre,
        Facet::Area | Facet::Date => return Vec::new(),
    };
    let filter = PreparedFilter::new(state, rules);
    let sets = records
        .iter()
        .filter(|record| filter.matches_except(record, facet))
        .map(|record| match kind {
            TaxonomyKind::Vibe => &record.vibes,
            _ => &record.genres,
        });
    Taxonomy::get(kind).groups(sets)
}

fn project<'a, I>(facet: Facet, view: I, format: DateFormat) -> Vec<String>
where
    I: Iterator<Item = &'a NormalizedRecord>,
{
    match facet {
        Facet::Area => {
            let areas: BTreeSet<&str> = view.filter_map(NormalizedRecord::display_area).collect();
            areas.into_iter().map(str::to_string).collect()
        }
        Facet::Vibe => sorted_tags(view.flat_map(|r| r.vibes.values())),
        Facet::Genre => sorted_tags(view.flat_map(|r| r.genres.values())),
        Facet::Date => {
            let dates: BTreeSet<CanonicalDate> = view.filter_map(|r| r.date).collect();
            let mut rendered: Vec<String> = Vec::with_capacity(dates.len());
            for date in dates {
                let literal = format.render(date);
                if rendered.last() != Some(&literal) {
                    rendered.push(literal);
                }
            }
            rendered
        }
    }
}

fn sorted_tags<'a, I>(tags: I) -> Vec<String>
where
    I: Iterator<Item = &'a String>,
{
    let unique: BTreeSet<&String> = tags.collect();
    unique.into_iter().cloned().collect()
}
