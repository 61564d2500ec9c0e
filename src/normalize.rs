use serde::Serialize;

use crate::dates::{parse_literal, parse_timestamp, CanonicalDate};
use crate::domain::{RawRecord, Venue};
use crate::tags::split_all;
use crate::taxonomy::{classify, Classification, TagSet, Taxonomy, TaxonomyKind};

/// A raw record with its comparable forms precomputed. Never mutated after
/// creation; filtering only reads it.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedRecord {
    pub raw: RawRecord,
    /// Lowercased, trimmed area for matching; the original lives in `raw.area`
    pub area_key: Option<String>,
    pub vibes: TagSet,
    pub genres: TagSet,
    pub date: Option<CanonicalDate>,
    /// Venue category profile used by free-text search
    pub category: Option<Classification>,
}

impl NormalizedRecord {
    pub fn venue_id(&self) -> i64 {
        self.raw.venue_id
    }

    /// Area in its original casing, if present and non-blank.
    pub fn display_area(&self) -> Option<&str> {
        self.raw
            .area
            .as_deref()
            .map(str::trim)
            .filter(|area| !area.is_empty())
    }

    pub fn to_venue(&self) -> Venue {
        Venue::from(&self.raw)
    }
}

/// Derive the comparable forms of a raw record.
pub fn normalize(raw: RawRecord) -> NormalizedRecord {
    let area_key = raw
        .area
        .as_deref()
        .map(|area| area.trim().to_lowercase())
        .filter(|area| !area.is_empty());

    let vibes = tag_set(TaxonomyKind::Vibe, raw.vibe.as_deref());
    let genres = tag_set(TaxonomyKind::Genre, raw.genre.as_deref());

    // Records normally carry timestamps; a literal is accepted as a fallback
    let date = raw
        .date
        .as_deref()
        .and_then(|value| parse_timestamp(value).or_else(|| parse_literal(value)));

    let category = raw
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(|c| classify(TaxonomyKind::VenueCategory, c));

    NormalizedRecord {
        raw,
        area_key,
        vibes,
        genres,
        date,
        category,
    }
}

fn tag_set(kind: TaxonomyKind, compounds: Option<&[String]>) -> TagSet {
    let tags = split_all(compounds.unwrap_or_default());
    Taxonomy::get(kind).tag_set(tags.iter().map(String::as_str))
}
