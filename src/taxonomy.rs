//! Category normalization.
//!
//! Venue categories, music genres and event vibes share one two-level
//! shape: a primary key with a display name and color, owning a list of
//! secondaries. Each secondary belongs to exactly one primary. Lookups are
//! total; a value outside the table is its own primary in the fallback
//! color.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::constants::FALLBACK_COLOR;

/// Which table a raw value is classified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    VenueCategory,
    Genre,
    Vibe,
}

#[derive(Debug)]
pub struct CategoryEntry {
    pub key: &'static str,
    pub display: &'static str,
    pub color: &'static str,
    pub secondaries: &'static [&'static str],
}

static VENUE_CATEGORY_ENTRIES: &[CategoryEntry] = &[
    CategoryEntry {
        key: "Music Events",
        display: "Music",
        color: "purple",
        secondaries: &["Electronic", "Hip-Hop/R&B", "Live Performance", "Arabic", "Mixed"],
    },
    CategoryEntry {
        key: "Sports & Viewing",
        display: "Sports & Viewing",
        color: "red",
        secondaries: &["Match Viewing"],
    },
    CategoryEntry {
        key: "Food & Dining",
        display: "Food & Drink",
        color: "yellow",
        secondaries: &["Tasting Event"],
    },
    CategoryEntry {
        key: "Comedy & Entertainment",
        display: "Comedy",
        color: "orange",
        secondaries: &["Stand-up Comedy"],
    },
    CategoryEntry {
        key: "Nightlife",
        display: "Nightlife",
        color: "pink",
        secondaries: &["Nightclub", "Lounge/Bar", "Rooftop Venue"],
    },
];

static GENRE_ENTRIES: &[CategoryEntry] = &[
    CategoryEntry {
        key: "Electronic",
        display: "Electronic",
        color: "purple",
        secondaries: &[
            "Techno",
            "House",
            "Deep House",
            "Tech House",
            "Melodic Techno",
            "Afro House",
            "Drum & Bass",
            "Trance",
            "Minimal",
        ],
    },
    CategoryEntry {
        key: "Hip-Hop/R&B",
        display: "Hip-Hop & R&B",
        color: "indigo",
        secondaries: &["Hip-Hop", "R&B", "Trap", "Afrobeats", "Dancehall"],
    },
    CategoryEntry {
        key: "Live Music",
        display: "Live Music",
        color: "blue",
        secondaries: &["Live Band", "Jazz", "Soul", "Acoustic", "Rock", "Funk"],
    },
    CategoryEntry {
        key: "Arabic",
        display: "Arabic",
        color: "teal",
        secondaries: &["Arabic Pop", "Khaleeji", "Shaabi"],
    },
    CategoryEntry {
        key: "Commercial",
        display: "Commercial",
        color: "pink",
        secondaries: &["Pop", "Top 40", "Latin", "Reggaeton", "Throwbacks"],
    },
];

static VIBE_ENTRIES: &[CategoryEntry] = &[
    CategoryEntry {
        key: "Party",
        display: "Party",
        color: "pink",
        secondaries: &["High Energy", "Dance Floor", "Late Night", "Rave"],
    },
    CategoryEntry {
        key: "Chill",
        display: "Chill",
        color: "teal",
        secondaries: &["Laid Back", "Sunset", "Lounge", "Acoustic Session"],
    },
    CategoryEntry {
        key: "Social",
        display: "Social",
        color: "yellow",
        secondaries: &["After Work", "Date Night", "Ladies Night", "Brunch"],
    },
    CategoryEntry {
        key: "Upscale",
        display: "Upscale",
        color: "purple",
        secondaries: &["Glamorous", "Exclusive", "Dress Code"],
    },
    CategoryEntry {
        key: "Outdoor",
        display: "Outdoor",
        color: "green",
        secondaries: &["Rooftop", "Beach", "Terrace", "Pool"],
    },
];

static COLOR_HEX: &[(&str, &str)] = &[
    ("purple", "#9333EA"),
    ("red", "#EF4444"),
    ("yellow", "#F59E0B"),
    ("orange", "#F97316"),
    ("pink", "#EC4899"),
    ("indigo", "#6366F1"),
    ("blue", "#3B82F6"),
    ("green", "#10B981"),
    ("teal", "#14B8A6"),
    ("gray", "#6B7280"),
];

static VENUE_CATEGORIES: Lazy<Taxonomy> =
    Lazy::new(|| Taxonomy::new(VENUE_CATEGORY_ENTRIES));
static GENRES: Lazy<Taxonomy> = Lazy::new(|| Taxonomy::new(GENRE_ENTRIES));
static VIBES: Lazy<Taxonomy> = Lazy::new(|| Taxonomy::new(VIBE_ENTRIES));

/// Result of classifying one raw value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub display: String,
    pub color: String,
    pub primary: String,
    /// Canonical secondary spelling when the value was a known secondary
    pub secondary: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Primary(usize),
    Secondary(usize, usize),
}

/// One static table plus a case-insensitive index over keys, display names and secondaries.
#[derive(Debug)]
pub struct Taxonomy {
    entries: &'static [CategoryEntry],
    index: HashMap<String, Slot>,
}

impl Taxonomy {
    fn new(entries: &'static [CategoryEntry]) -> Self {
        let mut index = HashMap::new();
        for (p, entry) in entries.iter().enumerate() {
            for (s, secondary) in entry.secondaries.iter().enumerate() {
                index.insert(secondary.to_lowercase(), Slot::Secondary(p, s));
            }
        }
        // Primaries win over a secondary spelled the same way
        for (p, entry) in entries.iter().enumerate() {
            index.insert(entry.display.to_lowercase(), Slot::Primary(p));
            index.insert(entry.key.to_lowercase(), Slot::Primary(p));
        }
        Self { entries, index }
    }

    pub fn get(kind: TaxonomyKind) -> &'static Taxonomy {
        match kind {
            TaxonomyKind::VenueCategory => Lazy::force(&VENUE_CATEGORIES),
            TaxonomyKind::Genre => Lazy::force(&GENRES),
            TaxonomyKind::Vibe => Lazy::force(&VIBES),
        }
    }

    pub fn classify(&self, raw: &str) -> Classification {
        let trimmed = raw.trim();
        match self.index.get(&trimmed.to_lowercase()) {
            Some(Slot::Primary(p)) => {
                let entry = &self.entries[*p];
                Classification {
                    display: entry.display.to_string(),
                    color: entry.color.to_string(),
                    primary: entry.key.to_string(),
                    secondary: None,
                }
            }
            Some(Slot::Secondary(p, s)) => {
                let entry = &self.entries[*p];
                let secondary = entry.secondaries[*s];
                Classification {
                    display: secondary.to_string(),
                    color: entry.color.to_string(),
                    primary: entry.key.to_string(),
                    secondary: Some(secondary.to_string()),
                }
            }
            None => Classification {
                display: trimmed.to_string(),
                color: FALLBACK_COLOR.to_string(),
                primary: trimmed.to_string(),
                secondary: None,
            },
        }
    }

    pub fn primaries(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.key).collect()
    }

    pub fn secondaries(&self, primary: &str) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|entry| entry.key.eq_ignore_ascii_case(primary.trim()))
            .map(|entry| entry.secondaries)
            .unwrap_or(&[])
    }

    /// Build a TagSet from atomic tags.
    pub fn tag_set<'a, I>(&self, tags: I) -> TagSet
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = TagSet::default();
        for tag in tags {
            if tag.trim().is_empty() {
                continue;
            }
            set.insert(self.classify(tag));
        }
        set
    }

    /// Group the primaries and secondaries present in `sets` for legend display.
    pub fn groups<'a, I>(&self, sets: I) -> Vec<TagGroup>
    where
        I: IntoIterator<Item = &'a TagSet>,
    {
        let mut merged: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for set in sets {
            for primary in &set.primaries {
                let secondaries = merged.entry(primary.clone()).or_default();
                if let Some(present) = set.secondaries_by_primary.get(primary) {
                    secondaries.extend(present.iter().cloned());
                }
            }
        }

        merged
            .into_iter()
            .map(|(primary, secondaries)| {
                let profile = self.classify(&primary);
                TagGroup {
                    hex: hex_color(&profile.color).to_string(),
                    display: profile.display,
                    color: profile.color,
                    primary,
                    secondaries: secondaries.into_iter().collect(),
                }
            })
            .collect()
    }
}

/// Canonical primary/secondary tags for one taggable field of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSet {
    pub primaries: BTreeSet<String>,
    pub secondaries_by_primary: BTreeMap<String, BTreeSet<String>>,
}

impl TagSet {
    pub fn insert(&mut self, classification: Classification) {
        self.primaries.insert(classification.primary.clone());
        if let Some(secondary) = classification.secondary {
            self.secondaries_by_primary
                .entry(classification.primary)
                .or_default()
                .insert(secondary);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primaries.is_empty()
    }

    /// True if `value` names one of the primaries or any secondary, ignoring case.
    pub fn contains(&self, value: &str) -> bool {
        let needle = value.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.values().any(|tag| tag.to_lowercase() == needle)
    }

    /// Every primary followed by every secondary.
    pub fn values(&self) -> impl Iterator<Item = &String> {
        self.primaries
            .iter()
            .chain(self.secondaries_by_primary.values().flatten())
    }
}

/// A primary with its display profile and the secondaries observed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagGroup {
    pub primary: String,
    pub display: String,
    pub color: String,
    pub hex: String,
    pub secondaries: Vec<String>,
}

/// Classify a raw value against one of the static tables.
pub fn classify(kind: TaxonomyKind, raw: &str) -> Classification {
    Taxonomy::get(kind).classify(raw)
}

/// Hex code for a color name; unknown names map to gray.
pub fn hex_color(color: &str) -> &'static str {
    COLOR_HEX
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(color))
        .or_else(|| COLOR_HEX.iter().find(|(name, _)| *name == FALLBACK_COLOR))
        .map(|(_, hex)| *hex)
        .unwrap_or("#6B7280")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_primary_maps_to_display_and_color() {
        let c = classify(TaxonomyKind::VenueCategory, "Music Events");
        assert_eq!(c.display, "Music");
        assert_eq!(c.color, "purple");
        assert_eq!(c.primary, "Music Events");
        assert_eq!(c.secondary, None);

        let by_display = classify(TaxonomyKind::VenueCategory, "food & drink");
        assert_eq!(by_display.primary, "Food & Dining");
    }

    #[test]
    fn test_secondary_resolves_to_owning_primary() {
        let c = classify(TaxonomyKind::Genre, " deep house ");
        assert_eq!(c.primary, "Electronic");
        assert_eq!(c.secondary.as_deref(), Some("Deep House"));
        assert_eq!(c.display, "Deep House");
        assert_eq!(c.color, "purple");
    }

    #[test]
    fn test_unknown_value_is_its_own_primary() {
        let c = classify(TaxonomyKind::Vibe, "  Bohemian ");
        assert_eq!(c.display, "Bohemian");
        assert_eq!(c.primary, "Bohemian");
        assert_eq!(c.color, "gray");
        assert_eq!(hex_color(&c.color), "#6B7280");
    }

    #[test]
    fn test_every_secondary_has_exactly_one_primary() {
        for kind in [TaxonomyKind::VenueCategory, TaxonomyKind::Genre, TaxonomyKind::Vibe] {
            let taxonomy = Taxonomy::get(kind);
            let mut seen = BTreeSet::new();
            for primary in taxonomy.primaries() {
                for secondary in taxonomy.secondaries(primary) {
                    assert!(seen.insert(secondary.to_lowercase()), "{secondary} listed twice");
                    assert_eq!(taxonomy.classify(secondary).primary, primary);
                }
            }
        }
    }

    #[test]
    fn test_tag_set_membership() {
        let set = Taxonomy::get(TaxonomyKind::Genre).tag_set(["Techno", "Jazz", "Polka"]);
        assert!(set.contains("Electronic"));
        assert!(set.contains("techno"));
        assert!(set.contains("Live Music"));
        assert!(set.contains("Polka"));
        assert!(!set.contains("House"));
        assert!(!set.contains(""));
        assert_eq!(set.primaries.len(), 3);
    }

    #[test]
    fn test_membership_folds_non_ascii_case() {
        let set = Taxonomy::get(TaxonomyKind::Vibe).tag_set(["Éclectique", "Straße"]);
        assert!(set.contains("éclectique"));
        assert!(set.contains("ÉCLECTIQUE"));
        assert!(set.contains("straße"));
    }

    #[test]
    fn test_groups_merge_sets() {
        let genres = Taxonomy::get(TaxonomyKind::Genre);
        let a = genres.tag_set(["Techno"]);
        let b = genres.tag_set(["House", "Jazz"]);
        let groups = genres.groups([&a, &b]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].primary, "Electronic");
        assert_eq!(groups[0].secondaries, vec!["House", "Techno"]);
        assert_eq!(groups[0].hex, "#9333EA");
        assert_eq!(groups[1].primary, "Live Music");
    }

    #[test]
    fn test_hex_color_fallback() {
        assert_eq!(hex_color("teal"), "#14B8A6");
        assert_eq!(hex_color("chartreuse"), "#6B7280");
    }
}
