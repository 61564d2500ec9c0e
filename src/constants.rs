//! Shared literals used across normalization and filtering.

/// Separator inside compound vibe/genre strings ("Techno|Deep House")
pub const TAG_DELIMITER: char = '|';

/// Area selection meaning "no area constraint"
pub const ALL_AREAS_SENTINEL: &str = "all";

/// The label the UI uses for the all-areas choice
pub const DEFAULT_ALL_AREAS_LABEL: &str = "All Dubai";

/// Country reported for venues whose source row has none
pub const DEFAULT_COUNTRY: &str = "UAE";

/// Color name for categories the taxonomy does not know
pub const FALLBACK_COLOR: &str = "gray";

pub const DEFAULT_CONFIG_PATH: &str = "facets.toml";

/// Default user-facing area aliases: abbreviation -> expanded official names
pub fn default_area_aliases() -> Vec<(String, Vec<String>)> {
    vec![(
        "JBR".to_string(),
        vec!["Jumeirah Beach Residence".to_string()],
    )]
}
