use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::constants::{default_area_aliases, DEFAULT_ALL_AREAS_LABEL};
use crate::dates::DateFormat;
use crate::error::{FacetError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub filters: FilterConfig,
    pub source: SourceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Area label treated like the "all" sentinel
    pub all_areas_label: String,
    /// Abbreviation -> expanded names, matched as substrings of the venue area
    pub area_aliases: BTreeMap<String, Vec<String>>,
    /// Format for date options when the filter state carries no dates
    pub default_date_format: DateFormat,
}

impl FilterConfig {
    /// Configured aliases extend the built-in table; a key present in both keeps the configured names.
    fn merge_default_aliases(&mut self) {
        for (alias, names) in default_area_aliases() {
            self.area_aliases.entry(alias).or_insert(names);
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            all_areas_label: DEFAULT_ALL_AREAS_LABEL.to_string(),
            area_aliases: default_area_aliases().into_iter().collect(),
            default_date_format: DateFormat::Long,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Local JSON snapshot, used when no URL is set
    pub path: Option<String>,
    /// REST endpoint returning the snapshot as a JSON array
    pub url: Option<String>,
    pub api_key: Option<String>,
    /// Add PostgREST select/filter/order parameters to the request
    pub postgrest: bool,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            api_key: None,
            postgrest: false,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. A missing file yields defaults;
    /// `SNAPSHOT_URL`, `SNAPSHOT_API_KEY` and `SNAPSHOT_PATH` override the source section.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                FacetError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            info!("Loaded configuration from {}", path.display());
            Self::from_toml(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.filters.merge_default_aliases();
        if config.source.timeout_seconds == 0 {
            return Err(FacetError::Config(
                "source.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SNAPSHOT_URL") {
            self.source.url = Some(url);
        }
        if let Ok(key) = std::env::var("SNAPSHOT_API_KEY") {
            self.source.api_key = Some(key);
        }
        if let Ok(path) = std::env::var("SNAPSHOT_PATH") {
            self.source.path = Some(path);
        }
    }
}
