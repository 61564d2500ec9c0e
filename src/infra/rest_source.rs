use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use std::time::Duration;
use tracing::{debug, info};

use crate::app::ports::SnapshotSourcePort;
use crate::config::SourceConfig;
use crate::domain::RawRecord;
use crate::error::{FacetError, Result};

use super::decode_snapshot;

/// Columns of the joined venue/event view the engine reads.
const SNAPSHOT_COLUMNS: &str = "venue_venue_id,venue_name_original,venue_area,venue_address,\
venue_country,venue_lat,venue_lng,venue_phone_number,venue_website,venue_category,\
venue_created_at,venue_final_instagram,event_vibe,event_date,music_genre";

/// Fetches the snapshot with one HTTP GET.
///
/// With `postgrest` enabled the request selects the view's columns,
/// excludes rows without identity or coordinates server-side and orders by
/// venue name, the way a Supabase REST table is queried.
pub struct RestSnapshotSource {
    client: reqwest::Client,
    url: String,
    postgrest: bool,
}

impl RestSnapshotSource {
    pub fn new(url: impl Into<String>, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| FacetError::Config(format!("Invalid API key: {}", e)))?;
            let raw = HeaderValue::from_str(key)
                .map_err(|e| FacetError::Config(format!("Invalid API key: {}", e)))?;
            headers.insert(AUTHORIZATION, bearer);
            headers.insert("apikey", raw);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            postgrest: false,
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| FacetError::Config("source.url is not set".to_string()))?;
        let source = Self::new(
            url,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_seconds),
        )?;
        Ok(source.with_postgrest(config.postgrest))
    }

    pub fn with_postgrest(mut self, enabled: bool) -> Self {
        self.postgrest = enabled;
        self
    }

    fn query_params(&self) -> Vec<(&'static str, &'static str)> {
        if !self.postgrest {
            return Vec::new();
        }
        vec![
            ("select", SNAPSHOT_COLUMNS),
            ("venue_venue_id", "not.is.null"),
            ("venue_lat", "not.is.null"),
            ("venue_lng", "not.is.null"),
            ("order", "venue_name_original.asc"),
        ]
    }
}

#[async_trait]
impl SnapshotSourcePort for RestSnapshotSource {
    fn describe(&self) -> String {
        format!("rest:{}", self.url)
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        debug!("Requesting snapshot from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .query(&self.query_params())
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        info!("Received {} bytes from {}", bytes.len(), self.url);
        decode_snapshot(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgrest_params_only_when_enabled() {
        let plain = RestSnapshotSource::new("http://localhost/venues", None, Duration::from_secs(5)).unwrap();
        assert!(plain.query_params().is_empty());

        let rest = plain.with_postgrest(true);
        let params = rest.query_params();
        assert_eq!(params[0].0, "select");
        assert!(params[0].1.contains("music_genre"));
        assert!(params.contains(&("venue_lat", "not.is.null")));
    }

    #[test]
    fn test_from_config_requires_url() {
        let config = SourceConfig::default();
        assert!(matches!(
            RestSnapshotSource::from_config(&config),
            Err(FacetError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_api_key_is_config_error() {
        let result = RestSnapshotSource::new("http://localhost", Some("bad\nkey"), Duration::from_secs(1));
        assert!(matches!(result, Err(FacetError::Config(_))));
    }
}
