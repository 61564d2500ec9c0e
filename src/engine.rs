//! Snapshot holder and query entry point.
//!
//! A [`Snapshot`] is normalized once and never mutated. [`FacetEngine`]
//! keeps the current one behind an `Arc`; a query clones the `Arc` and
//! drops the lock before doing any work, so a refresh swaps snapshots
//! atomically without waiting for, or interleaving with, queries already
//! running against the old one.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::app::ports::SnapshotSourcePort;
use crate::config::FilterConfig;
use crate::dates::DateFormat;
use crate::domain::{RawRecord, Venue};
use crate::error::{FacetError, Result};
use crate::facets::{self, Facet, FacetOptions, FilterState, MatchRules};
use crate::metrics::FacetMetrics;
use crate::normalize::{normalize, NormalizedRecord};
use crate::taxonomy::TagGroup;

/// One fetched, normalized copy of the record source.
#[derive(Debug)]
pub struct Snapshot {
    records: Vec<NormalizedRecord>,
    loaded_at: DateTime<Utc>,
    /// Order in which the fetch behind this snapshot started
    generation: u64,
}

impl Snapshot {
    pub fn from_raw(raw: Vec<RawRecord>) -> Self {
        let records: Vec<NormalizedRecord> = raw.into_iter().map(normalize).collect();
        debug!("Normalized {} records", records.len());
        Self {
            records,
            loaded_at: Utc::now(),
            generation: 0,
        }
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

pub struct FacetEngine {
    rules: MatchRules,
    default_date_format: DateFormat,
    current: RwLock<Option<Arc<Snapshot>>>,
    generations: AtomicU64,
}

impl FacetEngine {
    pub fn new(rules: MatchRules, default_date_format: DateFormat) -> Self {
        Self {
            rules,
            default_date_format,
            current: RwLock::new(None),
            generations: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(MatchRules::from(config), config.default_date_format)
    }

    /// Fetch a new snapshot and install it. On failure the previous
    /// snapshot, if any, stays in place and the error is returned.
    ///
    /// Overlapping refreshes are ordered by when their fetch started: a
    /// fetch that finishes after a later-started one has been installed is
    /// discarded.
    pub async fn refresh(&self, source: &dyn SnapshotSourcePort) -> Result<usize> {
        let generation = self.next_generation();
        let started = Instant::now();
        let raw = match source.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Snapshot fetch from {} failed: {}", source.describe(), e);
                FacetMetrics::record_snapshot_error();
                return Err(e);
            }
        };

        let mut snapshot = Snapshot::from_raw(raw);
        snapshot.generation = generation;
        let count = snapshot.len();
        if !self.install_if_newer(snapshot) {
            warn!(
                "Discarding snapshot from {}: a newer refresh was installed first",
                source.describe()
            );
            return Ok(count);
        }

        let elapsed = started.elapsed().as_secs_f64();
        FacetMetrics::record_snapshot_loaded(count, elapsed);
        info!(
            "Loaded snapshot of {} records from {} in {:.3}s",
            count,
            source.describe(),
            elapsed
        );
        Ok(count)
    }

    /// Replace the current snapshot unconditionally.
    pub fn install(&self, mut snapshot: Snapshot) {
        snapshot.generation = self.next_generation();
        self.install_if_newer(snapshot);
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn install_if_newer(&self, snapshot: Snapshot) -> bool {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = guard.as_ref() {
            if current.generation > snapshot.generation {
                return false;
            }
        }
        *guard = Some(Arc::new(snapshot));
        true
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn require_snapshot(&self) -> Result<Arc<Snapshot>> {
        self.snapshot().ok_or(FacetError::SnapshotUnavailable)
    }

    /// Filtered, deduplicated venues. Empty when no snapshot is loaded.
    pub fn filter(&self, state: &FilterState) -> Vec<Venue> {
        let Some(snapshot) = self.snapshot_or_warn() else {
            return Vec::new();
        };
        let venues = facets::apply(snapshot.records(), state, &self.rules);
        FacetMetrics::record_filter_pass(venues.len());
        debug!(
            "Filter pass kept {} venues out of {} records",
            venues.len(),
            snapshot.len()
        );
        venues
    }

    /// Option lists for all facets. Empty when no snapshot is loaded.
    pub fn options(&self, state: &FilterState) -> FacetOptions {
        let Some(snapshot) = self.snapshot_or_warn() else {
            return FacetOptions::default();
        };
        let options = facets::options(
            snapshot.records(),
            state,
            &self.rules,
            self.default_date_format,
        );
        FacetMetrics::record_option_pass();
        debug!(
            areas = options.areas.len(),
            vibes = options.vibes.len(),
            dates = options.dates.len(),
            genres = options.genres.len(),
            "Computed facet options"
        );
        options
    }

    pub fn options_for(&self, facet: Facet, state: &FilterState) -> Vec<String> {
        let Some(snapshot) = self.snapshot_or_warn() else {
            return Vec::new();
        };
        facets::options_for(
            facet,
            snapshot.records(),
            state,
            &self.rules,
            self.default_date_format,
        )
    }

    pub fn tag_groups(&self, facet: Facet, state: &FilterState) -> Vec<TagGroup> {
        let Some(snapshot) = self.snapshot_or_warn() else {
            return Vec::new();
        };
        facets::tag_groups(facet, snapshot.records(), state, &self.rules)
    }

    fn snapshot_or_warn(&self) -> Option<Arc<Snapshot>> {
        let snapshot = self.snapshot();
        if snapshot.is_none() {
            warn!("Query received before any snapshot was loaded");
            FacetMetrics::record_query_without_snapshot();
        }
        snapshot
    }
}

impl Default for FacetEngine {
    fn default() -> Self {
        Self::new(MatchRules::default(), DateFormat::Long)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    struct MockSource {
        batches: Mutex<Vec<Result<Vec<RawRecord>>>>,
    }

    impl MockSource {
        fn new(batches: Vec<Result<Vec<RawRecord>>>) -> Self {
            Self {
                batches: Mutex::new(batches),
            }
        }
    }

    #[async_trait]
    impl SnapshotSourcePort for MockSource {
        fn describe(&self) -> String {
            "mock".to_string()
        }

        async fn fetch(&self) -> Result<Vec<RawRecord>> {
            self.batches.lock().unwrap().remove(0)
        }
    }

    /// Hands out batches in call order; a batch with a gate waits for it before returning.
    struct GatedSource {
        batches: Mutex<Vec<(Option<oneshot::Receiver<()>>, Vec<RawRecord>)>>,
    }

    #[async_trait]
    impl SnapshotSourcePort for GatedSource {
        fn describe(&self) -> String {
            "gated".to_string()
        }

        async fn fetch(&self) -> Result<Vec<RawRecord>> {
            let (gate, records) = self.batches.lock().unwrap().remove(0);
            if let Some(gate) = gate {
                gate.await.ok();
            }
            Ok(records)
        }
    }

    fn raw(id: i64, area: &str) -> RawRecord {
        serde_json::from_value(json!({ "venue_id": id, "name": format!("Venue {id}"), "area": area, "lat": 25.0, "lng": 55.0 })).unwrap()
    }

    #[test]
    fn test_no_snapshot_yields_empty_results() {
        let engine = FacetEngine::default();
        let state = FilterState::all_areas();
        assert!(engine.filter(&state).is_empty());
        assert_eq!(engine.options(&state), FacetOptions::default());
        assert!(engine.options_for(Facet::Area, &state).is_empty());
        assert!(matches!(engine.require_snapshot(), Err(FacetError::SnapshotUnavailable)));
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let engine = FacetEngine::default();
        let source = MockSource::new(vec![
            Ok(vec![raw(1, "Dubai Marina")]),
            Ok(vec![raw(2, "Downtown Dubai"), raw(3, "JBR")]),
        ]);

        assert_eq!(engine.refresh(&source).await.unwrap(), 1);
        let first = engine.snapshot().unwrap();

        assert_eq!(engine.refresh(&source).await.unwrap(), 2);
        let ids: Vec<i64> = engine
            .filter(&FilterState::all_areas())
            .iter()
            .map(|v| v.venue_id)
            .collect();
        assert_eq!(ids, vec![2, 3]);

        // A query holding the old snapshot still sees it unchanged
        assert_eq!(first.len(), 1);
        assert!(engine.snapshot().unwrap().loaded_at() >= first.loaded_at());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let engine = FacetEngine::default();
        let source = MockSource::new(vec![
            Ok(vec![raw(1, "Dubai Marina")]),
            Err(FacetError::Source {
                message: "timeout".to_string(),
            }),
        ]);

        engine.refresh(&source).await.unwrap();
        assert!(engine.refresh(&source).await.is_err());
        assert_eq!(engine.filter(&FilterState::all_areas()).len(), 1);
    }

    #[tokio::test]
    async fn test_slow_older_refresh_does_not_replace_newer_snapshot() {
        let engine = FacetEngine::default();
        let (release, gate) = oneshot::channel();
        let source = GatedSource {
            batches: Mutex::new(vec![
                (Some(gate), vec![raw(1, "Dubai Marina")]),
                (None, vec![raw(2, "Downtown Dubai")]),
            ]),
        };

        let (older, newer) = tokio::join!(engine.refresh(&source), async {
            tokio::task::yield_now().await;
            let loaded = engine.refresh(&source).await;
            release.send(()).unwrap();
            loaded
        });
        assert_eq!(older.unwrap(), 1);
        assert_eq!(newer.unwrap(), 1);

        let ids: Vec<i64> = engine
            .filter(&FilterState::all_areas())
            .iter()
            .map(|v| v.venue_id)
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_install_after_refresh_wins() {
        let engine = FacetEngine::default();
        engine.install(Snapshot::from_raw(vec![raw(1, "Dubai Marina")]));
        engine.install(Snapshot::from_raw(vec![raw(2, "JBR"), raw(3, "JLT")]));
        assert_eq!(engine.snapshot().unwrap().len(), 2);
    }

    #[test]
    fn test_options_through_engine() {
        let engine = FacetEngine::default();
        engine.install(Snapshot::from_raw(vec![raw(1, "Dubai Marina"), raw(2, "JBR")]));

        let options = engine.options(&FilterState::all_areas());
        assert_eq!(options.areas, vec!["Dubai Marina", "JBR"]);
        assert!(options.dates.is_empty());
    }
}
