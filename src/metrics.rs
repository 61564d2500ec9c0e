//! Metrics for snapshot loading and filter passes.
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use std::fmt;

/// Every metric name the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    SnapshotLoadsSuccess,
    SnapshotLoadsError,
    SnapshotRecords,
    SnapshotRecordsDropped,
    SnapshotLoadDuration,
    FilterPasses,
    FilterRecordsMatched,
    OptionPasses,
    QueriesWithoutSnapshot,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SnapshotLoadsSuccess => "facets_snapshot_loads_success_total",
            MetricName::SnapshotLoadsError => "facets_snapshot_loads_error_total",
            MetricName::SnapshotRecords => "facets_snapshot_records",
            MetricName::SnapshotRecordsDropped => "facets_snapshot_records_dropped_total",
            MetricName::SnapshotLoadDuration => "facets_snapshot_load_duration_seconds",
            MetricName::FilterPasses => "facets_filter_passes_total",
            MetricName::FilterRecordsMatched => "facets_filter_records_matched",
            MetricName::OptionPasses => "facets_option_passes_total",
            MetricName::QueriesWithoutSnapshot => "facets_queries_without_snapshot_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            SnapshotLoadsSuccess,
            SnapshotLoadsError,
            SnapshotRecords,
            SnapshotRecordsDropped,
            SnapshotLoadDuration,
            FilterPasses,
            FilterRecordsMatched,
            OptionPasses,
            QueriesWithoutSnapshot,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct FacetMetrics;

impl FacetMetrics {
    pub fn record_snapshot_loaded(records: usize, duration_secs: f64) {
        ::metrics::counter!(MetricName::SnapshotLoadsSuccess.as_str()).increment(1);
        ::metrics::gauge!(MetricName::SnapshotRecords.as_str()).set(records as f64);
        ::metrics::histogram!(MetricName::SnapshotLoadDuration.as_str()).record(duration_secs);
    }

    pub fn record_snapshot_error() {
        ::metrics::counter!(MetricName::SnapshotLoadsError.as_str()).increment(1);
    }

    pub fn record_records_dropped(count: usize) {
        ::metrics::counter!(MetricName::SnapshotRecordsDropped.as_str()).increment(count as u64);
    }

    pub fn record_filter_pass(matched: usize) {
        ::metrics::counter!(MetricName::FilterPasses.as_str()).increment(1);
        ::metrics::histogram!(MetricName::FilterRecordsMatched.as_str()).record(matched as f64);
    }

    pub fn record_option_pass() {
        ::metrics::counter!(MetricName::OptionPasses.as_str()).increment(1);
    }

    pub fn record_query_without_snapshot() {
        ::metrics::counter!(MetricName::QueriesWithoutSnapshot.as_str()).increment(1);
    }
}
