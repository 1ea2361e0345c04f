//! Reports and Reporters — turning a final aggregate snapshot into output.
//!
//! A [`Report`] is assembled exactly once, after every task has completed,
//! and never mutated afterward. Derived statistics (the average) live here,
//! not in the aggregate. A [`Reporter`] takes the report somewhere: a file
//! next to the template, stdout, or wherever an implementation wants.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateState, LatencyBuckets, StatusBuckets};
use crate::error::Error;

/// Final performance report for one run. Durations are in seconds;
/// `average_duration`, `fastest` and `slowest` are `None` when the run
/// produced no bucketed outcome (a zero-count run has no average).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub average_duration: Option<f64>,
    pub fastest: Option<f64>,
    pub slowest: Option<f64>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Every issued request, including failures.
    pub requests: u64,
    /// Requests that produced no valid status (network errors, unsupported
    /// methods, out-of-range statuses).
    pub failed: u64,
    pub status_buckets: StatusBuckets,
    pub latency_buckets: LatencyBuckets,
}

impl Report {
    pub fn new(
        snapshot: AggregateState,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Self {
        Self {
            average_duration: snapshot.average_duration(),
            fastest: snapshot.min_duration,
            slowest: snapshot.max_duration,
            started_at,
            ended_at,
            requests: snapshot.attempts(),
            failed: snapshot.failed,
            status_buckets: snapshot.status_buckets,
            latency_buckets: snapshot.latency_buckets,
        }
    }
}

/// Consumes a finished [`Report`] and persists or displays it. A reporter
/// failure is a run-level error: the metrics exist, they just were not
/// durably stored.
#[async_trait]
pub trait Reporter {
    async fn report(&self, report: &Report) -> Result<(), Error>;
}

/// Writes the report as pretty JSON to a file.
pub struct FileReporter {
    path: PathBuf,
}

impl FileReporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Reporter for FileReporter {
    async fn report(&self, report: &Report) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| Error::Persist {
                path: self.path.clone(),
                source,
            })?;
        tracing::info!(path = %self.path.display(), "report written");
        Ok(())
    }
}

/// Prints the report as pretty JSON to stdout.
pub struct StdoutReporter;

#[async_trait]
impl Reporter for StdoutReporter {
    async fn report(&self, report: &Report) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(report)?;
        println!("{json}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MetricsAggregator;
    use crate::outcome::RequestOutcome;
    use std::time::Duration;

    #[test]
    fn derives_stats_from_a_snapshot() {
        let agg = MetricsAggregator::new();
        agg.ingest(&RequestOutcome::success(200, Duration::from_millis(10)));
        agg.ingest(&RequestOutcome::success(200, Duration::from_millis(30)));
        agg.ingest(&RequestOutcome::failure("timeout", Duration::from_secs(5)));

        let started_at = Utc::now();
        let ended_at = Utc::now();
        let report = Report::new(agg.snapshot(), started_at, ended_at);

        assert_eq!(report.requests, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.fastest, Some(0.010));
        assert_eq!(report.slowest, Some(0.030));
        assert!((report.average_duration.unwrap() - 0.020).abs() < 1e-9);
        assert_eq!(report.status_buckets.success, 2);
        assert_eq!(report.started_at, started_at);
        assert_eq!(report.ended_at, ended_at);
    }

    #[test]
    fn zero_count_run_has_no_average() {
        let report = Report::new(AggregateState::default(), Utc::now(), Utc::now());
        assert_eq!(report.average_duration, None);
        assert_eq!(report.fastest, None);
        assert_eq!(report.slowest, None);
        assert_eq!(report.requests, 0);
    }

    #[test]
    fn serializes_with_histogram_key_names() {
        let agg = MetricsAggregator::new();
        agg.ingest(&RequestOutcome::success(204, Duration::from_millis(120)));
        let report = Report::new(agg.snapshot(), Utc::now(), Utc::now());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status_buckets"]["2xx"], 1);
        assert_eq!(json["latency_buckets"]["50-200ms"], 1);
        assert_eq!(json["latency_buckets"]["<50ms"], 0);
    }
}
