//! Metrics aggregation — folding per-request outcomes into running stats.
//!
//! The [`MetricsAggregator`] is the only shared mutable state in a run. It is
//! a cheap clonable handle over a mutex-guarded [`AggregateState`]; every
//! worker ingests its outcomes through the same handle, and the coordinator
//! takes a defensive [`snapshot`](MetricsAggregator::snapshot) once all tasks
//! have drained.
//!
//! Classification policy:
//! - Status buckets key on the first digit of the status code. A status
//!   outside 100–599, or an outcome carrying only an error, increments the
//!   `failed` counter instead of any bucket and is excluded from the duration
//!   stats.
//! - Latency buckets are five half-open bands evaluated in order; every
//!   non-negative duration lands in exactly one.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::outcome::RequestOutcome;

const FIFTY_MILLISECONDS: f64 = 0.05;
const TWO_HUNDRED_MILLISECONDS: f64 = 0.2;
const FIVE_HUNDRED_MILLISECONDS: f64 = 0.5;
const ONE_SECOND: f64 = 1.0;

/// Per-class response status counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusBuckets {
    #[serde(rename = "1xx")]
    pub informational: u64,
    #[serde(rename = "2xx")]
    pub success: u64,
    #[serde(rename = "3xx")]
    pub redirect: u64,
    #[serde(rename = "4xx")]
    pub client_error: u64,
    #[serde(rename = "5xx")]
    pub server_error: u64,
}

impl StatusBuckets {
    pub fn total(&self) -> u64 {
        self.informational + self.success + self.redirect + self.client_error + self.server_error
    }
}

/// Latency histogram over five half-open bands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyBuckets {
    #[serde(rename = "<50ms")]
    pub under_50ms: u64,
    #[serde(rename = "50-200ms")]
    pub under_200ms: u64,
    #[serde(rename = "200-500ms")]
    pub under_500ms: u64,
    #[serde(rename = "500ms-1s")]
    pub under_1s: u64,
    #[serde(rename = ">=1s")]
    pub over_1s: u64,
}

impl LatencyBuckets {
    pub fn total(&self) -> u64 {
        self.under_50ms + self.under_200ms + self.under_500ms + self.under_1s + self.over_1s
    }
}

/// Running aggregate over every outcome ingested so far.
///
/// `count` covers status-bearing outcomes only, and always equals the sum of
/// either bucket set. Failures are tracked in `failed`; `attempts()` is the
/// number of ingests. `min_duration`/`max_duration` stay `None` until the
/// first bucketed outcome — zero is a valid duration and must not read as
/// "no data yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateState {
    pub count: u64,
    pub failed: u64,
    pub sum_duration: f64,
    pub min_duration: Option<f64>,
    pub max_duration: Option<f64>,
    pub status_buckets: StatusBuckets,
    pub latency_buckets: LatencyBuckets,
}

impl AggregateState {
    fn consume(&mut self, outcome: &RequestOutcome) {
        let bucket = match outcome.status {
            Some(status) => status_bucket(&mut self.status_buckets, status),
            None => None,
        };
        let Some(bucket) = bucket else {
            self.failed += 1;
            return;
        };
        *bucket += 1;

        let secs = outcome.duration.as_secs_f64();
        *latency_bucket(&mut self.latency_buckets, secs) += 1;

        self.sum_duration += secs;
        self.min_duration = Some(self.min_duration.map_or(secs, |m| m.min(secs)));
        self.max_duration = Some(self.max_duration.map_or(secs, |m| m.max(secs)));
        self.count += 1;
    }

    /// Every ingested outcome, bucketed or failed.
    pub fn attempts(&self) -> u64 {
        self.count + self.failed
    }

    /// Mean duration over bucketed outcomes, `None` when there are none.
    pub fn average_duration(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum_duration / self.count as f64)
    }
}

/// Slot for `status` in the class histogram, `None` when out of range.
fn status_bucket(buckets: &mut StatusBuckets, status: u16) -> Option<&mut u64> {
    match status / 100 {
        1 => Some(&mut buckets.informational),
        2 => Some(&mut buckets.success),
        3 => Some(&mut buckets.redirect),
        4 => Some(&mut buckets.client_error),
        5 => Some(&mut buckets.server_error),
        _ => None,
    }
}

/// Slot for a duration (in seconds) in the latency histogram. Half-open
/// bands, first match wins: 0.05 s belongs to "50-200ms", not "<50ms".
fn latency_bucket(buckets: &mut LatencyBuckets, secs: f64) -> &mut u64 {
    if secs < FIFTY_MILLISECONDS {
        &mut buckets.under_50ms
    } else if secs < TWO_HUNDRED_MILLISECONDS {
        &mut buckets.under_200ms
    } else if secs < FIVE_HUNDRED_MILLISECONDS {
        &mut buckets.under_500ms
    } else if secs < ONE_SECOND {
        &mut buckets.under_1s
    } else {
        &mut buckets.over_1s
    }
}

/// Concurrency-safe accumulator shared by every worker in a run.
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    state: Arc<Mutex<AggregateState>>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the running aggregate. Accepts any well-formed
    /// outcome or failure marker without panicking; concurrent ingests are
    /// serialized by the lock.
    pub fn ingest(&self, outcome: &RequestOutcome) {
        // The lock is never held across an await.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .consume(outcome);
    }

    /// Point-in-time copy of the aggregate, safe to read while other handles
    /// keep ingesting.
    pub fn snapshot(&self) -> AggregateState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
