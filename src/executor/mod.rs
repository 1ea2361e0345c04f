//! Executor — bounded-concurrency dispatch of request tasks.
//!
//! The [`PoolExecutor`] fans a fixed number of request executions out across
//! a capped set of in-flight workers. Admission is gated by a semaphore
//! sized to the concurrency cap: as soon as any in-flight task finishes, the
//! next pending task is admitted, with no assumption that tasks finish in
//! the order they started. Every outcome is forwarded to the shared
//! [`MetricsAggregator`](crate::aggregate::MetricsAggregator) before its
//! task counts as complete, so the aggregate reflects exactly `total`
//! ingested outcomes by the time [`PoolExecutor::run`] returns.

pub mod pool;
pub use pool::{clamp_concurrency, clamp_total, PoolExecutor};
