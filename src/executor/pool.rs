use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use typed_builder::TypedBuilder;

use crate::aggregate::MetricsAggregator;
use crate::outcome::RequestOutcome;

/// Concurrency used when the template leaves the cap unset, zero or negative.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Hard ceiling on in-flight requests, protecting both the target system and
/// the caller from unbounded fan-out.
pub const MAX_CONCURRENCY: usize = 10;

/// A run always issues at least one request, even when the template asks
/// for zero.
pub fn clamp_total(requested: Option<i64>) -> usize {
    match requested {
        Some(n) if n > 0 => n as usize,
        _ => 1,
    }
}

/// Clamp the concurrency cap to `[1, MAX_CONCURRENCY]`, defaulting to
/// [`DEFAULT_CONCURRENCY`] for absent, zero or negative input.
pub fn clamp_concurrency(requested: Option<i64>) -> usize {
    match requested {
        None => DEFAULT_CONCURRENCY,
        Some(n) if n < 1 => DEFAULT_CONCURRENCY,
        Some(n) if n as usize > MAX_CONCURRENCY => MAX_CONCURRENCY,
        Some(n) => n as usize,
    }
}

/// Executor that drains exactly `total` request tasks through a worker pool
/// capped at `concurrency` in-flight tasks.
///
/// Each admitted task executes the action, logs its outcome, ingests it into
/// the aggregator and only then releases its slot. `run` resolves once every
/// task has completed; results are observable only through the aggregator's
/// snapshot.
#[derive(Debug, TypedBuilder)]
pub struct PoolExecutor {
    pub total: usize,
    #[builder(default = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

impl PoolExecutor {
    pub async fn run<F, Fut>(&self, action: F, aggregator: MetricsAggregator)
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = RequestOutcome> + Send + 'static,
    {
        let slots = Arc::new(Semaphore::new(self.concurrency.max(1)));
        tracing::info!(
            total = self.total,
            concurrency = self.concurrency,
            "dispatching request tasks"
        );

        let mut handles = Vec::with_capacity(self.total);
        for _ in 0..self.total {
            // Admission control: acquiring here blocks dispatch until some
            // in-flight task, whichever finishes first, frees a slot.
            let permit = slots
                .clone()
                .acquire_owned()
                .await
                .expect("request slot semaphore closed");
            let action = action.clone();
            let aggregator = aggregator.clone();

            handles.push(tokio::spawn(async move {
                let outcome = action().await;
                log_outcome(&outcome);
                aggregator.ingest(&outcome);
                drop(permit);
            }));
        }

        for result in join_all(handles).await {
            if let Err(e) = result {
                // A panicked task already consumed its slot of `total`; keep
                // the data from every other worker instead of crashing.
                tracing::error!("request task panicked: {e}");
            }
        }

        tracing::info!("all request tasks completed");
    }
}

fn log_outcome(outcome: &RequestOutcome) {
    let duration_ms = outcome.duration.as_secs_f64() * 1000.0;
    match (outcome.status, &outcome.error) {
        (Some(status), _) => {
            tracing::info!(status, duration_ms, "request completed");
        }
        (None, error) => {
            let error = error.as_deref().unwrap_or("unknown failure");
            tracing::error!(error, duration_ms, "request failed");
        }
    }
}
