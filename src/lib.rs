//! Quake — a declarative load-generation harness for REST and GraphQL APIs.
//!
//! Given a JSON template describing one target call, a request count and a
//! concurrency cap, Quake issues that many calls under the cap, measures
//! per-call latency and status outcome, and produces an aggregate report:
//! average/fastest/slowest latency, a status-code histogram and a
//! latency-band histogram.
//!
//! # Architecture
//!
//! The main building blocks, leaf-first:
//!
//! - [`RequestOutcome`]: the result of one request — a status code with its
//!   wall-clock duration, or a captured failure description.
//! - [`MetricsAggregator`]: the only shared mutable state in a run; a
//!   concurrency-safe accumulator that folds outcomes into status buckets,
//!   latency buckets and running sum/min/max.
//! - [`PoolExecutor`]: the bounded-concurrency dispatcher. It runs exactly
//!   `total` tasks with at most `concurrency` in flight (clamped to
//!   `[1, 10]`, default 3); a freed slot immediately admits the next task,
//!   with no ordering assumption between starts and finishes.
//! - [`Requester`]: the request-execution seam, selected once per run from
//!   the template's `type` — a REST variant dispatching `GET`/`POST`, and a
//!   GraphQL variant POSTing a query read from a file beside the template.
//! - [`Runner`]: ties everything together and assembles the final
//!   [`Report`], which a [`Reporter`] then persists or prints.
//!
//! Per-request failures (network errors, unsupported methods) never abort a
//! run: they become failure outcomes, are logged, counted in the report's
//! `failed` field and excluded from the histograms. Run-level failures
//! (unreadable template, unsupported type, failed persistence) surface as
//! [`Error`].
//!
//! # Example
//!
//! ```no_run
//! use quake::{FileReporter, Reporter, Runner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), quake::Error> {
//!     let runner = Runner::from_file("templates/rest.json")?;
//!     let report = runner.run().await?;
//!
//!     FileReporter::new("templates/result.json".into())
//!         .report(&report)
//!         .await?;
//!     Ok(())
//! }
//! ```

/// Metrics aggregation: buckets, running stats and the shared accumulator
pub mod aggregate;
/// Run-level error type
pub mod error;
/// Bounded-concurrency dispatch
pub mod executor;
/// Per-request outcomes
pub mod outcome;
/// Report assembly and reporters
pub mod report;
/// Request variants and the shared HTTP connection
pub mod request;
/// The run coordinator
pub mod runner;
/// Template model and loading
pub mod template;

pub use aggregate::{AggregateState, LatencyBuckets, MetricsAggregator, StatusBuckets};
pub use error::{Error, Result};
pub use executor::PoolExecutor;
pub use outcome::RequestOutcome;
pub use report::{FileReporter, Report, Reporter, StdoutReporter};
pub use request::Requester;
pub use runner::Runner;
pub use template::{RunSettings, Template, TemplateKind};
