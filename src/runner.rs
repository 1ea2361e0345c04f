//! Runner — the coordinator that ties a template to a finished report.

use std::path::PathBuf;

use chrono::Utc;

use crate::aggregate::MetricsAggregator;
use crate::error::Result;
use crate::executor::PoolExecutor;
use crate::report::Report;
use crate::request::build_requester;
use crate::template::{RunSettings, Template};

/// Drives one load-test run: resolves the run sizing from the template,
/// builds the request variant once, fans the tasks out through the
/// [`PoolExecutor`] and assembles the final [`Report`] from the aggregate
/// snapshot.
pub struct Runner {
    template: Template,
    template_path: PathBuf,
}

impl Runner {
    /// Load the template from disk. Unreadable, unparsable or non-JSON
    /// templates abort here, before any request is issued.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let template_path = path.into();
        let template = Template::from_file(&template_path)?;
        Ok(Self {
            template,
            template_path,
        })
    }

    /// Use an already-parsed template. The path is still needed to locate a
    /// GraphQL template's sibling query file.
    pub fn new(template: Template, template_path: impl Into<PathBuf>) -> Self {
        Self {
            template,
            template_path: template_path.into(),
        }
    }

    pub async fn run(&self) -> Result<Report> {
        let settings = RunSettings::resolve(&self.template.config);
        let requester = build_requester(&self.template, &self.template_path, settings.timeout)?;
        let aggregator = MetricsAggregator::new();

        tracing::info!(
            kind = %self.template.kind,
            total = settings.total,
            concurrency = settings.concurrency,
            "starting load test"
        );
        let started_at = Utc::now();

        let executor = PoolExecutor::builder()
            .total(settings.total)
            .concurrency(settings.concurrency)
            .build();
        let action = move || {
            let requester = requester.clone();
            async move { requester.execute().await }
        };
        executor.run(action, aggregator.clone()).await;

        let ended_at = Utc::now();
        let report = Report::new(aggregator.snapshot(), started_at, ended_at);
        tracing::info!(
            requests = report.requests,
            failed = report.failed,
            average_duration = report.average_duration,
            "load test finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn template(json: &str) -> Template {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn unsupported_type_aborts_before_any_request() {
        let runner = Runner::new(
            template(r#"{ "type": "SOAP", "base_url": "http://localhost", "endpoint": "/" }"#),
            "template.json",
        );
        let err = runner.run().await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind(kind) if kind == "SOAP"));
    }

    #[tokio::test]
    async fn unsupported_method_fails_every_request_without_aborting() {
        let runner = Runner::new(
            template(
                r#"{
                    "type": "REST",
                    "base_url": "http://localhost:9",
                    "endpoint": "/",
                    "method": "DELETE",
                    "config": { "number_of_requests": 5, "max_threads_number": 2 }
                }"#,
            ),
            "template.json",
        );

        let report = runner.run().await.unwrap();
        assert_eq!(report.requests, 5);
        assert_eq!(report.failed, 5);
        assert_eq!(report.status_buckets.total(), 0);
        assert_eq!(report.average_duration, None);
    }

    #[tokio::test]
    async fn graphql_without_query_file_is_a_configuration_error() {
        let runner = Runner::new(
            template(
                r#"{ "type": "GRAPHQL", "base_url": "http://localhost", "endpoint": "/graphql" }"#,
            ),
            "/nonexistent/template.json",
        );
        assert!(matches!(runner.run().await, Err(Error::QueryRead { .. })));
    }
}
