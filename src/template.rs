//! Template — the declarative description of the call to load-test.
//!
//! Templates are JSON files. The core only depends on the `type`, the run
//! sizing under `config`, and enough request shape for the REST/GraphQL
//! variants; everything else in the file is carried opaquely.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;
use crate::executor::{clamp_concurrency, clamp_total};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Which request variant a run dispatches, resolved once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Rest,
    Graphql,
}

impl FromStr for TemplateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("rest") {
            Ok(Self::Rest)
        } else if s.eq_ignore_ascii_case("graphql") {
            Ok(Self::Graphql)
        } else {
            Err(Error::UnsupportedKind(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    #[serde(rename = "type")]
    pub kind: String,
    pub base_url: String,
    pub endpoint: String,
    /// HTTP method for REST templates. `method_http` is the original field
    /// spelling and still accepted.
    #[serde(default, alias = "method_http")]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub config: TemplateConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub number_of_requests: Option<i64>,
    #[serde(default)]
    pub max_threads_number: Option<i64>,
    /// Per-request timeout in milliseconds; one stuck call must not stall a
    /// worker slot for the rest of the run.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Template {
    /// Load a template from a `.json` file. Anything else is a
    /// configuration error: the run never starts.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(Error::UnsupportedExtension(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path).map_err(|source| Error::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| Error::TemplateParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn resolved_kind(&self) -> Result<TemplateKind, Error> {
        self.kind.parse()
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers.get("Authorization").map(String::as_str)
    }
}

/// Run sizing resolved from a template's `config`, with the clamping policy
/// already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub total: usize,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl RunSettings {
    pub fn resolve(config: &TemplateConfig) -> Self {
        Self {
            total: clamp_total(config.number_of_requests),
            concurrency: clamp_concurrency(config.max_threads_number),
            timeout: Duration::from_millis(config.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Template {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_a_rest_template() {
        let template = parse(
            r#"{
                "type": "REST",
                "base_url": "http://localhost:3000",
                "endpoint": "/health",
                "method": "GET",
                "headers": { "Authorization": "Bearer abc123" },
                "config": { "number_of_requests": 20, "max_threads_number": 4 }
            }"#,
        );

        assert_eq!(template.resolved_kind().unwrap(), TemplateKind::Rest);
        assert_eq!(template.method.as_deref(), Some("GET"));
        assert_eq!(template.authorization(), Some("Bearer abc123"));

        let settings = RunSettings::resolve(&template.config);
        assert_eq!(settings.total, 20);
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.timeout, Duration::from_millis(30_000));
    }

    #[test]
    fn accepts_the_original_method_field_spelling() {
        let template = parse(
            r#"{
                "type": "REST",
                "base_url": "http://localhost:3000",
                "endpoint": "/health",
                "method_http": "POST"
            }"#,
        );
        assert_eq!(template.method.as_deref(), Some("POST"));
    }

    #[test]
    fn kind_is_case_insensitive() {
        for kind in ["rest", "Rest", "REST"] {
            assert_eq!(TemplateKind::from_str(kind).unwrap(), TemplateKind::Rest);
        }
        for kind in ["graphql", "GraphQL", "GRAPHQL"] {
            assert_eq!(TemplateKind::from_str(kind).unwrap(), TemplateKind::Graphql);
        }
    }

    #[test]
    fn unsupported_kind_is_a_configuration_error() {
        let template = parse(
            r#"{ "type": "SOAP", "base_url": "http://localhost", "endpoint": "/" }"#,
        );
        assert!(matches!(
            template.resolved_kind(),
            Err(Error::UnsupportedKind(kind)) if kind == "SOAP"
        ));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let template = parse(
            r#"{ "type": "REST", "base_url": "http://localhost", "endpoint": "/" }"#,
        );
        let settings = RunSettings::resolve(&template.config);
        assert_eq!(settings.total, 1);
        assert_eq!(settings.concurrency, 3);
    }

    #[test]
    fn zero_requests_still_runs_one() {
        let config = TemplateConfig {
            number_of_requests: Some(0),
            max_threads_number: Some(0),
            timeout_ms: Some(5_000),
        };
        let settings = RunSettings::resolve(&config);
        assert_eq!(settings.total, 1);
        assert_eq!(settings.concurrency, 3);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn non_json_extension_is_rejected() {
        let err = Template::from_file(Path::new("template.yaml")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedExtension(_)));
    }
}
