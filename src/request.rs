//! Request tasks — the REST and GraphQL executors behind a single seam.
//!
//! A [`Requester`] issues one call and always hands back a well-formed
//! [`RequestOutcome`]: network errors, unsupported methods and malformed
//! request shapes become failure outcomes, never faults escaping into the
//! worker pool. The variant is selected once per run from the template's
//! `type`.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};

use crate::error::Error;
use crate::outcome::RequestOutcome;
use crate::template::{Template, TemplateKind};

/// File holding the GraphQL query text, looked up next to the template.
const QUERY_FILE: &str = "query.graphql";

/// One request execution. Implementations measure wall-clock time around the
/// call and capture any failure into the outcome.
#[async_trait]
pub trait Requester: Send + Sync {
    async fn execute(&self) -> RequestOutcome;
}

/// Build the request variant a run will use, once, from the template.
///
/// An unknown `type` or an unreadable query file means the run cannot issue
/// a single meaningful request, so both surface as configuration errors.
pub fn build_requester(
    template: &Template,
    template_path: &Path,
    timeout: Duration,
) -> Result<Arc<dyn Requester>, Error> {
    let connection = Connection::new(&template.base_url, template.authorization(), timeout)?;

    match template.resolved_kind()? {
        TemplateKind::Rest => Ok(Arc::new(RestRequest {
            connection,
            endpoint: template.endpoint.clone(),
            method: template.method.clone(),
            body: template.body.clone().unwrap_or(Value::Null),
        })),
        TemplateKind::Graphql => {
            let query_path = template_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(QUERY_FILE);
            let query = fs::read_to_string(&query_path).map_err(|source| Error::QueryRead {
                path: query_path,
                source,
            })?;
            let variables = template
                .body
                .as_ref()
                .and_then(|body| body.get("variables"))
                .cloned()
                .unwrap_or(Value::Null);
            Ok(Arc::new(GraphqlRequest {
                connection,
                endpoint: template.endpoint.clone(),
                query,
                variables,
            }))
        }
    }
}

/// Lazily-initialized, per-run HTTP resource shared read-only by every
/// worker: one client with the template's base URL, JSON content type,
/// optional Authorization header and the per-request timeout baked in.
#[derive(Debug, Clone)]
pub struct Connection {
    base_url: String,
    client: reqwest::Client,
}

impl Connection {
    pub fn new(
        base_url: &str,
        authorization: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(auth) = authorization {
            let mut value =
                HeaderValue::from_str(auth).map_err(|_| Error::InvalidAuthorization)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    async fn get(&self, endpoint: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(join_url(&self.base_url, endpoint)).send().await
    }

    async fn post(&self, endpoint: &str, body: &Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(join_url(&self.base_url, endpoint))
            .json(body)
            .send()
            .await
    }
}

fn join_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// REST variant: dispatches on the template's method field.
pub struct RestRequest {
    connection: Connection,
    endpoint: String,
    method: Option<String>,
    body: Value,
}

impl RestRequest {
    async fn send(&self) -> Result<u16, String> {
        let method = self.method.as_deref().unwrap_or("");
        let response = if method.eq_ignore_ascii_case("GET") {
            self.connection.get(&self.endpoint).await
        } else if method.eq_ignore_ascii_case("POST") {
            self.connection.post(&self.endpoint, &self.body).await
        } else {
            return Err(format!("http method not supported: {method:?}"));
        };

        response
            .map(|resp| resp.status().as_u16())
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Requester for RestRequest {
    async fn execute(&self) -> RequestOutcome {
        let started = Instant::now();
        match self.send().await {
            Ok(status) => RequestOutcome::success(status, started.elapsed()),
            Err(error) => RequestOutcome::failure(error, started.elapsed()),
        }
    }
}

/// GraphQL variant: always a single POST carrying the query text and the
/// template's variables.
pub struct GraphqlRequest {
    connection: Connection,
    endpoint: String,
    query: String,
    variables: Value,
}

#[async_trait]
impl Requester for GraphqlRequest {
    async fn execute(&self) -> RequestOutcome {
        let body = json!({
            "query": self.query,
            "variables": self.variables,
        });

        let started = Instant::now();
        match self.connection.post(&self.endpoint, &body).await {
            Ok(resp) => RequestOutcome::success(resp.status().as_u16(), started.elapsed()),
            Err(e) => RequestOutcome::failure(e.to_string(), started.elapsed()),
        }
    }
}
