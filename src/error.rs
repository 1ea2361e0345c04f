use std::path::PathBuf;

use thiserror::Error;

/// Run-level failures: the run cannot start, or its result cannot be
/// persisted. Per-request failures are not errors — they are captured as
/// [`RequestOutcome`](crate::outcome::RequestOutcome) values and counted.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported template extension (expected .json): {0}")]
    UnsupportedExtension(PathBuf),

    #[error("failed to read template {path}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template {path}")]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported template type: {0}")]
    UnsupportedKind(String),

    #[error("failed to read GraphQL query {path}")]
    QueryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid Authorization header value in template")]
    InvalidAuthorization,

    #[error("failed to build HTTP client")]
    Client(#[from] reqwest::Error),

    #[error("failed to encode report")]
    ReportEncode(#[from] serde_json::Error),

    #[error("failed to write report to {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
