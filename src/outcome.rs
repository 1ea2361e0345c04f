use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The result of executing a single request.
///
/// Exactly one outcome is produced per dispatched task: either a status code
/// with its wall-clock duration, or a captured failure description. An
/// outcome is immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// HTTP status code of the response, absent when the call itself failed.
    pub status: Option<u16>,
    /// Wall-clock time spent on the call, success or failure alike.
    pub duration: Duration,
    /// Failure description when the call did not produce a response.
    pub error: Option<String>,
}

impl RequestOutcome {
    pub fn success(status: u16, duration: Duration) -> Self {
        Self {
            status: Some(status),
            duration,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, duration: Duration) -> Self {
        Self {
            status: None,
            duration,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_none()
    }
}
