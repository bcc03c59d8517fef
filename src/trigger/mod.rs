//! Starting analysis runs on the remote backend.
//!
//! This module provides the backend client and the trigger that turns a
//! successful run into a stored and broadcast result.

pub mod backend;
pub mod runner;

pub use backend::{AnalysisBackend, HttpBackend};
pub use runner::{AnalysisTrigger, RunOutcome, TriggerHooks};

use crate::store::StoreError;

/// Why an analysis run did not produce a stored result.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// This trigger already has a request in flight.
    #[error("an analysis is already running")]
    Busy,

    /// The transport gave up waiting for the backend. Carries the
    /// configured timeout, if there was one.
    #[error("request timed out{}", timeout_suffix(.0))]
    Timeout(Option<u64>),

    /// The backend could not be reached.
    #[error("cannot connect to analysis backend at {0}. Is the backend running?")]
    Connect(String),

    /// Any other transport failure.
    #[error("failed to send request: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status.
    #[error("Analysis failed: HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// The backend reported `status: "error"` in its response body.
    #[error("{0}")]
    Application(String),

    /// The response body was not a usable JSON document.
    #[error("failed to parse analysis response: {0}")]
    Decode(String),

    /// The result arrived but could not be persisted.
    #[error("failed to store analysis result: {0}")]
    Store(#[from] StoreError),
}

fn timeout_suffix(seconds: &Option<u64>) -> String {
    seconds
        .map(|secs| format!(" after {}s", secs))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            TriggerError::Timeout(Some(30)).to_string(),
            "request timed out after 30s"
        );
        assert_eq!(TriggerError::Timeout(None).to_string(), "request timed out");
    }
}
