use crate::platform::Platform;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to acquire browser session for {platform}: {reason}")]
    SessionAcquisition { platform: Platform, reason: String },

    #[error("Readiness probe '{selector}' did not succeed within {timeout:?}")]
    ReadinessTimeout { selector: String, timeout: Duration },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Failed to capture artifact: {0}")]
    ArtifactCapture(String),

    #[error("Browser session is closed")]
    SessionClosed,

    #[error("Browser session lost: {0}")]
    SessionLost(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the session can no longer be driven and the platform run must stop.
    pub fn is_session_lost(&self) -> bool {
        matches!(self, Error::SessionClosed | Error::SessionLost(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
