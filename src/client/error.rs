//! Timetable client error types

use thiserror::Error;

/// Failures talking to the timetable service.
///
/// A service-reported `error` field is not one of these; it comes back as
/// [`super::ServiceReply::Rejected`] so callers can report it distinctly.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response contained neither a timetable nor an error")]
    MissingTimetable,

    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),

    /// The background request task panicked or was cancelled
    #[error("Request task failed: {0}")]
    TaskFailed(String),
}

impl ClientError {
    /// Whether the request never produced an HTTP response
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::InvalidUrl(_))
    }
}
