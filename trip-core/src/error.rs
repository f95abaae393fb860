//! Error types for the trip planner.

use thiserror::Error;

/// Errors that can occur in trip operations.
#[derive(Error, Debug)]
pub enum TripError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Cannot reach the server while offline")]
    Offline,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),
}

impl TripError {
    /// True for a server response with the given status code.
    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, TripError::Server { status, .. } if *status == code)
    }
}

impl From<serde_json::Error> for TripError {
    fn from(e: serde_json::Error) -> Self {
        TripError::Serialization(e.to_string())
    }
}

/// Result type alias for trip operations.
pub type TripResult<T> = Result<T, TripError>;
