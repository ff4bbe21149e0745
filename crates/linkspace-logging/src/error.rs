//! Error types for linkspace-logging

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to set up log file: {0}")]
    File(String),

    #[error("invalid filter directives: {0}")]
    Filter(String),

    #[error("OpenTelemetry setup failed: {0}")]
    Otel(String),

    /// A global subscriber was already installed
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

impl From<std::io::Error> for LogError {
    fn from(e: std::io::Error) -> Self {
        LogError::File(e.to_string())
    }
}
