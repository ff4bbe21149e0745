//! Error types for linkspace-messaging

use linkspace_core::IdentityError;
use thiserror::Error;

/// Errors that can occur in the messaging layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagingError {
    /// No signer available for a mutating request
    #[error("not authenticated: connect a wallet first")]
    NotAuthenticated,

    /// The wallet failed to produce a signature
    #[error("signing failed: {0}")]
    Signing(IdentityError),

    /// Network or process unreachable
    #[error("transport error: {0}")]
    Transport(String),

    /// No result observed within the liveness window
    ///
    /// The request may or may not have been applied.
    #[error("timed out after {waited_ms}ms waiting for result of {message_id}")]
    Timeout { message_id: String, waited_ms: u64 },

    /// The remote side refused the message (bad signature, unknown process)
    #[error("message rejected: {0}")]
    Rejected(String),

    /// A result arrived but could not be interpreted
    #[error("invalid result: {0}")]
    InvalidResult(String),

    /// Serialization failed
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl MessagingError {
    /// Transport failures are safe to retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, MessagingError::Transport(_))
    }

    /// Timeouts leave the remote outcome unknown
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, MessagingError::Timeout { .. })
    }
}

impl From<IdentityError> for MessagingError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::NotConnected => MessagingError::NotAuthenticated,
            other => MessagingError::Signing(other),
        }
    }
}

impl From<postcard::Error> for MessagingError {
    fn from(e: postcard::Error) -> Self {
        MessagingError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for MessagingError {
    fn from(e: serde_json::Error) -> Self {
        MessagingError::InvalidResult(e.to_string())
    }
}

/// Result type for messaging operations
pub type MessagingResult<T> = Result<T, MessagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_connected_maps_to_not_authenticated() {
        let err: MessagingError = IdentityError::NotConnected.into();
        assert_eq!(err, MessagingError::NotAuthenticated);

        let err: MessagingError = IdentityError::SigningRejected("user".into()).into();
        assert!(matches!(err, MessagingError::Signing(_)));
    }

    #[test]
    fn test_classification() {
        assert!(MessagingError::Transport("down".into()).is_retryable());
        assert!(!MessagingError::Transport("down".into()).is_ambiguous());

        let timeout = MessagingError::Timeout {
            message_id: "m1".into(),
            waited_ms: 500,
        };
        assert!(timeout.is_ambiguous());
        assert!(!timeout.is_retryable());
        assert!(timeout.to_string().contains("500ms"));
    }
}
