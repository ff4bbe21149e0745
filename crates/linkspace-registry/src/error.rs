//! Error types for linkspace-registry

use linkspace_messaging::MessagingError;
use thiserror::Error;

use crate::state::{NameEvent, NameState};

/// Errors surfaced by the registry client
///
/// Transport and timeout outcomes are passed through unchanged; the client
/// never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name is bound to a different identity
    #[error("name {name} is already taken")]
    Conflict { name: String },

    /// No binding exists for the name
    #[error("name {name} is not registered")]
    NotFound { name: String },

    /// The caller does not own the binding it tried to change
    #[error("not the owner of {name}")]
    Unauthorized { name: String },

    /// The registry refused the name itself
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Another mutation for the same name has not finished yet
    #[error("a request for {name} is already in flight")]
    RequestInFlight { name: String },

    #[error("not authenticated: connect a wallet first")]
    NotAuthenticated,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("transport error: {0}")]
    Transport(String),

    /// The request was sent but no result was observed in time
    #[error("timed out after {waited_ms}ms waiting for result of {message_id}")]
    Timeout { message_id: String, waited_ms: u64 },

    /// The registry process refused the message outright
    #[error("request rejected: {0}")]
    Rejected(String),

    /// A reply could not be interpreted
    #[error("invalid registry response: {0}")]
    InvalidResponse(String),

    #[error("invalid transition {event:?} from {from:?}")]
    InvalidTransition { from: NameState, event: NameEvent },
}

impl RegistryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegistryError::Transport(_))
    }

    /// The mutation may or may not have been applied
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, RegistryError::Timeout { .. })
    }
}

impl From<MessagingError> for RegistryError {
    fn from(e: MessagingError) -> Self {
        match e {
            MessagingError::NotAuthenticated => RegistryError::NotAuthenticated,
            MessagingError::Signing(inner) => RegistryError::Signing(inner.to_string()),
            MessagingError::Transport(msg) => RegistryError::Transport(msg),
            MessagingError::Timeout {
                message_id,
                waited_ms,
            } => RegistryError::Timeout {
                message_id,
                waited_ms,
            },
            MessagingError::Rejected(msg) => RegistryError::Rejected(msg),
            MessagingError::InvalidResult(msg) | MessagingError::Serialization(msg) => {
                RegistryError::InvalidResponse(msg)
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(e: serde_json::Error) -> Self {
        RegistryError::InvalidResponse(e.to_string())
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messaging_categories_survive_conversion() {
        let err: RegistryError = MessagingError::Transport("down".into()).into();
        assert!(err.is_retryable());

        let err: RegistryError = MessagingError::Timeout {
            message_id: "m".into(),
            waited_ms: 10,
        }
        .into();
        assert!(err.is_ambiguous());
        assert!(!err.is_retryable());

        let err: RegistryError = MessagingError::NotAuthenticated.into();
        assert_eq!(err, RegistryError::NotAuthenticated);
    }
}
