//! Error types for the claim workflow.

use linkspace_artifacts::ArtifactError;
use linkspace_core::{IdentityError, NameError};
use linkspace_registry::RegistryError;
use linkspace_storage::PublishError;
use thiserror::Error;

/// Errors surfaced by [`ClaimWorkflow`](crate::ClaimWorkflow).
///
/// Lower-layer errors keep their category when converted: transport stays
/// transport, timeout stays timeout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    // ============================================================
    // Local (no remote call made)
    // ============================================================
    /// The candidate name failed validation.
    #[error("invalid name: {0}")]
    Validation(#[from] NameError),

    /// No wallet is connected.
    #[error("not authenticated: connect a wallet first")]
    NotAuthenticated,

    /// The wallet refused or failed an identity request.
    #[error("wallet error: {0}")]
    Wallet(IdentityError),

    /// The document holds an item the page builder cannot render.
    #[error("unsupported item {id} of type {tag}")]
    UnsupportedItem { id: String, tag: String },

    /// The document snapshot could not be turned into a page.
    #[error("artifact error: {0}")]
    Artifact(ArtifactError),

    /// A share link could not be formed from the configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ============================================================
    // Remote
    // ============================================================
    /// The network or a remote process was unreachable.
    #[error("transport error: {0}")]
    Transport(String),

    /// A request was sent but its outcome was not observed in time.
    #[error("timed out waiting for result of {message_id}")]
    Timeout { message_id: String },

    /// The name belongs to another identity.
    #[error("name {name} is already taken")]
    Conflict { name: String },

    /// Publishing failed for a reason other than transport.
    #[error("publish failed: {0}")]
    Publish(PublishError),

    /// The registry refused the request.
    #[error("registry error: {0}")]
    Registry(RegistryError),

    // ============================================================
    // Workflow
    // ============================================================
    /// A workflow run is already in progress for this identity.
    #[error("a workflow run is already in progress for {identity}")]
    AlreadyRunning { identity: String },

    /// The run was abandoned; its late result was discarded.
    #[error("workflow run was abandoned")]
    Stale,

    /// The identity holds no name to update or release.
    #[error("no name is bound to this identity")]
    NotBound,

    /// A session snapshot could not be encoded or decoded.
    #[error("session snapshot error: {0}")]
    Snapshot(String),
}

impl ClaimError {
    /// Transport failures may be retried, as may uploads that timed out
    pub fn is_retryable(&self) -> bool {
        match self {
            ClaimError::Transport(_) => true,
            ClaimError::Publish(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// The outcome is unknown until the registry is consulted again
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ClaimError::Timeout { .. })
    }
}

impl From<IdentityError> for ClaimError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotConnected => ClaimError::NotAuthenticated,
            other => ClaimError::Wallet(other),
        }
    }
}

impl From<ArtifactError> for ClaimError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::UnsupportedItem { id, tag } => ClaimError::UnsupportedItem { id, tag },
            other => ClaimError::Artifact(other),
        }
    }
}

impl From<PublishError> for ClaimError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::NotAuthenticated => ClaimError::NotAuthenticated,
            PublishError::Transport(msg) => ClaimError::Transport(msg),
            other => ClaimError::Publish(other),
        }
    }
}

impl From<RegistryError> for ClaimError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotAuthenticated => ClaimError::NotAuthenticated,
            RegistryError::Transport(msg) => ClaimError::Transport(msg),
            RegistryError::Timeout { message_id, .. } => ClaimError::Timeout { message_id },
            RegistryError::Conflict { name } => ClaimError::Conflict { name },
            other => ClaimError::Registry(other),
        }
    }
}

impl From<postcard::Error> for ClaimError {
    fn from(err: postcard::Error) -> Self {
        ClaimError::Snapshot(err.to_string())
    }
}

/// Result type for workflow operations.
pub type ClaimResult<T> = Result<T, ClaimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_survive_conversion() {
        let err: ClaimError = RegistryError::Transport("down".into()).into();
        assert!(err.is_retryable());

        let err: ClaimError = RegistryError::Timeout {
            message_id: "msg-1".into(),
            waited_ms: 200,
        }
        .into();
        assert!(err.is_ambiguous());
        assert!(!err.is_retryable());

        let err: ClaimError = PublishError::Transport("gateway".into()).into();
        assert!(err.is_retryable());

        let err: ClaimError = PublishError::Timeout { waited_ms: 50 }.into();
        assert!(err.is_retryable());
        assert!(!err.is_ambiguous());

        let err: ClaimError = RegistryError::Conflict {
            name: "john-doe".into(),
        }
        .into();
        assert_eq!(
            err,
            ClaimError::Conflict {
                name: "john-doe".into()
            }
        );
    }

    #[test]
    fn test_not_authenticated_from_every_layer() {
        assert_eq!(
            ClaimError::from(IdentityError::NotConnected),
            ClaimError::NotAuthenticated
        );
        assert_eq!(
            ClaimError::from(PublishError::NotAuthenticated),
            ClaimError::NotAuthenticated
        );
        assert_eq!(
            ClaimError::from(RegistryError::NotAuthenticated),
            ClaimError::NotAuthenticated
        );
    }

    #[test]
    fn test_unsupported_item_is_lifted() {
        let err: ClaimError = ArtifactError::UnsupportedItem {
            id: "item-3".into(),
            tag: "poll".into(),
        }
        .into();
        assert!(matches!(err, ClaimError::UnsupportedItem { ref tag, .. } if tag == "poll"));
    }

    #[test]
    fn test_validation_message_names_the_rule() {
        let err: ClaimError = NameError::TooShort { length: 2, min: 3 }.into();
        assert!(err.to_string().contains("too short"));
    }
}
