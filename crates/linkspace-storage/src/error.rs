//! Error types for linkspace-storage
//!
//! This module defines the error types used throughout the publishing crate.

use linkspace_core::IdentityError;
use thiserror::Error;

/// Errors that can occur while publishing or fetching content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// Nothing to publish (empty bytes or empty folder)
    #[error("Refusing to publish empty content")]
    EmptyArtifact,

    /// A folder listed the same path twice
    #[error("Duplicate path in folder: {0}")]
    DuplicatePath(String),

    /// A folder path is empty, absolute, or escapes the folder
    #[error("Invalid folder path: {0:?}")]
    InvalidPath(String),

    /// No wallet connected for a wallet-mode publish
    #[error("Not authenticated: connect a wallet or publish anonymously")]
    NotAuthenticated,

    /// The wallet failed to sign the upload
    #[error("Signing failed: {0}")]
    Signing(IdentityError),

    /// The upload signature did not verify
    #[error("Upload rejected: {0}")]
    Rejected(String),

    /// Store unreachable
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store did not answer an upload in time
    #[error("Upload timed out after {waited_ms}ms")]
    Timeout { waited_ms: u64 },

    /// The uploader cannot pay for an upload above the free limit
    #[error("Insufficient balance: upload costs {required}, balance is {available}")]
    InsufficientBalance { required: u64, available: u64 },

    /// Requested content does not exist
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Stored bytes no longer match their content id
    #[error("Integrity check failed for {0}")]
    Integrity(String),

    /// I/O error in a local store
    #[error("I/O error: {0}")]
    Io(String),

    /// Error during serialization
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PublishError {
    /// Transport failures and timeouts are safe to retry; uploads are
    /// content-addressed, so a resend stores the same bytes under the same id
    pub fn is_retryable(&self) -> bool {
        matches!(self, PublishError::Transport(_) | PublishError::Timeout { .. })
    }
}

impl From<IdentityError> for PublishError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotConnected => PublishError::NotAuthenticated,
            other => PublishError::Signing(other),
        }
    }
}

impl From<std::io::Error> for PublishError {
    fn from(err: std::io::Error) -> Self {
        PublishError::Io(err.to_string())
    }
}

impl From<postcard::Error> for PublishError {
    fn from(err: postcard::Error) -> Self {
        PublishError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::Serialization(err.to_string())
    }
}

/// Result type for publishing operations
pub type PublishResult<T> = Result<T, PublishError>;
