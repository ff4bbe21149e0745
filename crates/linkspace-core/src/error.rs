//! Error types shared across Linkspace crates

use thiserror::Error;

/// Errors related to identities and the wallet collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No wallet is connected, so there is no identity and no signer
    #[error("Wallet not connected")]
    NotConnected,

    /// The wallet refused to sign
    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    #[error("Invalid identity format: {0}")]
    InvalidFormat(String),

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}

/// Violations reported by name validation
///
/// Validation is total: every rejected input maps to exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name is empty")]
    Empty,

    #[error("name is too short: {length} characters, minimum is {min}")]
    TooShort { length: usize, min: usize },

    #[error("name is too long: {length} characters, maximum is {max}")]
    TooLong { length: usize, max: usize },

    #[error("name contains invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("name must not start with a hyphen")]
    LeadingHyphen,

    #[error("name must not end with a hyphen")]
    TrailingHyphen,
}

/// Errors parsing a content identifier from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentIdError {
    #[error("Invalid content id encoding: {0}")]
    Encoding(String),

    #[error("Invalid content id length: expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}
