//! Identities and the wallet collaborator
//!
//! This module provides the [`Wallet`] trait that abstracts over the
//! external signing collaborator:
//!
//! - [`KeypairWallet`]: Ed25519 key held in process (tests, anonymous publish)
//! - [`DisconnectedWallet`]: No wallet connected; every call fails
//!
//! A browser extension or hardware signer implements the same trait.

use std::fmt::{self, Debug, Display};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// Opaque principal reference derived from a wallet key
///
/// Immutable once obtained. Rendered as unpadded base64url, the same shape
/// addresses take on the content network.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap an identity string supplied by a wallet
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let value = value.into();
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(IdentityError::InvalidFormat(value));
        }
        Ok(Self(value))
    }

    /// Derive the identity for an Ed25519 public key
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        let digest = blake3::hash(key.as_bytes());
        Self(URL_SAFE_NO_PAD.encode(digest.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short display form (for logging)
    pub fn short_id(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.short_id())
    }
}

/// A message signature produced by a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMessage {
    /// Identity of the signer
    pub owner: Identity,
    /// Raw public key bytes of the signer
    pub public_key: Vec<u8>,
    /// Raw signature bytes
    pub signature: Vec<u8>,
}

impl SignedMessage {
    /// Verify this signature against the signed payload
    ///
    /// Also checks that `owner` is the identity derived from `public_key`,
    /// so a signature cannot be replayed under someone else's identity.
    pub fn verify(&self, message: &[u8]) -> Result<(), IdentityError> {
        let key_bytes: [u8; 32] =
            self.public_key
                .as_slice()
                .try_into()
                .map_err(|_| IdentityError::InvalidKeyLength {
                    expected: 32,
                    actual: self.public_key.len(),
                })?;
        let key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| IdentityError::InvalidFormat(e.to_string()))?;

        if Identity::from_public_key(&key) != self.owner {
            return Err(IdentityError::SignatureVerificationFailed);
        }

        let signature = Signature::from_slice(&self.signature)
            .map_err(|_| IdentityError::SignatureVerificationFailed)?;
        key.verify(message, &signature)
            .map_err(|_| IdentityError::SignatureVerificationFailed)
    }

    /// Hash of the signature bytes, used to derive message ids
    pub fn digest(&self) -> [u8; 32] {
        *blake3::hash(&self.signature).as_bytes()
    }
}

/// The external wallet collaborator
///
/// Calls are synchronous: the core asks for an identity and a signature
/// before every mutating remote request and fails fast when either is
/// unavailable.
pub trait Wallet: Send + Sync {
    /// The identity of the connected principal
    fn identity(&self) -> Result<Identity, IdentityError>;

    /// Sign a payload on behalf of the connected principal
    fn sign(&self, message: &[u8]) -> Result<SignedMessage, IdentityError>;
}

/// Wallet backed by an in-process Ed25519 key
///
/// The key is zeroized when the wallet is dropped.
pub struct KeypairWallet {
    signing_key: SigningKey,
    identity: Identity,
}

impl KeypairWallet {
    /// Generate a wallet with a fresh random key
    pub fn generate() -> Self {
        Self::from_seed(rand::random::<[u8; 32]>())
    }

    /// Create a wallet from a 32-byte secret seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let identity = Identity::from_public_key(&signing_key.verifying_key());
        Self {
            signing_key,
            identity,
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl Debug for KeypairWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl Wallet for KeypairWallet {
    fn identity(&self) -> Result<Identity, IdentityError> {
        Ok(self.identity.clone())
    }

    fn sign(&self, message: &[u8]) -> Result<SignedMessage, IdentityError> {
        let signature = self.signing_key.sign(message);
        Ok(SignedMessage {
            owner: self.identity.clone(),
            public_key: self.signing_key.verifying_key().as_bytes().to_vec(),
            signature: signature.to_bytes().to_vec(),
        })
    }
}

/// Wallet placeholder used when nothing is connected
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedWallet;

impl Wallet for DisconnectedWallet {
    fn identity(&self) -> Result<Identity, IdentityError> {
        Err(IdentityError::NotConnected)
    }

    fn sign(&self, _message: &[u8]) -> Result<SignedMessage, IdentityError> {
        Err(IdentityError::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_rejects_blank() {
        assert!(Identity::new("").is_err());
        assert!(Identity::new("has space").is_err());
        assert!(Identity::new("abc_DEF-123").is_ok());
    }

    #[test]
    fn test_keypair_identity_is_stable() {
        let wallet = KeypairWallet::from_seed([7u8; 32]);
        let again = KeypairWallet::from_seed([7u8; 32]);
        assert_eq!(wallet.identity().unwrap(), again.identity().unwrap());
        assert_eq!(wallet.identity().unwrap().as_str().len(), 43);
    }

    #[test]
    fn test_sign_and_verify() {
        let wallet = KeypairWallet::generate();
        let signed = wallet.sign(b"payload").unwrap();
        assert!(signed.verify(b"payload").is_ok());
        assert_eq!(
            signed.verify(b"tampered"),
            Err(IdentityError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_verify_rejects_foreign_owner() {
        let alice = KeypairWallet::generate();
        let bob = KeypairWallet::generate();
        let mut signed = alice.sign(b"payload").unwrap();
        signed.owner = bob.identity().unwrap();
        assert_eq!(
            signed.verify(b"payload"),
            Err(IdentityError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_disconnected_wallet() {
        let wallet = DisconnectedWallet;
        assert_eq!(wallet.identity(), Err(IdentityError::NotConnected));
        assert_eq!(wallet.sign(b"x"), Err(IdentityError::NotConnected));
    }

    #[test]
    fn test_identity_serializes_as_string() {
        let id = Identity::new("owner-1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"owner-1\"");
    }
}
