//! # Linkspace Core
//!
//! Shared vocabulary for the Linkspace stack.
//!
//! Everything above this crate (messaging, publishing, the name registry
//! client and the claim workflow) speaks in terms of these types, so the
//! same workflow logic runs against real collaborators and against the
//! in-memory doubles used in tests.
//!
//! ## Key Types
//!
//! - [`Identity`]: Opaque principal reference derived from a wallet key
//! - [`Wallet`]: The external signing collaborator
//! - [`Name`]: A validated, human-readable label
//! - [`ContentId`]: Stable reference to published bytes

pub mod content;
pub mod error;
pub mod identity;
pub mod name;

// Re-export main types
pub use content::*;
pub use error::*;
pub use identity::*;
pub use name::*;
