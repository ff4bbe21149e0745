//! # Linkspace Registry
//!
//! Client for the name registry process, which holds the authoritative
//! name → content bindings.
//!
//! ## Components
//!
//! - [`RegistryClient`]: lookup, listing, register, rebind, remove
//! - [`NameState`]: local per-name state machine
//! - [`protocol`]: wire format of registry requests and replies
//! - [`MockRegistryProcess`]: registry semantics for tests and local runs
//!
//! The registry enforces name uniqueness only. Keeping one name per
//! identity is up to callers, which look up an identity's binding before
//! claiming a new name.

pub mod binding;
pub mod client;
pub mod error;
pub mod mock;
pub mod protocol;
pub mod state;

pub use binding::{Binding, RemoveOutcome};
pub use client::RegistryClient;
pub use error::{RegistryError, RegistryResult};
pub use mock::MockRegistryProcess;
pub use protocol::{DEFAULT_TTL_SECONDS, ErrorCode, RegistryRequest};
pub use state::{NameEvent, NameState};
