//! Per-name state machine
//!
//! ```text
//! Unregistered --RegisterSent--> Pending --RegisterConfirmed--> Bound
//!                                Pending --RegisterFailed-----> Unregistered
//! Bound --Rebound--> Bound
//! Bound --RemoveSent--> Removing --RemoveConfirmed--> Unregistered
//! ```
//!
//! A failed or timed-out removal leaves the name where it was before the
//! request went out.

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Local view of one name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameState {
    #[default]
    Unregistered,
    /// Register sent, outcome not yet known
    Pending,
    Bound,
    /// Remove sent, outcome not yet known
    Removing,
}

/// Something that happened to a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameEvent {
    RegisterSent,
    RegisterConfirmed,
    RegisterFailed,
    Rebound,
    RemoveSent,
    RemoveConfirmed,
}

impl NameState {
    /// Next state after `event`, or an error if the event makes no sense here
    ///
    /// `RegisterSent` and `RemoveSent` are accepted from `Unregistered` as
    /// well as `Bound`: the local view may lag the registry, which decides.
    pub fn apply(self, event: NameEvent) -> RegistryResult<NameState> {
        use NameEvent::*;
        use NameState::*;

        match (self, event) {
            (Unregistered | Bound, RegisterSent) => Ok(Pending),
            (Pending, RegisterConfirmed) => Ok(Bound),
            (Pending, RegisterFailed) => Ok(Unregistered),
            (Unregistered | Bound, Rebound) => Ok(Bound),
            (Unregistered | Bound, RemoveSent) => Ok(Removing),
            (Removing, RemoveConfirmed) => Ok(Unregistered),
            (from, event) => Err(RegistryError::InvalidTransition { from, event }),
        }
    }

    /// No request is outstanding
    pub fn is_settled(&self) -> bool {
        matches!(self, NameState::Unregistered | NameState::Bound)
    }
}
