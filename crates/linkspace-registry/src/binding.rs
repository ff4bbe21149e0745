//! Name bindings

use std::fmt;

use linkspace_core::{ContentId, Identity, Name};
use serde::{Deserialize, Serialize};

/// A name bound to published content, owned by one identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub name: Name,
    pub owner: Identity,
    pub content_id: ContentId,
}

impl Binding {
    pub fn new(name: Name, owner: Identity, content_id: ContentId) -> Self {
        Self {
            name,
            owner,
            content_id,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.name, self.content_id)
    }
}

/// Outcome of a confirmed remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoveOutcome {
    Removed,
    /// There was nothing to remove
    NotFound,
}
