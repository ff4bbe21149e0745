//! Per-identity session state
//!
//! The session holds what this process believes about each identity: its
//! current binding and any content that was published but not yet bound.
//! Only the workflow writes it, and only while holding a [`RunGuard`]. The
//! registry remains the source of truth; `reconcile` overwrites whatever is
//! here.
//!
//! Each run gets a token from a per-identity counter. Abandoning a run bumps
//! the counter, so a result arriving for the old token is discarded instead
//! of committed.

use dashmap::DashMap;
use linkspace_core::{ContentId, Identity};
use linkspace_registry::Binding;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClaimError, ClaimResult};

/// Snapshot format version
pub const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Clone, Default)]
struct SessionEntry {
    binding: Option<Binding>,
    pending: Option<ContentId>,
    generation: u64,
    /// Token of the run holding the identity, if any
    running: Option<u64>,
}

/// Exported session state for one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u8,
    pub identity: Identity,
    pub binding: Option<Binding>,
    pub pending: Option<ContentId>,
}

/// Shared session context, injected into the workflow
#[derive(Debug, Default)]
pub struct SessionContext {
    entries: DashMap<Identity, SessionEntry>,
}

/// Exclusive hold on an identity for one workflow run
///
/// Released on drop.
#[derive(Debug)]
pub struct RunGuard<'a> {
    session: &'a SessionContext,
    identity: Identity,
    token: u64,
}

impl RunGuard<'_> {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut entry) = self.session.entries.get_mut(&self.identity) {
            if entry.running == Some(self.token) {
                entry.running = None;
            }
        }
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The binding this session believes the identity holds
    pub fn binding(&self, identity: &Identity) -> Option<Binding> {
        self.entries.get(identity).and_then(|e| e.binding.clone())
    }

    /// Content published for a claim that has not been bound yet
    pub fn pending(&self, identity: &Identity) -> Option<ContentId> {
        self.entries.get(identity).and_then(|e| e.pending)
    }

    pub fn is_running(&self, identity: &Identity) -> bool {
        self.entries
            .get(identity)
            .is_some_and(|e| e.running.is_some())
    }

    /// Whether `token` still belongs to the newest run for the identity
    pub fn is_current(&self, identity: &Identity, token: u64) -> bool {
        self.entries
            .get(identity)
            .is_some_and(|e| e.generation == token)
    }

    /// Start a run, rejecting it if another run holds the identity
    pub(crate) fn begin_run(&self, identity: &Identity) -> ClaimResult<RunGuard<'_>> {
        let mut entry = self.entries.entry(identity.clone()).or_default();
        if entry.running.is_some() {
            return Err(ClaimError::AlreadyRunning {
                identity: identity.short_id(),
            });
        }
        entry.generation += 1;
        let token = entry.generation;
        entry.running = Some(token);
        drop(entry);

        debug!(identity = %identity.short_id(), token, "Run started");
        Ok(RunGuard {
            session: self,
            identity: identity.clone(),
            token,
        })
    }

    /// Invalidate the identity's current run
    ///
    /// The abandoned run keeps its hold until it reaches its next checkpoint
    /// and fails with [`ClaimError::Stale`]; nothing it produces is committed.
    pub fn abandon(&self, identity: &Identity) {
        if let Some(mut entry) = self.entries.get_mut(identity) {
            entry.generation += 1;
            debug!(
                identity = %identity.short_id(),
                generation = entry.generation,
                "Run abandoned"
            );
        }
    }

    pub(crate) fn ensure_current(&self, identity: &Identity, token: u64) -> ClaimResult<()> {
        if self.is_current(identity, token) {
            Ok(())
        } else {
            Err(ClaimError::Stale)
        }
    }

    fn update(
        &self,
        identity: &Identity,
        token: u64,
        apply: impl FnOnce(&mut SessionEntry),
    ) -> ClaimResult<()> {
        let mut entry = self.entries.get_mut(identity).ok_or(ClaimError::Stale)?;
        if entry.generation != token {
            return Err(ClaimError::Stale);
        }
        apply(&mut entry);
        Ok(())
    }

    /// Record a confirmed binding; clears the pending content
    pub(crate) fn commit_binding(
        &self,
        identity: &Identity,
        token: u64,
        binding: Binding,
    ) -> ClaimResult<()> {
        self.update(identity, token, |entry| {
            entry.binding = Some(binding);
            entry.pending = None;
        })
    }

    /// Keep published content so a failed bind can be retried without
    /// publishing again
    pub(crate) fn retain_pending(
        &self,
        identity: &Identity,
        token: u64,
        content_id: ContentId,
    ) -> ClaimResult<()> {
        self.update(identity, token, |entry| entry.pending = Some(content_id))
    }

    /// Forget the binding after a confirmed removal
    pub(crate) fn clear_binding(&self, identity: &Identity, token: u64) -> ClaimResult<()> {
        self.update(identity, token, |entry| {
            entry.binding = None;
            entry.pending = None;
        })
    }

    /// Replace local state with what the registry reported
    pub(crate) fn adopt(
        &self,
        identity: &Identity,
        token: u64,
        binding: Option<Binding>,
    ) -> ClaimResult<()> {
        self.update(identity, token, |entry| {
            if binding.is_some() {
                entry.pending = None;
            }
            entry.binding = binding;
        })
    }

    /// Export the identity's state as a compact postcard snapshot
    pub fn snapshot(&self, identity: &Identity) -> ClaimResult<Vec<u8>> {
        let (binding, pending) = self
            .entries
            .get(identity)
            .map(|e| (e.binding.clone(), e.pending))
            .unwrap_or_default();
        let snapshot = SessionSnapshot {
            version: SNAPSHOT_VERSION,
            identity: identity.clone(),
            binding,
            pending,
        };
        Ok(postcard::to_allocvec(&snapshot)?)
    }

    /// Import a snapshot produced by [`SessionContext::snapshot`]
    ///
    /// Refused while a run holds the identity. Imported state is a hint
    /// until the next reconcile.
    pub fn restore(&self, bytes: &[u8]) -> ClaimResult<Identity> {
        let snapshot: SessionSnapshot = postcard::from_bytes(bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ClaimError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if let Some(binding) = &snapshot.binding {
            if binding.owner != snapshot.identity {
                return Err(ClaimError::Snapshot(format!(
                    "binding {} is not owned by {}",
                    binding.name,
                    snapshot.identity.short_id()
                )));
            }
        }

        let mut entry = self.entries.entry(snapshot.identity.clone()).or_default();
        if entry.running.is_some() {
            return Err(ClaimError::AlreadyRunning {
                identity: snapshot.identity.short_id(),
            });
        }
        entry.binding = snapshot.binding;
        entry.pending = snapshot.pending;
        Ok(snapshot.identity)
    }
}

#[cfg(test)]
mod tests {
    use linkspace_core::Name;

    use super::*;

    fn identity(seed: &str) -> Identity {
        Identity::new(format!("{}-address", seed)).unwrap()
    }

    fn binding(owner: &Identity) -> Binding {
        Binding::new(
            Name::parse("john-doe").unwrap(),
            owner.clone(),
            ContentId::from_data(b"<html></html>"),
        )
    }

    #[test]
    fn test_second_run_is_rejected() {
        let session = SessionContext::new();
        let alice = identity("alice");

        let run = session.begin_run(&alice).unwrap();
        assert!(session.is_running(&alice));
        assert!(matches!(
            session.begin_run(&alice),
            Err(ClaimError::AlreadyRunning { .. })
        ));

        // Other identities are independent
        let bob = identity("bob");
        assert!(session.begin_run(&bob).is_ok());

        drop(run);
        assert!(!session.is_running(&alice));
        assert!(session.begin_run(&alice).is_ok());
    }

    #[test]
    fn test_abandoned_run_cannot_commit() {
        let session = SessionContext::new();
        let alice = identity("alice");

        let run = session.begin_run(&alice).unwrap();
        session.abandon(&alice);
        assert!(!session.is_current(&alice, run.token()));
        assert_eq!(
            session.commit_binding(&alice, run.token(), binding(&alice)),
            Err(ClaimError::Stale)
        );
        assert_eq!(session.binding(&alice), None);

        // Still held until the abandoned run finishes
        assert!(session.begin_run(&alice).is_err());
        drop(run);

        let next = session.begin_run(&alice).unwrap();
        session
            .commit_binding(&alice, next.token(), binding(&alice))
            .unwrap();
        assert_eq!(session.binding(&alice), Some(binding(&alice)));
    }

    #[test]
    fn test_commit_clears_pending() {
        let session = SessionContext::new();
        let alice = identity("alice");
        let run = session.begin_run(&alice).unwrap();

        let content_id = ContentId::from_data(b"page");
        session
            .retain_pending(&alice, run.token(), content_id)
            .unwrap();
        assert_eq!(session.pending(&alice), Some(content_id));

        session
            .commit_binding(&alice, run.token(), binding(&alice))
            .unwrap();
        assert_eq!(session.pending(&alice), None);

        session.clear_binding(&alice, run.token()).unwrap();
        assert_eq!(session.binding(&alice), None);
    }

    #[test]
    fn test_snapshot_restore() {
        let session = SessionContext::new();
        let alice = identity("alice");
        {
            let run = session.begin_run(&alice).unwrap();
            session
                .commit_binding(&alice, run.token(), binding(&alice))
                .unwrap();
        }
        let bytes = session.snapshot(&alice).unwrap();

        let restored = SessionContext::new();
        assert_eq!(restored.restore(&bytes).unwrap(), alice);
        assert_eq!(restored.binding(&alice), Some(binding(&alice)));

        assert!(matches!(
            restored.restore(&bytes[..bytes.len() / 2]),
            Err(ClaimError::Snapshot(_))
        ));
    }

    #[test]
    fn test_restore_rejects_foreign_binding() {
        let alice = identity("alice");
        let snapshot = SessionSnapshot {
            version: SNAPSHOT_VERSION,
            identity: alice,
            binding: Some(binding(&identity("mallory"))),
            pending: None,
        };
        let bytes = postcard::to_allocvec(&snapshot).unwrap();
        assert!(matches!(
            SessionContext::new().restore(&bytes),
            Err(ClaimError::Snapshot(_))
        ));
    }
}
