//! Registry client
//!
//! Drives the registry process over [`MessagingClient`]. Mutations are
//! signed messages whose results are awaited; lookups and listings are
//! dry runs. The client keeps a local [`NameState`] per name it has acted
//! on and rejects overlapping mutations of the same name with
//! [`RegistryError::RequestInFlight`]. It never retries: every transport
//! error or timeout is returned as-is for the caller to decide.

use std::collections::BTreeSet;

use dashmap::{DashMap, DashSet};
use linkspace_core::{ContentId, Identity, Name};
use linkspace_messaging::{Cursor, MessageId, MessagingClient, ProcessId, ProcessResult};
use tracing::{debug, info, instrument, warn};

use crate::binding::{Binding, RemoveOutcome};
use crate::error::{RegistryError, RegistryResult};
use crate::protocol::{
    DEFAULT_TTL_SECONDS, RegistryRequest, UsersReply, check_reply, decode_user,
};
use crate::state::{NameEvent, NameState};

/// Marks a name busy until dropped
struct InFlight<'a> {
    names: &'a DashSet<Name>,
    name: Name,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.names.remove(&self.name);
    }
}

/// Client for the name registry process
pub struct RegistryClient {
    messaging: MessagingClient,
    process: ProcessId,
    ttl_seconds: u32,
    page_size: usize,
    states: DashMap<Name, NameState>,
    in_flight: DashSet<Name>,
}

impl RegistryClient {
    pub fn new(messaging: MessagingClient, process: ProcessId) -> Self {
        let page_size = messaging.config().page_size;
        Self {
            messaging,
            process,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            page_size,
            states: DashMap::new(),
            in_flight: DashSet::new(),
        }
    }

    /// TTL requested when rebinding
    pub fn with_ttl(mut self, ttl_seconds: u32) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Page size for listings
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn process(&self) -> &ProcessId {
        &self.process
    }

    pub fn messaging(&self) -> &MessagingClient {
        &self.messaging
    }

    /// Identity of the connected wallet
    pub fn identity(&self) -> RegistryResult<Identity> {
        Ok(self.messaging.identity()?)
    }

    /// Local state of `name`; names never touched are `Unregistered`
    pub fn name_state(&self, name: &Name) -> NameState {
        self.states.get(name).map(|s| *s).unwrap_or_default()
    }

    fn set_state(&self, name: &Name, state: NameState) {
        debug!(name = %name, state = ?state, "Name state changed");
        self.states.insert(name.clone(), state);
    }

    fn begin(&self, name: &Name) -> RegistryResult<InFlight<'_>> {
        if !self.in_flight.insert(name.clone()) {
            return Err(RegistryError::RequestInFlight {
                name: name.to_string(),
            });
        }
        Ok(InFlight {
            names: &self.in_flight,
            name: name.clone(),
        })
    }

    /// Record a binding seen on the registry, unless a request is outstanding
    fn observe(&self, binding: &Binding) {
        if self.name_state(&binding.name).is_settled() {
            self.states.insert(binding.name.clone(), NameState::Bound);
        }
    }

    async fn mutate(&self, name: &Name, request: RegistryRequest) -> RegistryResult<Binding> {
        let (tags, data) = request.encode()?;
        let (message_id, result) = self
            .messaging
            .send_and_await(&self.process, request.action(), tags, data)
            .await?;
        let binding = decode_user(name.as_str(), &result)?;
        if binding.name != *name {
            return Err(RegistryError::InvalidResponse(format!(
                "reply to {} names {}",
                message_id, binding.name
            )));
        }
        Ok(binding)
    }

    async fn query(&self, request: RegistryRequest) -> RegistryResult<ProcessResult> {
        let (tags, data) = request.encode()?;
        Ok(self
            .messaging
            .dry_run(&self.process, request.action(), tags, data)
            .await?)
    }

    /// The binding owned by `identity`, if any
    #[instrument(skip_all, fields(identity = %identity.short_id()))]
    pub async fn lookup(&self, identity: &Identity) -> RegistryResult<Option<Binding>> {
        let result = self
            .query(RegistryRequest::GetUsers {
                address: Some(identity.clone()),
                cursor: None,
                limit: None,
            })
            .await?;

        match decode_user(identity.as_str(), &result) {
            Ok(binding) => {
                debug!(name = %binding.name, "Found binding");
                self.observe(&binding);
                Ok(Some(binding))
            }
            Err(RegistryError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Every binding on the registry, in name order
    #[instrument(skip_all)]
    pub async fn list_bindings(&self) -> RegistryResult<Vec<Binding>> {
        let mut bindings = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let result = self
                .query(RegistryRequest::GetUsers {
                    address: None,
                    cursor: cursor.clone(),
                    limit: Some(self.page_size),
                })
                .await?;
            check_reply("*", &result)?;
            let page: UsersReply = result.first_json()?;
            for record in page.users.into_values() {
                bindings.push(record.into_binding()?);
            }

            match page.next_cursor {
                None => break,
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    return Err(RegistryError::InvalidResponse(format!(
                        "listing cursor {} did not advance",
                        next
                    )));
                }
                Some(next) => cursor = Some(next),
            }
        }
        debug!(count = bindings.len(), "Listed bindings");
        Ok(bindings)
    }

    /// Every registered name
    pub async fn list_all(&self) -> RegistryResult<BTreeSet<Name>> {
        Ok(self
            .list_bindings()
            .await?
            .into_iter()
            .map(|b| b.name)
            .collect())
    }

    /// Bind `name` to `content_id` for the connected identity
    ///
    /// Fails with [`RegistryError::Conflict`] when another identity holds
    /// the name. On any failure, including a timeout, the local state goes
    /// back to `Unregistered`.
    #[instrument(skip_all, fields(name = %name, content_id = %content_id.short()))]
    pub async fn register(&self, name: &Name, content_id: ContentId) -> RegistryResult<Binding> {
        let _guard = self.begin(name)?;
        let pending = self.name_state(name).apply(NameEvent::RegisterSent)?;
        self.set_state(name, pending);

        let outcome = self
            .mutate(
                name,
                RegistryRequest::Register {
                    name: name.clone(),
                    content_id,
                },
            )
            .await;

        match outcome {
            Ok(binding) => {
                self.set_state(name, pending.apply(NameEvent::RegisterConfirmed)?);
                info!(owner = %binding.owner.short_id(), "Name registered");
                Ok(binding)
            }
            Err(e) => {
                warn!(error = %e, "Register failed");
                self.set_state(name, pending.apply(NameEvent::RegisterFailed)?);
                Err(e)
            }
        }
    }

    /// Point an already bound `name` at new content
    ///
    /// Overwrites the single existing binding; the registry refuses the
    /// change unless the caller owns the name.
    #[instrument(skip_all, fields(name = %name, content_id = %content_id.short()))]
    pub async fn rebind(&self, name: &Name, content_id: ContentId) -> RegistryResult<Binding> {
        let _guard = self.begin(name)?;
        let next = self.name_state(name).apply(NameEvent::Rebound)?;

        let outcome = self
            .mutate(
                name,
                RegistryRequest::SetRecord {
                    name: name.clone(),
                    content_id,
                    ttl_seconds: self.ttl_seconds,
                },
            )
            .await;

        match outcome {
            Ok(binding) => {
                self.set_state(name, next);
                info!("Name rebound");
                Ok(binding)
            }
            Err(e @ RegistryError::NotFound { .. }) => {
                self.set_state(name, NameState::Unregistered);
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Rebind failed");
                Err(e)
            }
        }
    }

    /// Delete the binding for `name`
    ///
    /// A name with no binding yields [`RemoveOutcome::NotFound`]. Any other
    /// failure leaves the local state as it was.
    #[instrument(skip_all, fields(name = %name))]
    pub async fn remove(&self, name: &Name) -> RegistryResult<RemoveOutcome> {
        let _guard = self.begin(name)?;
        let prior = self.name_state(name);
        let removing = prior.apply(NameEvent::RemoveSent)?;
        self.set_state(name, removing);

        let outcome = self
            .mutate(name, RegistryRequest::RemoveRecord { name: name.clone() })
            .await;

        match outcome {
            Ok(_) => {
                self.set_state(name, removing.apply(NameEvent::RemoveConfirmed)?);
                info!("Name removed");
                Ok(RemoveOutcome::Removed)
            }
            Err(RegistryError::NotFound { .. }) => {
                self.set_state(name, removing.apply(NameEvent::RemoveConfirmed)?);
                debug!("Nothing to remove");
                Ok(RemoveOutcome::NotFound)
            }
            Err(e) => {
                warn!(error = %e, "Remove failed");
                self.set_state(name, prior);
                Err(e)
            }
        }
    }

    /// Look for the result of `message_id` in the registry's result feed
    ///
    /// Used after a timeout to learn whether the request was applied after
    /// all. `None` means the result has not shown up (yet).
    #[instrument(skip_all, fields(message_id = %message_id))]
    pub async fn confirm(&self, message_id: &MessageId) -> RegistryResult<Option<ProcessResult>> {
        let mut cursor: Option<Cursor> = None;
        loop {
            let page = self
                .messaging
                .query_batch(&self.process, cursor.as_ref(), Some(self.page_size))
                .await?;
            if page.is_empty() {
                return Ok(None);
            }
            let next = page.cursor;
            if let Some(found) = page
                .results
                .into_iter()
                .find(|r| r.message_id.as_ref() == Some(message_id))
            {
                return Ok(Some(found));
            }
            if next.is_none() || next == cursor {
                return Ok(None);
            }
            cursor = next;
        }
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("process", &self.process)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("tracked_names", &self.states.len())
            .finish_non_exhaustive()
    }
}
