//! The name-claim workflow
//!
//! A claim runs these steps strictly in order:
//!
//! ```text
//! ResolvingIdentity -> CheckingExistingBinding -> Done            (identity already named)
//!                                              -> ValidatingName -> BuildingArtifact
//!                                                 -> Publishing -> Binding -> Done
//! ```
//!
//! Any failure ends the run in `Failed(reason)`. Content published before a
//! failed bind stays published; its content id is kept in the session so
//! the next attempt binds it without publishing again.
//!
//! Transport errors are retried with backoff. A timeout means the request
//! may have been applied, so the registry is consulted before the mutation
//! is sent again. A conflict ends the attempt.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use linkspace_artifacts::{Artifact, ArtifactBuilder, Document};
use linkspace_core::{ContentId, Identity, Name, Wallet};
use linkspace_logging::{CorrelationContext, CorrelationExt, IdentityContextGuard, fields};
use linkspace_messaging::{MessagingClient, ProcessTransport};
use linkspace_registry::{Binding, RegistryClient, RegistryError, RemoveOutcome};
use linkspace_storage::{ContentStore, Publisher};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{Span, debug, info, instrument, warn};

use crate::config::{ClientBuilder, ClientConfig};
use crate::error::{ClaimError, ClaimResult};
use crate::links::ShareLinks;
use crate::session::{RunGuard, SessionContext};

/// Observable progress of the workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimState {
    Start,
    ResolvingIdentity,
    CheckingExistingBinding,
    ValidatingName,
    BuildingArtifact,
    Publishing,
    Binding,
    /// The identity holds this binding
    Done(Binding),
    Removing,
    Failed(String),
}

impl ClaimState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimState::Done(_) | ClaimState::Failed(_))
    }

    pub fn binding(&self) -> Option<&Binding> {
        match self {
            ClaimState::Done(binding) => Some(binding),
            _ => None,
        }
    }
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimOutcome {
    /// The identity already held a name; nothing was published
    Existing,
    /// A new name was bound
    Claimed,
    /// The bound name now points at new content
    Republished,
    /// The page had not changed; nothing was published
    Unchanged,
}

/// Result of a successful claim or republish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub binding: Binding,
    pub links: ShareLinks,
    pub outcome: ClaimOutcome,
}

/// Answer from the local availability cache
///
/// Advisory only: the registry decides when a name is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Taken,
    /// Bound to the connected identity
    Owned,
    /// The cache has not been loaded
    Unknown,
}

#[derive(Debug, Clone, Copy)]
enum BindRequest {
    Register,
    Rebind,
}

/// The registry no longer backs the binding the session holds
fn rejects_binding(error: &ClaimError) -> bool {
    matches!(
        error,
        ClaimError::Registry(RegistryError::NotFound { .. } | RegistryError::Unauthorized { .. })
    )
}

/// Orchestrates building, publishing and binding a profile page
pub struct ClaimWorkflow {
    config: ClientConfig,
    wallet: Arc<dyn Wallet>,
    registry: RegistryClient,
    publisher: Publisher,
    builder: ArtifactBuilder,
    session: Arc<SessionContext>,
    availability: RwLock<Option<BTreeSet<Name>>>,
    state: watch::Sender<ClaimState>,
}

impl ClaimWorkflow {
    pub fn new(
        config: ClientConfig,
        wallet: Arc<dyn Wallet>,
        transport: Arc<dyn ProcessTransport>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        let messaging =
            MessagingClient::new(transport, Arc::clone(&wallet), config.messaging.clone());
        let registry = RegistryClient::new(messaging, config.registry_process.clone())
            .with_ttl(config.ttl_seconds)
            .with_page_size(config.list_page_size);
        let publisher = Publisher::new(store, Arc::clone(&wallet), config.publish_mode)
            .with_app_name(config.messaging.app_name.clone())
            .with_upload_timeout(config.messaging.result_timeout);
        let (state, _) = watch::channel(ClaimState::Start);

        Self {
            config,
            wallet,
            registry,
            publisher,
            builder: ArtifactBuilder::new(),
            session: Arc::new(SessionContext::new()),
            availability: RwLock::new(None),
            state,
        }
    }

    /// Share session state with other workflows
    pub fn with_session(mut self, session: Arc<SessionContext>) -> Self {
        self.session = session;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Current state
    pub fn state(&self) -> ClaimState {
        self.state.borrow().clone()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<ClaimState> {
        self.state.subscribe()
    }

    pub fn share_links(&self, name: &Name) -> ClaimResult<ShareLinks> {
        ShareLinks::for_config(name, &self.config)
    }

    fn set_state(&self, state: ClaimState) {
        debug!(state = ?state, "Workflow state changed");
        self.state.send_replace(state);
    }

    /// Move to `state` unless the run was abandoned
    fn advance(&self, run: &RunGuard<'_>, state: ClaimState) -> ClaimResult<()> {
        self.session.ensure_current(run.identity(), run.token())?;
        self.set_state(state);
        Ok(())
    }

    fn fail(&self, error: ClaimError) -> ClaimError {
        self.set_state(ClaimState::Failed(error.to_string()));
        error
    }

    /// Report a run's failure unless it was abandoned
    fn finish<T>(&self, run: &RunGuard<'_>, outcome: ClaimResult<T>) -> ClaimResult<T> {
        if let Err(e) = &outcome {
            warn!(error = %e, "Workflow run failed");
            if self.session.is_current(run.identity(), run.token()) {
                self.set_state(ClaimState::Failed(e.to_string()));
            }
        }
        outcome
    }

    fn resolve_identity(&self) -> ClaimResult<Identity> {
        let identity = self.wallet.identity()?;
        Span::current().record(fields::IDENTITY, identity.short_id().as_str());
        Ok(identity)
    }

    // ============================================================
    // Retry
    // ============================================================

    async fn retrying<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> ClaimResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClaimResult<T>>,
    {
        let policy = self.config.retry;
        let mut attempts = 0;
        loop {
            attempts += 1;
            match attempt().await {
                Err(e) if e.is_retryable() && policy.allows_another(attempts) => {
                    let delay = policy.delay_for(attempts - 1);
                    warn!(
                        operation,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transport error; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                outcome => return outcome,
            }
        }
    }

    async fn lookup(&self, identity: &Identity) -> ClaimResult<Option<Binding>> {
        let registry = &self.registry;
        self.retrying("lookup", move || async move {
            registry.lookup(identity).await.map_err(ClaimError::from)
        })
        .await
    }

    /// Every binding the identity holds
    ///
    /// `lookup` reports only the oldest binding of an identity, so deciding
    /// whether a particular name changed needs the full listing.
    async fn holdings(&self, identity: &Identity) -> ClaimResult<Vec<Binding>> {
        let registry = &self.registry;
        let bindings = self
            .retrying("list", move || async move {
                registry.list_bindings().await.map_err(ClaimError::from)
            })
            .await?;
        Ok(bindings
            .into_iter()
            .filter(|b| b.owner == *identity)
            .collect())
    }

    async fn publish(&self, run: &RunGuard<'_>, artifact: &Artifact) -> ClaimResult<ContentId> {
        let expected = artifact.content_id();
        if self.session.pending(run.identity()) == Some(expected) {
            info!(
                content_id = %expected.short(),
                "Reusing content published by an earlier attempt"
            );
            return Ok(expected);
        }

        let publisher = &self.publisher;
        let receipt = self
            .retrying("publish", move || async move {
                publisher
                    .publish_artifact(artifact)
                    .await
                    .map_err(ClaimError::from)
            })
            .await?;
        self.session
            .retain_pending(run.identity(), run.token(), receipt.content_id)?;
        Ok(receipt.content_id)
    }

    /// Register or rebind, disambiguating timeouts with a lookup
    async fn bind(
        &self,
        run: &RunGuard<'_>,
        request: BindRequest,
        name: &Name,
        content_id: ContentId,
    ) -> ClaimResult<Binding> {
        let identity = run.identity();
        let policy = self.config.retry;
        let mut attempts = 0;
        loop {
            self.session.ensure_current(identity, run.token())?;
            attempts += 1;

            let outcome = match request {
                BindRequest::Register => self.registry.register(name, content_id).await,
                BindRequest::Rebind => self.registry.rebind(name, content_id).await,
            };
            let error = match outcome {
                Ok(binding) => return Ok(binding),
                Err(e) => ClaimError::from(e),
            };

            if error.is_ambiguous() {
                warn!(name = %name, request = ?request, "Outcome unknown; checking the registry");
                let held = self.holdings(identity).await?;
                if let Some(binding) = held
                    .iter()
                    .find(|b| b.name == *name && b.content_id == content_id)
                {
                    info!(name = %name, "Request was applied");
                    return Ok(binding.clone());
                }
                if let (BindRequest::Register, Some(other)) =
                    (request, held.iter().find(|b| b.name != *name))
                {
                    warn!(held = %other.name, "Identity holds another name; not retrying");
                    return Err(error);
                }
                debug!(name = %name, "Request was not applied");
            } else if !error.is_retryable() {
                return Err(error);
            }

            if !policy.allows_another(attempts) {
                return Err(error);
            }
            let delay = policy.delay_for(attempts - 1);
            warn!(
                request = ?request,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn remove(&self, run: &RunGuard<'_>, binding: &Binding) -> ClaimResult<RemoveOutcome> {
        let identity = run.identity();
        let policy = self.config.retry;
        let mut attempts = 0;
        loop {
            self.session.ensure_current(identity, run.token())?;
            attempts += 1;

            let error = match self.registry.remove(&binding.name).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) => ClaimError::from(e),
            };

            if error.is_ambiguous() {
                warn!(name = %binding.name, "Remove outcome unknown; checking the registry");
                let still_bound = self
                    .holdings(identity)
                    .await?
                    .iter()
                    .any(|b| b.name == binding.name);
                if !still_bound {
                    info!(name = %binding.name, "Remove was applied");
                    return Ok(RemoveOutcome::Removed);
                }
            } else if !error.is_retryable() {
                return Err(error);
            }

            if !policy.allows_another(attempts) {
                return Err(error);
            }
            tokio::time::sleep(policy.delay_for(attempts - 1)).await;
        }
    }

    fn build(&self, identity: &Identity, document: &Document) -> Artifact {
        let _context = IdentityContextGuard::new(identity);
        self.builder.build(document)
    }

    /// Commit a binding and report it
    fn complete(
        &self,
        run: &RunGuard<'_>,
        binding: Binding,
        outcome: ClaimOutcome,
    ) -> ClaimResult<ClaimReceipt> {
        let links = self.share_links(&binding.name)?;
        self.session
            .commit_binding(run.identity(), run.token(), binding.clone())?;
        self.mark(&binding.name, true);
        self.set_state(ClaimState::Done(binding.clone()));

        info!(
            name = %binding.name,
            content_id = %binding.content_id.short(),
            link = %links.web,
            outcome = ?outcome,
            "Name bound"
        );
        Ok(ClaimReceipt {
            binding,
            links,
            outcome,
        })
    }

    // ============================================================
    // Claim
    // ============================================================

    /// Claim `candidate` for the connected identity and bind it to the page
    /// rendered from `document`
    ///
    /// The candidate is normalized (lowercased, invalid characters dropped)
    /// and validated before anything remote happens. If the identity already
    /// holds a name, that binding is returned unchanged.
    #[instrument(
        name = "claim",
        skip_all,
        fields(
            candidate = %candidate,
            identity = tracing::field::Empty,
            trace_id = tracing::field::Empty,
            span_id = tracing::field::Empty,
        )
    )]
    pub async fn claim(&self, candidate: &str, document: &Document) -> ClaimResult<ClaimReceipt> {
        Span::current().record_correlation(&CorrelationContext::new_root());
        let identity = self.resolve_identity().map_err(|e| self.fail(e))?;
        let run = self.session.begin_run(&identity)?;
        let outcome = self.run_claim(&run, candidate, document).await;
        self.finish(&run, outcome)
    }

    /// Claim with a document given as an editor snapshot
    ///
    /// Snapshot errors, including unsupported item types, fail the claim
    /// before anything is published. The snapshot is parsed inside the run,
    /// so a rejected call never touches another run's state.
    #[instrument(
        name = "claim",
        skip_all,
        fields(
            candidate = %candidate,
            identity = tracing::field::Empty,
            trace_id = tracing::field::Empty,
            span_id = tracing::field::Empty,
        )
    )]
    pub async fn claim_snapshot(
        &self,
        candidate: &str,
        snapshot: &str,
    ) -> ClaimResult<ClaimReceipt> {
        Span::current().record_correlation(&CorrelationContext::new_root());
        let identity = self.resolve_identity().map_err(|e| self.fail(e))?;
        let run = self.session.begin_run(&identity)?;
        let outcome = match Document::from_json(snapshot) {
            Ok(document) => self.run_claim(&run, candidate, &document).await,
            Err(e) => Err(e.into()),
        };
        self.finish(&run, outcome)
    }

    async fn run_claim(
        &self,
        run: &RunGuard<'_>,
        candidate: &str,
        document: &Document,
    ) -> ClaimResult<ClaimReceipt> {
        let identity = run.identity();
        self.advance(run, ClaimState::ResolvingIdentity)?;
        let name = Name::normalize(candidate)?;
        self.share_links(&name)?;

        self.advance(run, ClaimState::CheckingExistingBinding)?;
        let existing = self.lookup(identity).await?;
        self.session.ensure_current(identity, run.token())?;
        if let Some(binding) = existing {
            info!(name = %binding.name, "Identity already holds a name");
            return self.complete(run, binding, ClaimOutcome::Existing);
        }

        self.advance(run, ClaimState::ValidatingName)?;
        if self.availability(&name) == Availability::Taken {
            info!(name = %name, "Cache lists the name as taken; asking the registry anyway");
        }

        self.advance(run, ClaimState::BuildingArtifact)?;
        let artifact = self.build(identity, document);

        self.advance(run, ClaimState::Publishing)?;
        let content_id = self.publish(run, &artifact).await?;

        self.advance(run, ClaimState::Binding)?;
        let binding = self
            .bind(run, BindRequest::Register, &name, content_id)
            .await?;
        self.complete(run, binding, ClaimOutcome::Claimed)
    }

    // ============================================================
    // Republish
    // ============================================================

    /// Publish a new version of the page and point the bound name at it
    #[instrument(
        name = "republish",
        skip_all,
        fields(
            identity = tracing::field::Empty,
            trace_id = tracing::field::Empty,
            span_id = tracing::field::Empty,
        )
    )]
    pub async fn republish(&self, document: &Document) -> ClaimResult<ClaimReceipt> {
        Span::current().record_correlation(&CorrelationContext::new_root());
        let identity = self.resolve_identity().map_err(|e| self.fail(e))?;
        let run = self.session.begin_run(&identity)?;
        let outcome = self.run_republish(&run, document).await;
        self.finish(&run, outcome)
    }

    async fn run_republish(
        &self,
        run: &RunGuard<'_>,
        document: &Document,
    ) -> ClaimResult<ClaimReceipt> {
        let identity = run.identity();
        self.advance(run, ClaimState::CheckingExistingBinding)?;
        let current = match self.session.binding(identity) {
            Some(binding) => binding,
            None => self.lookup(identity).await?.ok_or(ClaimError::NotBound)?,
        };

        self.advance(run, ClaimState::BuildingArtifact)?;
        let artifact = self.build(identity, document);
        if artifact.content_id() == current.content_id {
            info!(name = %current.name, "Page unchanged");
            return self.complete(run, current, ClaimOutcome::Unchanged);
        }

        self.advance(run, ClaimState::Publishing)?;
        let content_id = self.publish(run, &artifact).await?;

        self.advance(run, ClaimState::Binding)?;
        match self
            .bind(run, BindRequest::Rebind, &current.name, content_id)
            .await
        {
            Ok(binding) => self.complete(run, binding, ClaimOutcome::Republished),
            Err(e) if rejects_binding(&e) => {
                warn!(name = %current.name, error = %e, "Registry rejected the session's binding");
                let Some(actual) = self.recheck(run, content_id).await? else {
                    return Err(ClaimError::NotBound);
                };
                if actual.name == current.name {
                    return Err(e);
                }
                let binding = self
                    .bind(run, BindRequest::Rebind, &actual.name, content_id)
                    .await?;
                self.complete(run, binding, ClaimOutcome::Republished)
            }
            Err(e) => Err(e),
        }
    }

    /// Adopt the registry's view after it rejected the session's binding
    ///
    /// Content published by this run stays pending for the next bind.
    async fn recheck(
        &self,
        run: &RunGuard<'_>,
        pending: ContentId,
    ) -> ClaimResult<Option<Binding>> {
        let identity = run.identity();
        let reported = self.lookup(identity).await?;
        info!(
            registry = ?reported.as_ref().map(|b| b.name.as_str()),
            "Adopting registry state"
        );
        self.session.adopt(identity, run.token(), reported.clone())?;
        self.session.retain_pending(identity, run.token(), pending)?;
        Ok(reported)
    }

    // ============================================================
    // Release
    // ============================================================

    /// Remove the identity's binding
    ///
    /// With no binding this returns [`RemoveOutcome::NotFound`]. On failure
    /// the session keeps its binding and the state stays `Done`.
    #[instrument(
        name = "release",
        skip_all,
        fields(identity = tracing::field::Empty, trace_id = tracing::field::Empty)
    )]
    pub async fn release(&self) -> ClaimResult<RemoveOutcome> {
        Span::current().record_correlation(&CorrelationContext::new_root());
        let identity = self.resolve_identity()?;
        let run = self.session.begin_run(&identity)?;
        let outcome = self.run_release(&run).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Release failed");
        }
        outcome
    }

    async fn run_release(&self, run: &RunGuard<'_>) -> ClaimResult<RemoveOutcome> {
        let identity = run.identity();
        let current = match self.session.binding(identity) {
            Some(binding) => Some(binding),
            None => self.lookup(identity).await?,
        };
        let Some(binding) = current else {
            info!("No name to release");
            self.session.clear_binding(identity, run.token())?;
            self.set_state(ClaimState::Start);
            return Ok(RemoveOutcome::NotFound);
        };

        self.advance(run, ClaimState::Removing)?;
        match self.remove_held(run, binding).await {
            Ok((released, outcome)) => {
                self.session.clear_binding(identity, run.token())?;
                if outcome == RemoveOutcome::Removed {
                    self.mark(&released.name, false);
                }
                self.set_state(ClaimState::Start);
                info!(name = %released.name, outcome = ?outcome, "Name released");
                Ok(outcome)
            }
            Err(e) => {
                if self.session.is_current(identity, run.token()) {
                    self.set_state(match self.session.binding(identity) {
                        Some(binding) => ClaimState::Done(binding),
                        None => ClaimState::Start,
                    });
                }
                Err(e)
            }
        }
    }

    /// Remove `binding`, falling back to the registry's view when it does
    /// not back the name the session holds
    async fn remove_held(
        &self,
        run: &RunGuard<'_>,
        binding: Binding,
    ) -> ClaimResult<(Binding, RemoveOutcome)> {
        let identity = run.identity();
        let first = self.remove(run, &binding).await;
        let stale = match &first {
            Ok(outcome) => *outcome == RemoveOutcome::NotFound,
            Err(e) => rejects_binding(e),
        };
        if !stale {
            return first.map(|outcome| (binding, outcome));
        }

        warn!(name = %binding.name, "Registry does not back the session's binding");
        let reported = self.lookup(identity).await?;
        self.session.adopt(identity, run.token(), reported.clone())?;
        match reported {
            Some(actual) if actual.name != binding.name => {
                let outcome = self.remove(run, &actual).await?;
                Ok((actual, outcome))
            }
            Some(_) => first.map(|outcome| (binding, outcome)),
            None => Ok((binding, RemoveOutcome::NotFound)),
        }
    }

    // ============================================================
    // Session
    // ============================================================

    /// Replace the session's view with what the registry reports
    #[instrument(name = "reconcile", skip_all, fields(identity = tracing::field::Empty))]
    pub async fn reconcile(&self) -> ClaimResult<Option<Binding>> {
        let identity = self.resolve_identity()?;
        let run = self.session.begin_run(&identity)?;
        let reported = self.lookup(&identity).await?;

        let local = self.session.binding(&identity);
        if local != reported {
            info!(
                local = ?local.as_ref().map(|b| b.name.as_str()),
                registry = ?reported.as_ref().map(|b| b.name.as_str()),
                "Adopting registry state"
            );
        }
        self.session.adopt(&identity, run.token(), reported.clone())?;
        self.set_state(match &reported {
            Some(binding) => ClaimState::Done(binding.clone()),
            None => ClaimState::Start,
        });
        Ok(reported)
    }

    /// Invalidate the run in progress for the connected identity
    ///
    /// The run stops at its next step with [`ClaimError::Stale`] and nothing
    /// it returns is committed. Requests already sent are not recalled.
    pub fn abandon(&self) -> ClaimResult<()> {
        let identity = self.wallet.identity()?;
        self.session.abandon(&identity);
        self.set_state(ClaimState::Start);
        Ok(())
    }

    // ============================================================
    // Availability
    // ============================================================

    fn cached_names(&self) -> RwLockReadGuard<'_, Option<BTreeSet<Name>>> {
        self.availability
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn mark(&self, name: &Name, taken: bool) {
        let mut cache = self
            .availability
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(names) = cache.as_mut() {
            if taken {
                names.insert(name.clone());
            } else {
                names.remove(name);
            }
        }
    }

    fn availability(&self, name: &Name) -> Availability {
        let owned = self
            .wallet
            .identity()
            .ok()
            .and_then(|identity| self.session.binding(&identity))
            .is_some_and(|binding| binding.name == *name);
        if owned {
            return Availability::Owned;
        }
        match self.cached_names().as_ref() {
            None => Availability::Unknown,
            Some(names) if names.contains(name) => Availability::Taken,
            Some(_) => Availability::Available,
        }
    }

    /// Reload the availability cache from the registry
    ///
    /// Returns the number of registered names.
    #[instrument(name = "refresh_availability", skip_all)]
    pub async fn refresh_availability(&self) -> ClaimResult<usize> {
        let registry = &self.registry;
        let names = self
            .retrying("list", move || async move {
                registry.list_all().await.map_err(ClaimError::from)
            })
            .await?;
        let count = names.len();
        *self
            .availability
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(names);
        debug!(count, "Availability cache refreshed");
        Ok(count)
    }

    /// Check a candidate against the local cache
    ///
    /// Fails only when the candidate is invalid. `Available` is a hint: the
    /// claim itself is what settles it.
    pub fn is_available(&self, candidate: &str) -> ClaimResult<Availability> {
        let name = Name::normalize(candidate)?;
        Ok(self.availability(&name))
    }
}

impl std::fmt::Debug for ClaimWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimWorkflow")
            .field("registry", &self.registry)
            .field("publish_mode", &self.config.publish_mode)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    /// Build the configuration and a workflow around it.
    pub fn build(
        self,
        wallet: Arc<dyn Wallet>,
        transport: Arc<dyn ProcessTransport>,
        store: Arc<dyn ContentStore>,
    ) -> ClaimWorkflow {
        ClaimWorkflow::new(self.build_config(), wallet, transport, store)
    }
}
