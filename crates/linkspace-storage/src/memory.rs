//! In-memory content store
//!
//! Models the funding rules of the content network: uploads up to
//! [`FREE_UPLOAD_LIMIT`] are free, larger ones debit the uploader's balance
//! one unit per byte. Used in tests and local development.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use linkspace_core::{ContentId, Identity};
use linkspace_messaging::Tags;
use tracing::{debug, instrument};

use crate::error::{PublishError, PublishResult};
use crate::store::ContentStore;
use crate::upload::{FREE_UPLOAD_LIMIT, SignedUpload, UploadReceipt};

#[derive(Debug, Clone)]
struct StoredContent {
    data: Bytes,
    tags: Tags,
    owner: Identity,
}

/// Content store held in memory
#[derive(Debug)]
pub struct InMemoryContentStore {
    content: DashMap<ContentId, StoredContent>,
    balances: DashMap<Identity, u64>,
    free_limit: u64,
    offline: AtomicBool,
    accepted: AtomicUsize,
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::with_free_limit(FREE_UPLOAD_LIMIT)
    }

    pub fn with_free_limit(free_limit: u64) -> Self {
        Self {
            content: DashMap::new(),
            balances: DashMap::new(),
            free_limit,
            offline: AtomicBool::new(false),
            accepted: AtomicUsize::new(0),
        }
    }

    /// Add funds to an identity's balance
    pub fn credit(&self, identity: &Identity, amount: u64) {
        *self.balances.entry(identity.clone()).or_insert(0) += amount;
    }

    pub fn balance(&self, identity: &Identity) -> u64 {
        self.balances.get(identity).map(|b| *b).unwrap_or(0)
    }

    /// Simulate an outage: every call fails with a transport error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of uploads accepted (including re-uploads of existing content)
    pub fn upload_count(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Tags stored with a piece of content
    pub fn tags(&self, id: &ContentId) -> Option<Tags> {
        self.content.get(id).map(|c| c.tags.clone())
    }

    /// Identity that first uploaded a piece of content
    pub fn owner(&self, id: &ContentId) -> Option<Identity> {
        self.content.get(id).map(|c| c.owner.clone())
    }

    fn check_online(&self) -> PublishResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PublishError::Transport("content store offline".into()));
        }
        Ok(())
    }

    fn charge(&self, owner: &Identity, size: u64) -> PublishResult<()> {
        if size <= self.free_limit {
            return Ok(());
        }
        let mut balance = self.balances.entry(owner.clone()).or_insert(0);
        if *balance < size {
            return Err(PublishError::InsufficientBalance {
                required: size,
                available: *balance,
            });
        }
        *balance -= size;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    #[instrument(skip_all, fields(size = upload.size()))]
    async fn upload(&self, upload: SignedUpload) -> PublishResult<UploadReceipt> {
        self.check_online()?;
        if upload.data.is_empty() {
            return Err(PublishError::EmptyArtifact);
        }
        upload.verify()?;

        let content_id = upload.content_id();
        let owner = upload.owner().clone();
        let size = upload.size();

        if let Entry::Vacant(slot) = self.content.entry(content_id) {
            self.charge(&owner, size)?;
            slot.insert(StoredContent {
                data: upload.data,
                tags: upload.tags,
                owner: owner.clone(),
            });
        }
        self.accepted.fetch_add(1, Ordering::SeqCst);

        debug!(content_id = %content_id.short(), owner = %owner.short_id(), "Stored content");
        Ok(UploadReceipt {
            content_id,
            owner,
            size,
        })
    }

    async fn fetch(&self, id: &ContentId) -> PublishResult<Bytes> {
        self.check_online()?;
        self.content
            .get(id)
            .map(|c| c.data.clone())
            .ok_or_else(|| PublishError::NotFound(id.to_string()))
    }

    async fn contains(&self, id: &ContentId) -> PublishResult<bool> {
        self.check_online()?;
        Ok(self.content.contains_key(id))
    }
}
