//! Content store abstraction

use async_trait::async_trait;
use bytes::Bytes;
use linkspace_core::ContentId;

use crate::error::PublishResult;
use crate::upload::{SignedUpload, UploadReceipt};

/// A content-addressed store
///
/// Content is immutable once stored: the store never mutates or deletes
/// published bytes, and uploading the same bytes twice yields the same id.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a signed upload and return its content id
    async fn upload(&self, upload: SignedUpload) -> PublishResult<UploadReceipt>;

    /// Load content by id, verifying it against the id
    async fn fetch(&self, id: &ContentId) -> PublishResult<Bytes>;

    /// Whether content with this id is stored
    async fn contains(&self, id: &ContentId) -> PublishResult<bool>;
}
