//! Signed uploads
//!
//! An upload is the content bytes plus tags, signed by the uploader over
//! the content id and the tags. Stores verify the signature before
//! accepting the bytes and charge the signer for non-free uploads.

use bytes::Bytes;
use linkspace_core::{ContentId, Identity, SignedMessage, Wallet};
use linkspace_messaging::Tags;
use serde::{Deserialize, Serialize};

use crate::error::{PublishError, PublishResult};

/// Uploads at or below this size need no balance (100 KiB)
pub const FREE_UPLOAD_LIMIT: u64 = 100 * 1024;

/// Tag naming the content type of an upload
pub const CONTENT_TYPE_TAG: &str = "Content-Type";

#[derive(Serialize)]
struct UploadPayload<'a> {
    content_id: &'a ContentId,
    tags: &'a Tags,
}

fn upload_payload(content_id: &ContentId, tags: &Tags) -> PublishResult<Vec<u8>> {
    Ok(postcard::to_allocvec(&UploadPayload { content_id, tags })?)
}

/// Bytes plus tags, signed by the uploader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUpload {
    pub data: Bytes,
    pub tags: Tags,
    pub signature: SignedMessage,
}

impl SignedUpload {
    /// Sign `data` and `tags` with `wallet`
    pub fn sign(data: Bytes, tags: Tags, wallet: &dyn Wallet) -> PublishResult<Self> {
        let content_id = ContentId::from_data(&data);
        let payload = upload_payload(&content_id, &tags)?;
        let signature = wallet.sign(&payload)?;
        Ok(Self {
            data,
            tags,
            signature,
        })
    }

    /// Check the signature against the bytes actually carried
    pub fn verify(&self) -> PublishResult<()> {
        let payload = upload_payload(&self.content_id(), &self.tags)?;
        self.signature
            .verify(&payload)
            .map_err(|e| PublishError::Rejected(e.to_string()))
    }

    pub fn content_id(&self) -> ContentId {
        ContentId::from_data(&self.data)
    }

    pub fn owner(&self) -> &Identity {
        &self.signature.owner
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn content_type(&self) -> Option<&str> {
        self.tags.get(CONTENT_TYPE_TAG)
    }
}

/// What a store reports after accepting an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub content_id: ContentId,
    pub owner: Identity,
    pub size: u64,
}
