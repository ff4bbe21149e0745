//! Directory-backed content store
//!
//! Serves as a local development gateway: uploads land in a sharded
//! directory tree keyed by content id, written atomically and verified
//! against their id on every load.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use linkspace_core::ContentId;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

use crate::error::{PublishError, PublishResult};
use crate::store::ContentStore;
use crate::upload::{SignedUpload, UploadReceipt};

/// Configuration for a [`LocalContentStore`]
#[derive(Debug, Clone)]
pub struct LocalStoreConfig {
    /// Base directory for stored content
    pub base_dir: PathBuf,
    /// Number of subdirectory levels (for sharding)
    pub shard_depth: u8,
    /// Maximum upload size (bytes)
    pub max_size: u64,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./data/content"),
            shard_depth: 2,
            max_size: 50 * 1024 * 1024,
        }
    }
}

impl LocalStoreConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }
}

/// Content-addressed store on the local filesystem
#[derive(Debug)]
pub struct LocalContentStore {
    config: LocalStoreConfig,
}

impl LocalContentStore {
    /// Open (and create if needed) a store rooted at `config.base_dir`
    pub async fn open(config: LocalStoreConfig) -> PublishResult<Self> {
        fs::create_dir_all(&config.base_dir).await?;
        info!(path = %config.base_dir.display(), "Local content store opened");
        Ok(Self { config })
    }

    /// Path for a content id: `<base>/ab/cd/abcdef...`
    fn content_path(&self, id: &ContentId) -> PathBuf {
        let hex = id.to_hex();
        let mut path = self.config.base_dir.clone();
        for level in 0..self.config.shard_depth as usize {
            let start = level * 2;
            if start + 2 <= hex.len() {
                path.push(&hex[start..start + 2]);
            }
        }
        path.push(&hex);
        path
    }

    /// Write through a uniquely named temp file in the target directory
    ///
    /// The temp file is removed if any step fails.
    async fn write_atomic(&self, path: &Path, data: &[u8]) -> PublishResult<()> {
        let parent = path.parent().unwrap_or(&self.config.base_dir);
        fs::create_dir_all(parent).await?;

        let temp_path = tempfile::Builder::new()
            .prefix(".upload-")
            .tempfile_in(parent)?
            .into_temp_path();
        let mut file = File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, path).await?;
        // Renamed away; nothing left to clean up
        if let Err(e) = temp_path.keep() {
            debug!(error = %e, "Temp path already gone");
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    #[instrument(skip_all, fields(size = upload.size()))]
    async fn upload(&self, upload: SignedUpload) -> PublishResult<UploadReceipt> {
        if upload.data.is_empty() {
            return Err(PublishError::EmptyArtifact);
        }
        if upload.size() > self.config.max_size {
            return Err(PublishError::Rejected(format!(
                "upload of {} bytes exceeds local limit of {}",
                upload.size(),
                self.config.max_size
            )));
        }
        upload.verify()?;

        let content_id = upload.content_id();
        let path = self.content_path(&content_id);
        if fs::try_exists(&path).await? {
            debug!(content_id = %content_id.short(), "Content already stored");
        } else {
            self.write_atomic(&path, &upload.data).await?;
            debug!(content_id = %content_id.short(), "Stored content");
        }

        Ok(UploadReceipt {
            content_id,
            owner: upload.owner().clone(),
            size: upload.size(),
        })
    }

    #[instrument(skip(self), fields(content_id = %id.short()))]
    async fn fetch(&self, id: &ContentId) -> PublishResult<Bytes> {
        let path = self.content_path(id);
        let mut file = File::open(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                PublishError::NotFound(id.to_string())
            } else {
                PublishError::Io(e.to_string())
            }
        })?;

        let mut data = Vec::new();
        file.read_to_end(&mut data).await?;

        let actual = ContentId::from_data(&data);
        if actual != *id {
            warn!(expected = %id.to_hex(), actual = %actual.to_hex(), "Content hash mismatch");
            return Err(PublishError::Integrity(id.to_string()));
        }
        Ok(Bytes::from(data))
    }

    async fn contains(&self, id: &ContentId) -> PublishResult<bool> {
        Ok(fs::try_exists(self.content_path(id)).await?)
    }
}
