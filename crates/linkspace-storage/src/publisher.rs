//! Content publisher
//!
//! Uploads artifacts to a [`ContentStore`] and returns stable content ids.
//!
//! ## Publish modes
//!
//! - [`PublishMode::Wallet`]: the connected wallet signs (and pays for) the
//!   upload
//! - [`PublishMode::Anonymous`]: a throwaway key is generated for a single
//!   publish, signs it, and is dropped before the call returns. The key is
//!   never reused.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use linkspace_artifacts::Artifact;
use linkspace_core::{ContentId, Identity, KeypairWallet, Wallet};
use linkspace_messaging::{DEFAULT_APP_NAME, Tags};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::error::{PublishError, PublishResult};
use crate::manifest::{INDEX_PATH, MANIFEST_CONTENT_TYPE, PathManifest};
use crate::store::ContentStore;
use crate::upload::{CONTENT_TYPE_TAG, SignedUpload};

/// Default bound on a single upload
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Who signs uploads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublishMode {
    /// The connected wallet
    #[default]
    Wallet,
    /// A disposable key generated per publish
    Anonymous,
}

/// Outcome of publishing one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub content_id: ContentId,
    /// The identity that signed the upload (disposable in anonymous mode)
    pub owner: Identity,
    pub size: u64,
    pub mode: PublishMode,
}

/// One file of a folder publish
#[derive(Debug, Clone)]
pub struct FolderFile {
    /// Relative path inside the folder
    pub path: String,
    pub artifact: Artifact,
}

impl FolderFile {
    pub fn new(path: impl Into<String>, artifact: Artifact) -> Self {
        Self {
            path: path.into(),
            artifact,
        }
    }
}

/// Outcome of publishing a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderReceipt {
    /// Content id of the manifest itself; resolving it serves the folder
    pub manifest_id: ContentId,
    pub manifest: PathManifest,
    /// Content id of every file by path
    pub files: BTreeMap<String, ContentId>,
    pub owner: Identity,
}

/// The signer for one publish
///
/// Anonymous keys live exactly as long as this value.
enum Signer<'a> {
    Connected(&'a dyn Wallet),
    Ephemeral(KeypairWallet),
}

impl Signer<'_> {
    fn wallet(&self) -> &dyn Wallet {
        match self {
            Signer::Connected(wallet) => *wallet,
            Signer::Ephemeral(wallet) => wallet,
        }
    }
}

/// Publishes artifacts to a content store
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn ContentStore>,
    wallet: Arc<dyn Wallet>,
    mode: PublishMode,
    app_name: String,
    upload_timeout: Duration,
}

impl Publisher {
    pub fn new(store: Arc<dyn ContentStore>, wallet: Arc<dyn Wallet>, mode: PublishMode) -> Self {
        Self {
            store,
            wallet,
            mode,
            app_name: DEFAULT_APP_NAME.to_string(),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Fail uploads the store has not answered within `timeout`
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Override the `App-Name` tag on uploads
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn mode(&self) -> PublishMode {
        self.mode
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    fn signer(&self) -> PublishResult<Signer<'_>> {
        match self.mode {
            PublishMode::Wallet => {
                // Fail fast before any bytes move
                self.wallet.identity()?;
                Ok(Signer::Connected(self.wallet.as_ref()))
            }
            PublishMode::Anonymous => Ok(Signer::Ephemeral(KeypairWallet::generate())),
        }
    }

    fn tags(&self, content_type: &str) -> Tags {
        Tags::new()
            .with(CONTENT_TYPE_TAG, content_type)
            .with("App-Name", self.app_name.clone())
    }

    async fn upload(&self, signer: &Signer<'_>, artifact: &Artifact) -> PublishResult<ContentId> {
        if artifact.is_empty() {
            return Err(PublishError::EmptyArtifact);
        }
        let upload = SignedUpload::sign(
            artifact.bytes().clone(),
            self.tags(artifact.content_type()),
            signer.wallet(),
        )?;
        let started = Instant::now();
        let receipt = tokio::time::timeout(self.upload_timeout, self.store.upload(upload))
            .await
            .map_err(|_| {
                let waited_ms = started.elapsed().as_millis() as u64;
                warn!(waited_ms, "Upload timed out");
                PublishError::Timeout { waited_ms }
            })??;
        Ok(receipt.content_id)
    }

    /// Publish a single artifact
    #[instrument(skip_all, fields(size = artifact.len(), mode = ?self.mode))]
    pub async fn publish_artifact(&self, artifact: &Artifact) -> PublishResult<PublishReceipt> {
        if artifact.is_empty() {
            return Err(PublishError::EmptyArtifact);
        }
        let signer = self.signer()?;
        let owner = signer.wallet().identity()?;
        let content_id = self.upload(&signer, artifact).await?;

        info!(content_id = %content_id, owner = %owner.short_id(), "Published artifact");
        Ok(PublishReceipt {
            content_id,
            owner,
            size: artifact.len() as u64,
            mode: self.mode,
        })
    }

    /// Publish several files plus a manifest tying their paths together
    ///
    /// All files and the manifest are signed by the same signer. If a file
    /// named `index.html` is present it becomes the folder index.
    #[instrument(skip_all, fields(files = files.len(), mode = ?self.mode))]
    pub async fn publish_folder(&self, files: Vec<FolderFile>) -> PublishResult<FolderReceipt> {
        if files.is_empty() {
            return Err(PublishError::EmptyArtifact);
        }

        // Validate everything before uploading anything
        let mut planned = PathManifest::new();
        for file in &files {
            if file.artifact.is_empty() {
                return Err(PublishError::EmptyArtifact);
            }
            planned.insert(&file.path, file.artifact.content_id())?;
        }

        let signer = self.signer()?;
        let owner = signer.wallet().identity()?;

        // The manifest points at the ids the store assigned
        let mut manifest = PathManifest::new();
        let mut ids = BTreeMap::new();
        for file in &files {
            let id = self.upload(&signer, &file.artifact).await?;
            if planned.resolve(&file.path) != Some(id) {
                warn!(path = %file.path, content_id = %id, "Store assigned an unexpected id");
            }
            debug!(path = %file.path, content_id = %id.short(), "Uploaded folder file");
            manifest.insert(&file.path, id)?;
            ids.insert(file.path.clone(), id);
        }

        if manifest.resolve(INDEX_PATH).is_some() {
            manifest.set_index(INDEX_PATH)?;
        }
        let manifest_artifact = Artifact::new(manifest.to_json()?, MANIFEST_CONTENT_TYPE);
        let manifest_id = self.upload(&signer, &manifest_artifact).await?;

        info!(manifest_id = %manifest_id, owner = %owner.short_id(), "Published folder");
        Ok(FolderReceipt {
            manifest_id,
            manifest,
            files: ids,
            owner,
        })
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("mode", &self.mode)
            .field("app_name", &self.app_name)
            .finish_non_exhaustive()
    }
}
