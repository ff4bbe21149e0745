//! Publisher behavior against the in-memory and local stores

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use linkspace_artifacts::{Artifact, ArtifactBuilder, Document};
use linkspace_core::{ContentId, DisconnectedWallet, KeypairWallet, Wallet};
use linkspace_storage::{
    ContentStore, FolderFile, InMemoryContentStore, LocalContentStore, LocalStoreConfig,
    PathManifest, PublishError, PublishMode, PublishResult, Publisher, SignedUpload,
    UploadReceipt,
};

/// Store that accepts uploads but never answers
struct HangingStore;

#[async_trait]
impl ContentStore for HangingStore {
    async fn upload(&self, _upload: SignedUpload) -> PublishResult<UploadReceipt> {
        std::future::pending().await
    }

    async fn fetch(&self, id: &ContentId) -> PublishResult<Bytes> {
        Err(PublishError::NotFound(id.to_string()))
    }

    async fn contains(&self, _id: &ContentId) -> PublishResult<bool> {
        Ok(false)
    }
}

/// Gateway that files content under ids of its own
#[derive(Default)]
struct ReaddressingStore {
    inner: InMemoryContentStore,
}

impl ReaddressingStore {
    fn assigned(id: &ContentId) -> ContentId {
        ContentId::from_data(format!("gateway:{}", id).as_bytes())
    }
}

#[async_trait]
impl ContentStore for ReaddressingStore {
    async fn upload(&self, upload: SignedUpload) -> PublishResult<UploadReceipt> {
        let mut receipt = self.inner.upload(upload).await?;
        receipt.content_id = Self::assigned(&receipt.content_id);
        Ok(receipt)
    }

    async fn fetch(&self, id: &ContentId) -> PublishResult<Bytes> {
        self.inner.fetch(id).await
    }

    async fn contains(&self, id: &ContentId) -> PublishResult<bool> {
        self.inner.contains(id).await
    }
}

fn page() -> Artifact {
    ArtifactBuilder::new().build(&Document::starter("Ada"))
}

#[tokio::test]
async fn test_wallet_publish_returns_content_id_of_bytes() {
    let store = Arc::new(InMemoryContentStore::new());
    let wallet = Arc::new(KeypairWallet::generate());
    let publisher = Publisher::new(store.clone(), wallet.clone(), PublishMode::Wallet);

    let artifact = page();
    let receipt = publisher.publish_artifact(&artifact).await.unwrap();

    assert_eq!(receipt.content_id, artifact.content_id());
    assert_eq!(receipt.owner, wallet.identity().unwrap());
    let stored = store.fetch(&receipt.content_id).await.unwrap();
    assert_eq!(&stored[..], artifact.as_bytes());

    let tags = store.tags(&receipt.content_id).unwrap();
    assert_eq!(tags.get("Content-Type"), Some("text/html"));
    assert_eq!(tags.get("App-Name"), Some("Linkspace"));
}

#[tokio::test]
async fn test_wallet_mode_without_wallet_uploads_nothing() {
    let store = Arc::new(InMemoryContentStore::new());
    let publisher = Publisher::new(store.clone(), Arc::new(DisconnectedWallet), PublishMode::Wallet);

    let err = publisher.publish_artifact(&page()).await.unwrap_err();
    assert_eq!(err, PublishError::NotAuthenticated);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_anonymous_mode_uses_fresh_key_each_time() {
    let store = Arc::new(InMemoryContentStore::new());
    let publisher = Publisher::new(store.clone(), Arc::new(DisconnectedWallet), PublishMode::Anonymous);

    let mut first_page = Document::starter("One");
    first_page.profile.bio = "first".into();
    let a = publisher
        .publish_artifact(&ArtifactBuilder::new().build(&first_page))
        .await
        .unwrap();
    let b = publisher
        .publish_artifact(&ArtifactBuilder::new().build(&Document::starter("Two")))
        .await
        .unwrap();

    assert_eq!(a.mode, PublishMode::Anonymous);
    assert_ne!(a.owner, b.owner);
    assert_eq!(store.owner(&a.content_id), Some(a.owner.clone()));
}

#[tokio::test]
async fn test_empty_artifact_is_rejected() {
    let store = Arc::new(InMemoryContentStore::new());
    let publisher = Publisher::new(store.clone(), Arc::new(KeypairWallet::generate()), PublishMode::Wallet);

    let err = publisher
        .publish_artifact(&Artifact::new(Vec::new(), "text/html"))
        .await
        .unwrap_err();
    assert_eq!(err, PublishError::EmptyArtifact);
    assert_eq!(store.upload_count(), 0);
}

#[tokio::test]
async fn test_oversized_upload_needs_funding() {
    let store = Arc::new(InMemoryContentStore::with_free_limit(16));
    let wallet = Arc::new(KeypairWallet::generate());
    let publisher = Publisher::new(store.clone(), wallet.clone(), PublishMode::Wallet);

    let artifact = page();
    let err = publisher.publish_artifact(&artifact).await.unwrap_err();
    assert!(matches!(err, PublishError::InsufficientBalance { available: 0, .. }));

    store.credit(&wallet.identity().unwrap(), artifact.len() as u64);
    assert!(publisher.publish_artifact(&artifact).await.is_ok());
    assert_eq!(store.balance(&wallet.identity().unwrap()), 0);
}

#[tokio::test]
async fn test_store_outage_is_retryable() {
    let store = Arc::new(InMemoryContentStore::new());
    let publisher = Publisher::new(store.clone(), Arc::new(KeypairWallet::generate()), PublishMode::Wallet);

    store.set_offline(true);
    let err = publisher.publish_artifact(&page()).await.unwrap_err();
    assert!(err.is_retryable());

    store.set_offline(false);
    assert!(publisher.publish_artifact(&page()).await.is_ok());
}

#[tokio::test]
async fn test_folder_publish_builds_manifest() {
    let store = Arc::new(InMemoryContentStore::new());
    let publisher = Publisher::new(store.clone(), Arc::new(KeypairWallet::generate()), PublishMode::Anonymous);

    let index = page();
    let css = Artifact::new(b"body{}".to_vec(), "text/css");
    let receipt = publisher
        .publish_folder(vec![
            FolderFile::new("style.css", css.clone()),
            FolderFile::new("index.html", index.clone()),
        ])
        .await
        .unwrap();

    assert_eq!(receipt.files["index.html"], index.content_id());
    assert_eq!(receipt.files["style.css"], css.content_id());
    assert_eq!(receipt.manifest.index_id(), Some(index.content_id()));

    let stored = store.fetch(&receipt.manifest_id).await.unwrap();
    let manifest = PathManifest::from_json(&stored).unwrap();
    assert_eq!(manifest, receipt.manifest);
    assert_eq!(
        store.tags(&receipt.manifest_id).unwrap().get("Content-Type"),
        Some("application/x.arweave-manifest+json")
    );
    assert_eq!(store.owner(&receipt.manifest_id), Some(receipt.owner.clone()));
    assert_eq!(store.owner(&index.content_id()), Some(receipt.owner));
}

#[tokio::test]
async fn test_folder_validation_happens_before_upload() {
    let store = Arc::new(InMemoryContentStore::new());
    let publisher = Publisher::new(store.clone(), Arc::new(KeypairWallet::generate()), PublishMode::Wallet);

    let err = publisher
        .publish_folder(vec![
            FolderFile::new("index.html", page()),
            FolderFile::new("index.html", page()),
        ])
        .await
        .unwrap_err();
    assert_eq!(err, PublishError::DuplicatePath("index.html".into()));

    let err = publisher
        .publish_folder(vec![
            FolderFile::new("index.html", page()),
            FolderFile::new("empty.txt", Artifact::new(Vec::new(), "text/plain")),
        ])
        .await
        .unwrap_err();
    assert_eq!(err, PublishError::EmptyArtifact);

    assert_eq!(publisher.publish_folder(Vec::new()).await.unwrap_err(), PublishError::EmptyArtifact);
    assert_eq!(store.upload_count(), 0);
}

#[tokio::test]
async fn test_publish_to_local_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalContentStore::open(LocalStoreConfig::new(dir.path())).await.unwrap());
    let publisher = Publisher::new(store.clone(), Arc::new(KeypairWallet::generate()), PublishMode::Wallet);

    let artifact = page();
    let receipt = publisher.publish_artifact(&artifact).await.unwrap();
    let stored = store.fetch(&receipt.content_id).await.unwrap();
    assert_eq!(&stored[..], artifact.as_bytes());
}

#[tokio::test]
async fn test_hung_upload_times_out() {
    let publisher = Publisher::new(
        Arc::new(HangingStore),
        Arc::new(KeypairWallet::generate()),
        PublishMode::Wallet,
    )
    .with_upload_timeout(Duration::from_millis(50));

    let outcome = tokio::time::timeout(Duration::from_secs(2), publisher.publish_artifact(&page()))
        .await
        .expect("upload must be bounded");
    let err = outcome.unwrap_err();
    assert!(matches!(err, PublishError::Timeout { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_folder_manifest_uses_assigned_ids() {
    let store = Arc::new(ReaddressingStore::default());
    let publisher = Publisher::new(store.clone(), Arc::new(KeypairWallet::generate()), PublishMode::Wallet);

    let index = page();
    let receipt = publisher
        .publish_folder(vec![FolderFile::new("index.html", index.clone())])
        .await
        .unwrap();

    let assigned = ReaddressingStore::assigned(&index.content_id());
    assert_eq!(receipt.files["index.html"], assigned);
    assert_eq!(receipt.manifest.resolve("index.html"), Some(assigned));
    assert_eq!(receipt.manifest.index_id(), Some(assigned));
}
