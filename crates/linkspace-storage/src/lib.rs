//! # Linkspace Storage
//!
//! Publishing rendered artifacts to content-addressed storage.
//!
//! ## Components
//!
//! - [`ContentStore`]: trait for content-addressed stores
//! - [`InMemoryContentStore`]: in-memory store with free-tier and balance rules
//! - [`LocalContentStore`]: sharded directory store for local gateways
//! - [`PathManifest`]: path-to-id manifest for folder publishes
//! - [`Publisher`]: signs and uploads artifacts in wallet or anonymous mode
//!
//! Published content is immutable. A failed workflow step later on never
//! undoes a publish; the content simply stays unreferenced.

pub mod error;
pub mod local;
pub mod manifest;
pub mod memory;
pub mod publisher;
pub mod store;
pub mod upload;

pub use error::{PublishError, PublishResult};
pub use local::{LocalContentStore, LocalStoreConfig};
pub use manifest::{
    INDEX_PATH, MANIFEST_CONTENT_TYPE, ManifestEntry, ManifestIndex, PathManifest, validate_path,
};
pub use memory::InMemoryContentStore;
pub use publisher::{
    DEFAULT_UPLOAD_TIMEOUT, FolderFile, FolderReceipt, PublishMode, PublishReceipt, Publisher,
};
pub use store::ContentStore;
pub use upload::{CONTENT_TYPE_TAG, FREE_UPLOAD_LIMIT, SignedUpload, UploadReceipt};
