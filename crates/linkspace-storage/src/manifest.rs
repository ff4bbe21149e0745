//! Path manifests for multi-file publication
//!
//! A manifest maps relative paths to the content ids of the files
//! published with it, in the `arweave/paths` 0.2.0 layout gateways
//! understand:
//!
//! ```json
//! {"manifest":"arweave/paths","version":"0.2.0",
//!  "index":{"path":"index.html"},
//!  "paths":{"index.html":{"id":"..."}}}
//! ```
//!
//! Paths are kept in a `BTreeMap`, so serialization is deterministic.

use std::collections::BTreeMap;

use linkspace_core::ContentId;
use serde::{Deserialize, Serialize};

use crate::error::{PublishError, PublishResult};

pub const MANIFEST_KIND: &str = "arweave/paths";
pub const MANIFEST_VERSION: &str = "0.2.0";
pub const MANIFEST_CONTENT_TYPE: &str = "application/x.arweave-manifest+json";

/// Default index document
pub const INDEX_PATH: &str = "index.html";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIndex {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: ContentId,
}

/// Mapping of folder paths to content ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathManifest {
    pub manifest: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<ManifestIndex>,
    pub paths: BTreeMap<String, ManifestEntry>,
}

impl Default for PathManifest {
    fn default() -> Self {
        Self {
            manifest: MANIFEST_KIND.to_string(),
            version: MANIFEST_VERSION.to_string(),
            index: None,
            paths: BTreeMap::new(),
        }
    }
}

impl PathManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path; each path may appear once
    pub fn insert(&mut self, path: &str, id: ContentId) -> PublishResult<()> {
        validate_path(path)?;
        if self.paths.contains_key(path) {
            return Err(PublishError::DuplicatePath(path.to_string()));
        }
        self.paths.insert(path.to_string(), ManifestEntry { id });
        Ok(())
    }

    /// Set the document served at the folder root
    pub fn set_index(&mut self, path: &str) -> PublishResult<()> {
        if !self.paths.contains_key(path) {
            return Err(PublishError::NotFound(path.to_string()));
        }
        self.index = Some(ManifestIndex {
            path: path.to_string(),
        });
        Ok(())
    }

    /// Content id behind a path
    pub fn resolve(&self, path: &str) -> Option<ContentId> {
        self.paths.get(path).map(|entry| entry.id)
    }

    /// Content id of the index document
    pub fn index_id(&self) -> Option<ContentId> {
        self.index.as_ref().and_then(|i| self.resolve(&i.path))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Canonical JSON bytes
    pub fn to_json(&self) -> PublishResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> PublishResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Reject empty, absolute, and parent-escaping paths
pub fn validate_path(path: &str) -> PublishResult<()> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if invalid {
        return Err(PublishError::InvalidPath(path.to_string()));
    }
    Ok(())
}
