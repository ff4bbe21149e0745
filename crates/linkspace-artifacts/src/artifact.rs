use std::fmt;

use bytes::Bytes;
use linkspace_core::ContentId;

/// Content type of rendered pages
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// An immutable rendered byte sequence ready for publishing
///
/// The BLAKE3 digest is computed once at construction. Because content
/// ids are BLAKE3 hashes too, [`Artifact::content_id`] predicts the id the
/// store will assign, which lets callers skip republishing unchanged pages.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Bytes,
    content_type: String,
    digest: [u8; 32],
}

impl Artifact {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        let bytes = bytes.into();
        let digest = *blake3::hash(&bytes).as_bytes();
        Self {
            bytes,
            content_type: content_type.into(),
            digest,
        }
    }

    /// An HTML page
    pub fn html(page: String) -> Self {
        Self::new(page.into_bytes(), HTML_CONTENT_TYPE)
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The bytes as text, if they are valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn short_digest(&self) -> String {
        hex::encode(&self.digest[..4])
    }

    /// The content id a content-addressed store will assign these bytes
    pub fn content_id(&self) -> ContentId {
        ContentId::new(self.digest)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .field("digest", &self.short_digest())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_matches_content_id() {
        let artifact = Artifact::html("<p>hi</p>".to_string());
        assert_eq!(artifact.content_id(), ContentId::from_data(b"<p>hi</p>"));
        assert_eq!(artifact.content_type(), "text/html");
        assert_eq!(artifact.short_digest().len(), 8);
    }

    #[test]
    fn test_empty_and_binary() {
        assert!(Artifact::new(Vec::new(), "text/plain").is_empty());
        let binary = Artifact::new(vec![0xff, 0xfe], "application/octet-stream");
        assert!(binary.as_str().is_none());
        assert_eq!(binary.len(), 2);
    }
}
