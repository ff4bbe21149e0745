use thiserror::Error;

/// Errors raised while turning an editor snapshot into an artifact
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    #[error("unsupported item type {tag:?} on item {id}")]
    UnsupportedItem { id: String, tag: String },

    #[error("item {id} is missing required field {field:?}")]
    MissingField { id: String, field: &'static str },

    #[error("item {id} has invalid {dimension} {value} (expected 1..=4)")]
    InvalidDimension {
        id: String,
        dimension: &'static str,
        value: i64,
    },

    #[error("unknown shape {shape:?} on item {id}")]
    UnknownShape { id: String, shape: String },

    #[error("unknown background type {0:?}")]
    UnknownBackground(String),

    #[error("malformed snapshot: {0}")]
    InvalidSnapshot(String),
}

impl From<serde_json::Error> for ArtifactError {
    fn from(e: serde_json::Error) -> Self {
        ArtifactError::InvalidSnapshot(e.to_string())
    }
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;
