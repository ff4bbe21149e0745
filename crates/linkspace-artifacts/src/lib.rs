//! # Linkspace Artifacts
//!
//! Profile documents and the renderer that turns them into static pages.
//!
//! - [`Document`]: profile header, item grid and background, with
//!   [`ItemContent`] as a closed set of item kinds
//! - [`ArtifactBuilder`]: deterministic document-to-HTML rendering
//! - [`Artifact`]: the immutable rendered bytes plus their digest
//! - [`EmbedKind`]: recognition of YouTube and Tenor embed urls

pub mod artifact;
pub mod builder;
pub mod document;
pub mod embed;
pub mod error;

pub use artifact::{Artifact, HTML_CONTENT_TYPE};
pub use builder::{ArtifactBuilder, escape_html, social_icon_class};
pub use document::{
    Background, DEFAULT_BACKGROUND_COLOR, Document, Item, ItemContent, ItemStyle, MAX_SPAN,
    MIN_SPAN, Profile, Shape,
};
pub use embed::EmbedKind;
pub use error::{ArtifactError, ArtifactResult};
