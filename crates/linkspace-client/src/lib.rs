//! Name-claim workflow for Linkspace
//!
//! Turns an edited profile page into a shareable name: the page is rendered
//! to a static artifact, published to a content-addressed store, and the
//! chosen name is bound to the resulting content id on the name registry.
//!
//! # Quick Start
//!
//! ```ignore
//! use linkspace_client::{ClientBuilder, Preset};
//! use linkspace_artifacts::Document;
//!
//! let workflow = ClientBuilder::new()
//!     .with_preset(Preset::Interactive)
//!     .from_env()
//!     .build(wallet, transport, store);
//!
//! workflow.reconcile().await?;
//! let receipt = workflow.claim("John Doe", &Document::starter("John Doe")).await?;
//! println!("share: {}", receipt.links.web);
//! ```
//!
//! One identity holds at most one name: a claim first asks the registry
//! for the identity's binding and returns it if present. Runs for the same
//! identity are mutually exclusive; a second one fails with
//! [`ClaimError::AlreadyRunning`].

pub mod config;
pub mod error;
pub mod links;
pub mod retry;
pub mod session;
pub mod workflow;

pub use config::{
    ClientBuilder, ClientConfig, DEFAULT_GATEWAY, DEFAULT_NAME_SUFFIX, DEFAULT_REGISTRY_PROCESS,
    Preset,
};
pub use error::{ClaimError, ClaimResult};
pub use links::ShareLinks;
pub use retry::RetryPolicy;
pub use session::{RunGuard, SessionContext, SessionSnapshot};
pub use workflow::{Availability, ClaimOutcome, ClaimReceipt, ClaimState, ClaimWorkflow};

// Re-export the types callers need alongside the workflow
pub use linkspace_artifacts::Document;
pub use linkspace_core::{ContentId, Identity, Name, Wallet};
pub use linkspace_registry::{Binding, RemoveOutcome};
pub use linkspace_storage::PublishMode;
