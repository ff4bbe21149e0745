//! # Linkspace Messaging
//!
//! Request/result messaging with remote processes.
//!
//! A process is a remote state machine addressed by a [`ProcessId`]. Clients
//! talk to it with tagged messages: mutating requests are signed by the
//! connected [`Wallet`](linkspace_core::Wallet) and posted as
//! [`DataItem`]s, and their outcomes are fetched later by message id.
//! Read-only queries go through [`MessagingClient::dry_run`] and need no
//! signer.
//!
//! ## Example
//!
//! ```rust,ignore
//! use linkspace_messaging::{MessagingClient, MessagingConfig, ProcessId, Tags};
//!
//! let client = MessagingClient::new(transport, wallet, MessagingConfig::default());
//! let registry = ProcessId::new("registry");
//! let (id, result) = client
//!     .send_and_await(&registry, "Register", Tags::new(), r#"{"undername":"john-doe"}"#)
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod mock;
pub mod transport;

pub use client::MessagingClient;
pub use config::{DEFAULT_APP_NAME, DEFAULT_APP_VERSION, MessagingConfig};
pub use error::{MessagingError, MessagingResult};
pub use message::{
    ACTION_TAG, Cursor, DataItem, DryRunRequest, ERROR_TAG, MessageId, OutboxMessage, ProcessId,
    ProcessResult, ResultsPage, Tag, Tags, signing_payload,
};
pub use mock::{InboundMessage, MockProcessNetwork, ProcessHandler};
pub use transport::ProcessTransport;
