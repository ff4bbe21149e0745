//! Message types exchanged with remote processes
//!
//! Every remote call is a tagged message `{process, action, tags, data}`.
//! Mutating calls travel as signed [`DataItem`]s; read-only evaluation uses
//! an unsigned [`DryRunRequest`]. Outcomes come back as [`ProcessResult`]s,
//! correlated by [`MessageId`].

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use linkspace_core::{Identity, SignedMessage};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{MessagingError, MessagingResult};

/// Tag carrying the action name on every message
pub const ACTION_TAG: &str = "Action";

/// Tag a process sets on its reply when a request failed
pub const ERROR_TAG: &str = "Error";

/// Identifier of a remote process
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(String);

impl ProcessId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a sent message, used to correlate its result
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the id of a signed message from its signature
    pub fn from_signature(signature: &SignedMessage) -> Self {
        Self(URL_SAFE_NO_PAD.encode(signature.digest()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque pagination token for result listings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single name/value tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of tags
///
/// Order is preserved because it is part of the signed payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Tag::new(name, value));
    }

    pub fn extend(&mut self, other: Tags) {
        self.0.extend(other.0);
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    pub fn action(&self) -> Option<&str> {
        self.get(ACTION_TAG)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collapse into a map (later tags win)
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|t| (t.name.clone(), t.value.clone()))
            .collect()
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<T: IntoIterator<Item = Tag>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The exact bytes a wallet signs for a data item
#[derive(Serialize)]
struct SigningPayload<'a> {
    process: &'a ProcessId,
    owner: &'a Identity,
    anchor: &'a [u8; 32],
    tags: &'a Tags,
    data: &'a str,
}

/// Build the signing payload for a message
pub fn signing_payload(
    process: &ProcessId,
    owner: &Identity,
    anchor: &[u8; 32],
    tags: &Tags,
    data: &str,
) -> MessagingResult<Vec<u8>> {
    let payload = SigningPayload {
        process,
        owner,
        anchor,
        tags,
        data,
    };
    Ok(postcard::to_allocvec(&payload)?)
}

/// A signed message addressed to a process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    pub id: MessageId,
    pub process: ProcessId,
    /// Random nonce so identical requests still get distinct ids
    pub anchor: [u8; 32],
    pub tags: Tags,
    pub data: String,
    pub signature: SignedMessage,
}

impl DataItem {
    pub fn owner(&self) -> &Identity {
        &self.signature.owner
    }

    /// Recompute the signing payload and check the signature over it
    pub fn verify(&self) -> MessagingResult<()> {
        let payload = signing_payload(
            &self.process,
            &self.signature.owner,
            &self.anchor,
            &self.tags,
            &self.data,
        )?;
        self.signature
            .verify(&payload)
            .map_err(|e| MessagingError::Rejected(e.to_string()))?;
        if MessageId::from_signature(&self.signature) != self.id {
            return Err(MessagingError::Rejected("message id mismatch".into()));
        }
        Ok(())
    }
}

/// An unsigned, read-only evaluation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunRequest {
    pub process: ProcessId,
    pub tags: Tags,
    pub data: String,
}

/// A message emitted by a process while handling a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub target: Option<String>,
    pub tags: Tags,
    pub data: String,
}

impl OutboxMessage {
    pub fn new(tags: Tags, data: impl Into<String>) -> Self {
        Self {
            target: None,
            tags,
            data: data.into(),
        }
    }
}

/// Outcome of a process handling one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// The message this result answers
    pub message_id: Option<MessageId>,
    /// Messages the process emitted
    pub messages: Vec<OutboxMessage>,
    /// Evaluation error raised by the process, if any
    pub error: Option<String>,
}

impl ProcessResult {
    /// A result with a single reply message
    pub fn reply(tags: Tags, data: impl Into<String>) -> Self {
        Self {
            message_id: None,
            messages: vec![OutboxMessage::new(tags, data)],
            error: None,
        }
    }

    /// A result carrying an `Error` tag
    pub fn error_reply(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::reply(Tags::new().with(ERROR_TAG, code), detail)
    }

    pub fn first(&self) -> Option<&OutboxMessage> {
        self.messages.first()
    }

    /// Value of the `Error` tag on the first reply, or the process error
    pub fn error_code(&self) -> Option<&str> {
        self.first()
            .and_then(|m| m.tags.get(ERROR_TAG))
            .or(self.error.as_deref())
    }

    /// Decode the first reply's data as JSON
    pub fn first_json<T: DeserializeOwned>(&self) -> MessagingResult<T> {
        let message = self
            .first()
            .ok_or_else(|| MessagingError::InvalidResult("result has no messages".into()))?;
        Ok(serde_json::from_str(&message.data)?)
    }

    /// Read the first reply as JSON, falling back to its tags
    ///
    /// Processes that answer with tags only (no data) still produce a
    /// usable object.
    pub fn first_value(&self) -> Option<serde_json::Value> {
        let message = self.first()?;
        if !message.data.is_empty() {
            if let Ok(value) = serde_json::from_str(&message.data) {
                return Some(value);
            }
        }
        let map: serde_json::Map<String, serde_json::Value> = message
            .tags
            .iter()
            .map(|t| (t.name.clone(), serde_json::Value::String(t.value.clone())))
            .collect();
        Some(serde_json::Value::Object(map))
    }
}

/// One page of a process's result feed, sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsPage {
    /// Cursor to continue from; unchanged when the page is empty
    pub cursor: Option<Cursor>,
    pub results: Vec<ProcessResult>,
}

impl ResultsPage {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
