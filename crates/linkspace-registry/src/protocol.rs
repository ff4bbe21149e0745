//! Registry wire protocol
//!
//! Requests are tagged messages addressed to the registry process. The
//! `Action` tag selects the operation; arguments travel as JSON data or as
//! extra tags depending on the action:
//!
//! | Action          | Arguments                                              |
//! |-----------------|--------------------------------------------------------|
//! | `Register`      | data `{"undername","transactionId"}`                   |
//! | `Set-Record`    | tags `Sub-Domain`, `Transaction-Id`, `TTL-Seconds`     |
//! | `Remove-Record` | data `{"undername"}`                                   |
//! | `GetUsers`      | data `{"address": string or null}`, tags `Cursor`, `Limit` |
//!
//! Replies carry `{"user": {...}}` for single records, `{"users": {...},
//! "nextCursor": ...}` for listings, or an `Error` tag holding one of the
//! [`ErrorCode`]s.

use std::collections::BTreeMap;

use linkspace_core::{ContentId, Identity, Name};
use linkspace_messaging::{ProcessResult, Tags};
use serde::{Deserialize, Serialize};

use crate::binding::Binding;
use crate::error::{RegistryError, RegistryResult};

pub const REGISTER_ACTION: &str = "Register";
pub const SET_RECORD_ACTION: &str = "Set-Record";
pub const REMOVE_RECORD_ACTION: &str = "Remove-Record";
pub const GET_USERS_ACTION: &str = "GetUsers";

pub const SUB_DOMAIN_TAG: &str = "Sub-Domain";
pub const TRANSACTION_ID_TAG: &str = "Transaction-Id";
pub const TTL_SECONDS_TAG: &str = "TTL-Seconds";
pub const CURSOR_TAG: &str = "Cursor";
pub const LIMIT_TAG: &str = "Limit";

/// Record lifetime requested on rebind
pub const DEFAULT_TTL_SECONDS: u32 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub undername: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovePayload {
    pub undername: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUsersPayload {
    pub address: Option<String>,
}

/// One binding as the registry reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub undername: String,
    pub transaction_id: String,
    pub owner: String,
}

impl UserRecord {
    pub fn from_binding(binding: &Binding) -> Self {
        Self {
            undername: binding.name.to_string(),
            transaction_id: binding.content_id.to_string(),
            owner: binding.owner.to_string(),
        }
    }

    /// Check every field and convert to a typed binding
    pub fn into_binding(self) -> RegistryResult<Binding> {
        let name = Name::parse(&self.undername).map_err(|e| {
            RegistryError::InvalidResponse(format!("record name {:?}: {}", self.undername, e))
        })?;
        let owner = Identity::new(self.owner)
            .map_err(|e| RegistryError::InvalidResponse(format!("record owner: {}", e)))?;
        let content_id: ContentId = self
            .transaction_id
            .parse()
            .map_err(|e| RegistryError::InvalidResponse(format!("record content id: {}", e)))?;
        Ok(Binding::new(name, owner, content_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReply {
    pub user: UserRecord,
}

/// One page of the full listing, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersReply {
    pub users: BTreeMap<String, UserRecord>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Failure codes carried in a reply's `Error` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Conflict,
    NotFound,
    Unauthorized,
    InvalidName,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Conflict => "Conflict",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::InvalidName => "InvalidName",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "Conflict" => Some(ErrorCode::Conflict),
            "NotFound" => Some(ErrorCode::NotFound),
            "Unauthorized" => Some(ErrorCode::Unauthorized),
            "InvalidName" => Some(ErrorCode::InvalidName),
            _ => None,
        }
    }

    /// Reply carrying this code and a human-readable detail
    pub fn reply(&self, detail: impl Into<String>) -> ProcessResult {
        ProcessResult::error_reply(self.as_str(), detail)
    }

    fn into_error(self, name: &str, detail: &str) -> RegistryError {
        let name = name.to_string();
        match self {
            ErrorCode::Conflict => RegistryError::Conflict { name },
            ErrorCode::NotFound => RegistryError::NotFound { name },
            ErrorCode::Unauthorized => RegistryError::Unauthorized { name },
            ErrorCode::InvalidName => RegistryError::InvalidName(detail.to_string()),
        }
    }
}

/// A request to the registry process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryRequest {
    Register {
        name: Name,
        content_id: ContentId,
    },
    SetRecord {
        name: Name,
        content_id: ContentId,
        ttl_seconds: u32,
    },
    RemoveRecord {
        name: Name,
    },
    GetUsers {
        address: Option<Identity>,
        cursor: Option<String>,
        limit: Option<usize>,
    },
}

impl RegistryRequest {
    pub fn action(&self) -> &'static str {
        match self {
            RegistryRequest::Register { .. } => REGISTER_ACTION,
            RegistryRequest::SetRecord { .. } => SET_RECORD_ACTION,
            RegistryRequest::RemoveRecord { .. } => REMOVE_RECORD_ACTION,
            RegistryRequest::GetUsers { .. } => GET_USERS_ACTION,
        }
    }

    /// Tags (besides `Action`) and data for the message
    pub fn encode(&self) -> RegistryResult<(Tags, String)> {
        match self {
            RegistryRequest::Register { name, content_id } => {
                let data = serde_json::to_string(&RegisterPayload {
                    undername: name.to_string(),
                    transaction_id: content_id.to_string(),
                })?;
                Ok((Tags::new(), data))
            }
            RegistryRequest::SetRecord {
                name,
                content_id,
                ttl_seconds,
            } => {
                let tags = Tags::new()
                    .with(SUB_DOMAIN_TAG, name.as_str())
                    .with(TRANSACTION_ID_TAG, content_id.to_string())
                    .with(TTL_SECONDS_TAG, ttl_seconds.to_string());
                Ok((tags, String::new()))
            }
            RegistryRequest::RemoveRecord { name } => {
                let data = serde_json::to_string(&RemovePayload {
                    undername: name.to_string(),
                })?;
                Ok((Tags::new(), data))
            }
            RegistryRequest::GetUsers {
                address,
                cursor,
                limit,
            } => {
                let mut tags = Tags::new();
                if let Some(cursor) = cursor {
                    tags.push(CURSOR_TAG, cursor.clone());
                }
                if let Some(limit) = limit {
                    tags.push(LIMIT_TAG, limit.to_string());
                }
                let data = serde_json::to_string(&GetUsersPayload {
                    address: address.as_ref().map(|a| a.to_string()),
                })?;
                Ok((tags, data))
            }
        }
    }
}

/// Fail with the registry's error if the reply carries one
///
/// `name` labels the error; unknown codes become [`RegistryError::Rejected`].
pub fn check_reply(name: &str, result: &ProcessResult) -> RegistryResult<()> {
    let Some(code) = result.error_code() else {
        return Ok(());
    };
    let detail = result.first().map(|m| m.data.as_str()).unwrap_or_default();
    match ErrorCode::parse(code) {
        Some(code) => Err(code.into_error(name, detail)),
        None => Err(RegistryError::Rejected(code.to_string())),
    }
}

/// Decode a single-record reply
pub fn decode_user(name: &str, result: &ProcessResult) -> RegistryResult<Binding> {
    check_reply(name, result)?;
    let reply: UserReply = result.first_json()?;
    reply.user.into_binding()
}
