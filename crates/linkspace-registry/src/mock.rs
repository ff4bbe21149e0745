//! In-memory registry process
//!
//! Implements the registry's semantics as a [`ProcessHandler`] so it can be
//! hosted on a [`MockProcessNetwork`](linkspace_messaging::MockProcessNetwork):
//!
//! - names are unique; registering a name held by someone else is a
//!   `Conflict`, registering one you already hold just updates it
//! - only the owner may `Set-Record` or `Remove-Record`
//! - identities are not unique: one identity may hold several names, and
//!   `GetUsers` by address returns the oldest

use std::collections::BTreeMap;

use linkspace_core::{ContentId, Identity, Name};
use linkspace_messaging::{InboundMessage, ProcessHandler, ProcessResult, Tags};
use serde::Serialize;
use tracing::debug;

use crate::binding::Binding;
use crate::protocol::{
    CURSOR_TAG, ErrorCode, GET_USERS_ACTION, GetUsersPayload, LIMIT_TAG, REGISTER_ACTION,
    REMOVE_RECORD_ACTION, RegisterPayload, RemovePayload, SET_RECORD_ACTION, SUB_DOMAIN_TAG,
    TRANSACTION_ID_TAG, TTL_SECONDS_TAG, UserRecord, UserReply, UsersReply,
};

const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Clone)]
struct Record {
    owner: Identity,
    content_id: ContentId,
    ttl_seconds: Option<u32>,
    /// Registration order
    seq: u64,
}

/// Registry state machine for tests and local development
#[derive(Debug, Default)]
pub struct MockRegistryProcess {
    records: BTreeMap<Name, Record>,
    next_seq: u64,
}

impl MockRegistryProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing binding
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.insert(binding.name, binding.owner, binding.content_id);
        self
    }

    /// TTL set by the last `Set-Record` for `name`
    pub fn ttl_seconds(&self, name: &Name) -> Option<u32> {
        self.records.get(name).and_then(|r| r.ttl_seconds)
    }

    fn insert(&mut self, name: Name, owner: Identity, content_id: ContentId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.records.insert(
            name,
            Record {
                owner,
                content_id,
                ttl_seconds: None,
                seq,
            },
        );
    }

    fn record(name: &Name, record: &Record) -> UserRecord {
        UserRecord {
            undername: name.to_string(),
            transaction_id: record.content_id.to_string(),
            owner: record.owner.to_string(),
        }
    }

    fn user_reply(name: &Name, record: &Record) -> ProcessResult {
        json_reply(&UserReply {
            user: Self::record(name, record),
        })
    }

    fn register(&mut self, from: &Identity, data: &str) -> ProcessResult {
        let Ok(payload) = serde_json::from_str::<RegisterPayload>(data) else {
            return ErrorCode::InvalidName.reply("malformed register payload");
        };
        let name = match Name::parse(&payload.undername) {
            Ok(name) => name,
            Err(e) => return ErrorCode::InvalidName.reply(e.to_string()),
        };
        let Ok(content_id) = payload.transaction_id.parse::<ContentId>() else {
            return ErrorCode::InvalidName.reply("malformed transaction id");
        };

        if let Some(existing) = self.records.get_mut(&name) {
            if existing.owner != *from {
                return ErrorCode::Conflict.reply(format!("{} is taken", name));
            }
            existing.content_id = content_id;
            return Self::user_reply(&name, existing);
        }

        self.insert(name.clone(), from.clone(), content_id);
        debug!(name = %name, owner = %from.short_id(), "Registry: registered");
        match self.records.get(&name) {
            Some(record) => Self::user_reply(&name, record),
            None => ErrorCode::NotFound.reply(name.to_string()),
        }
    }

    fn set_record(&mut self, from: &Identity, tags: &Tags) -> ProcessResult {
        let Some(name) = tags.get(SUB_DOMAIN_TAG).and_then(|n| Name::parse(n).ok()) else {
            return ErrorCode::InvalidName.reply("missing or invalid Sub-Domain");
        };
        let Some(content_id) = tags
            .get(TRANSACTION_ID_TAG)
            .and_then(|id| id.parse::<ContentId>().ok())
        else {
            return ErrorCode::InvalidName.reply("missing or invalid Transaction-Id");
        };
        let ttl_seconds = tags.get(TTL_SECONDS_TAG).and_then(|t| t.parse().ok());

        let Some(record) = self.records.get_mut(&name) else {
            return ErrorCode::NotFound.reply(name.to_string());
        };
        if record.owner != *from {
            return ErrorCode::Unauthorized.reply(name.to_string());
        }
        record.content_id = content_id;
        record.ttl_seconds = ttl_seconds;
        Self::user_reply(&name, record)
    }

    fn remove_record(&mut self, from: &Identity, data: &str) -> ProcessResult {
        let Some(name) = serde_json::from_str::<RemovePayload>(data)
            .ok()
            .and_then(|p| Name::parse(&p.undername).ok())
        else {
            return ErrorCode::InvalidName.reply("missing or invalid undername");
        };

        match self.records.get(&name).map(|r| r.owner == *from) {
            None => ErrorCode::NotFound.reply(name.to_string()),
            Some(false) => ErrorCode::Unauthorized.reply(name.to_string()),
            Some(true) => match self.records.remove(&name) {
                Some(record) => {
                    debug!(name = %name, "Registry: removed");
                    Self::user_reply(&name, &record)
                }
                None => ErrorCode::NotFound.reply(name.to_string()),
            },
        }
    }

    fn get_users(&self, message: &InboundMessage) -> ProcessResult {
        let payload: GetUsersPayload = serde_json::from_str(&message.data).unwrap_or_default();

        if let Some(address) = payload.address {
            return self
                .records
                .iter()
                .filter(|(_, r)| r.owner.as_str() == address)
                .min_by_key(|(_, r)| r.seq)
                .map(|(name, record)| Self::user_reply(name, record))
                .unwrap_or_else(|| ErrorCode::NotFound.reply(&address));
        }

        let limit = message
            .tags
            .get(LIMIT_TAG)
            .and_then(|l| l.parse::<usize>().ok())
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .max(1);
        let after = message.tags.get(CURSOR_TAG);

        let mut remaining = self
            .records
            .iter()
            .filter(|(name, _)| after.is_none_or(|cursor| name.as_str() > cursor))
            .peekable();

        let mut users = BTreeMap::new();
        let mut last = None;
        while users.len() < limit {
            let Some((name, record)) = remaining.next() else {
                break;
            };
            users.insert(name.to_string(), Self::record(name, record));
            last = Some(name.to_string());
        }
        let next_cursor = if remaining.peek().is_some() { last } else { None };

        json_reply(&UsersReply { users, next_cursor })
    }
}

fn json_reply(value: &impl Serialize) -> ProcessResult {
    match serde_json::to_string(value) {
        Ok(data) => ProcessResult::reply(Tags::new(), data),
        Err(e) => ProcessResult {
            error: Some(e.to_string()),
            ..Default::default()
        },
    }
}

impl ProcessHandler for MockRegistryProcess {
    fn handle(&mut self, message: &InboundMessage) -> ProcessResult {
        let Some(from) = message.from.clone() else {
            return ErrorCode::Unauthorized.reply("unsigned message");
        };
        match message.action() {
            Some(REGISTER_ACTION) => self.register(&from, &message.data),
            Some(SET_RECORD_ACTION) => self.set_record(&from, &message.tags),
            Some(REMOVE_RECORD_ACTION) => self.remove_record(&from, &message.data),
            Some(GET_USERS_ACTION) => self.get_users(message),
            other => ProcessResult {
                error: Some(format!("unknown action {:?}", other)),
                ..Default::default()
            },
        }
    }

    fn dry_run(&self, message: &InboundMessage) -> ProcessResult {
        match message.action() {
            Some(GET_USERS_ACTION) => self.get_users(message),
            other => ProcessResult {
                error: Some(format!("{:?} is not a read-only action", other)),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkspace_messaging::{ACTION_TAG, MessageId};

    fn identity(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn message(from: Option<&str>, tags: Tags, data: &str) -> InboundMessage {
        InboundMessage {
            id: MessageId::new("m"),
            from: from.map(identity),
            tags,
            data: data.to_string(),
        }
    }

    fn register(process: &mut MockRegistryProcess, from: &str, name: &str) -> ProcessResult {
        let data = serde_json::to_string(&RegisterPayload {
            undername: name.into(),
            transaction_id: ContentId::from_data(name.as_bytes()).to_string(),
        })
        .unwrap();
        process.handle(&message(
            Some(from),
            Tags::new().with(ACTION_TAG, REGISTER_ACTION),
            &data,
        ))
    }

    #[test]
    fn test_names_are_unique() {
        let mut process = MockRegistryProcess::new();
        assert_eq!(register(&mut process, "alice", "alice-page").error_code(), None);
        assert_eq!(
            register(&mut process, "bob", "alice-page").error_code(),
            Some("Conflict")
        );
        // Same owner again is fine
        assert_eq!(register(&mut process, "alice", "alice-page").error_code(), None);
        assert_eq!(process.records.len(), 1);
    }

    #[test]
    fn test_set_record_is_owner_only() {
        let mut process = MockRegistryProcess::new();
        register(&mut process, "alice", "alice-page");
        let new_id = ContentId::from_data(b"v2").to_string();
        let tags = || {
            Tags::new()
                .with(ACTION_TAG, SET_RECORD_ACTION)
                .with(SUB_DOMAIN_TAG, "alice-page")
                .with(TRANSACTION_ID_TAG, new_id.clone())
                .with(TTL_SECONDS_TAG, "3600")
        };

        let result = process.handle(&message(Some("bob"), tags(), ""));
        assert_eq!(result.error_code(), Some("Unauthorized"));

        let result = process.handle(&message(Some("alice"), tags(), ""));
        let reply: UserReply = result.first_json().unwrap();
        assert_eq!(reply.user.transaction_id, new_id);

        let name = Name::parse("alice-page").unwrap();
        assert_eq!(process.ttl_seconds(&name), Some(3600));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut process = MockRegistryProcess::new();
        assert_eq!(
            register(&mut process, "alice", "No Spaces").error_code(),
            Some("InvalidName")
        );
    }

    #[test]
    fn test_listing_pages_by_name() {
        let mut process = MockRegistryProcess::new();
        for name in ["ccc", "aaa", "bbb"] {
            register(&mut process, "alice", name);
        }

        let page = process.dry_run(&message(
            None,
            Tags::new()
                .with(ACTION_TAG, GET_USERS_ACTION)
                .with(LIMIT_TAG, "2"),
            r#"{"address":null}"#,
        ));
        let reply: UsersReply = page.first_json().unwrap();
        assert_eq!(reply.users.keys().collect::<Vec<_>>(), ["aaa", "bbb"]);
        assert_eq!(reply.next_cursor.as_deref(), Some("bbb"));

        let page = process.dry_run(&message(
            None,
            Tags::new()
                .with(ACTION_TAG, GET_USERS_ACTION)
                .with(LIMIT_TAG, "2")
                .with(CURSOR_TAG, "bbb"),
            r#"{"address":null}"#,
        ));
        let reply: UsersReply = page.first_json().unwrap();
        assert_eq!(reply.users.keys().collect::<Vec<_>>(), ["ccc"]);
        assert_eq!(reply.next_cursor, None);
    }

    #[test]
    fn test_lookup_by_address_returns_oldest() {
        let mut process = MockRegistryProcess::new();
        register(&mut process, "alice", "zzz-first");
        register(&mut process, "alice", "aaa-second");

        let result = process.dry_run(&message(
            None,
            Tags::new().with(ACTION_TAG, GET_USERS_ACTION),
            r#"{"address":"alice"}"#,
        ));
        let reply: UserReply = result.first_json().unwrap();
        assert_eq!(reply.user.undername, "zzz-first");
    }

    #[test]
    fn test_dry_run_cannot_mutate() {
        let process = MockRegistryProcess::new();
        let result = process.dry_run(&message(
            None,
            Tags::new().with(ACTION_TAG, REGISTER_ACTION),
            "{}",
        ));
        assert!(result.error.is_some());
    }
}
