//! # Message Ingest
//!
//! Turns raw service messages into transcript records.
//!
//! ```text
//! RawMessage ─► author lookup (cache → bot name → users.info → "unknown")
//!            ─► attachment fields, last field first
//!            ─► the message itself, with a short ID
//! ```
//!
//! A raw message with `k` attachment fields yields `k + 1` records; the
//! message's own text is always the last one.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use log::{debug, warn};

use crate::core::message::{Message, MessageKind, ShortIds};
use crate::service::{ChatService, RawMessage, UserDescriptor};

/// Name recorded for authors that cannot be resolved.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Display names by user ID and, separately, by bot ID.
///
/// Misses that could not be resolved are cached as [`UNKNOWN_AUTHOR`] so a
/// chatty unknown author costs one lookup, not one per message.
#[derive(Debug, Default)]
pub struct UserCache {
    users: HashMap<String, String>,
    bots: HashMap<String, String>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the cache from a full user listing.
    pub fn seed(&mut self, users: &[UserDescriptor]) {
        for user in users {
            self.users.insert(user.id.clone(), display_name(user));
        }
    }

    pub fn user(&self, id: &str) -> Option<&str> {
        self.users.get(id).map(String::as_str)
    }

    pub fn bot(&self, id: &str) -> Option<&str> {
        self.bots.get(id).map(String::as_str)
    }

    pub fn insert_user(&mut self, id: &str, name: String) {
        self.users.insert(id.to_string(), name);
    }

    pub fn insert_bot(&mut self, id: &str, name: String) {
        self.bots.insert(id.to_string(), name);
    }
}

fn display_name(user: &UserDescriptor) -> String {
    if user.name.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        user.name.clone()
    }
}

/// Undo the three entity escapes Slack applies to message text.
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Parse a server timestamp (`"1503435956.000247"`, seconds since the
/// epoch). Anything unparseable maps to the epoch itself.
pub fn parse_ts(ts: &str) -> DateTime<Local> {
    ts.parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .and_then(|secs| {
            let nanos = (secs.fract() * 1_000_000_000.0) as u32;
            DateTime::from_timestamp(secs.trunc() as i64, nanos)
        })
        .unwrap_or_default()
        .with_timezone(&Local)
}

/// Builds [`Message`] records, resolving authors through the service on a
/// cache miss.
pub struct MessageBuilder<'a> {
    service: &'a dyn ChatService,
    users: &'a mut UserCache,
    ids: &'a mut ShortIds,
}

impl<'a> MessageBuilder<'a> {
    pub fn new(service: &'a dyn ChatService, users: &'a mut UserCache, ids: &'a mut ShortIds) -> Self {
        Self { service, users, ids }
    }

    pub fn service(&self) -> &'a dyn ChatService {
        self.service
    }

    /// Display name of the message's author.
    pub async fn author(&mut self, raw: &RawMessage) -> String {
        let user_id = raw.user.as_deref().unwrap_or_default();
        if let Some(name) = self.users.user(user_id) {
            return name.to_string();
        }

        if let Some(bot_id) = raw.bot_id.as_deref().filter(|b| !b.is_empty()) {
            if let Some(name) = self.users.bot(bot_id) {
                return name.to_string();
            }
            let name = raw
                .username
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
            self.users.insert_bot(bot_id, name.clone());
            return name;
        }

        let name = if user_id.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            match self.service.user_info(user_id).await {
                Ok(user) => display_name(&user),
                Err(e) => {
                    warn!("users.info for {user_id} failed: {e}");
                    UNKNOWN_AUTHOR.to_string()
                }
            }
        };
        debug!("Caching author {user_id:?} as {name:?}");
        self.users.insert_user(user_id, name.clone());
        name
    }

    /// Expand one raw message into its records: attachment fields first
    /// (last field first), then the message text.
    pub async fn build(&mut self, raw: &RawMessage) -> Vec<Message> {
        let author = self.author(raw).await;
        let time = parse_ts(&raw.ts);
        let (kind, thread_ts) = if raw.is_reply() {
            (MessageKind::Reply, raw.thread_ts.clone())
        } else {
            (MessageKind::Normal, None)
        };

        let mut records: Vec<Message> = raw
            .attachments
            .iter()
            .flat_map(|attachment| attachment.fields.iter().rev())
            .map(|field| Message {
                time,
                author: author.clone(),
                text: unescape(&format!("{} {}", field.title, field.value)),
                kind: MessageKind::Attachment,
                short_id: None,
                ts: raw.ts.clone(),
                thread_ts: thread_ts.clone(),
            })
            .collect();

        records.push(Message {
            time,
            author,
            text: unescape(&raw.text),
            kind,
            short_id: Some(self.ids.assign(&raw.ts)),
            ts: raw.ts.clone(),
            thread_ts,
        });
        records
    }
}
