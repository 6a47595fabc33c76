//! # Message Model
//!
//! One rendered chat line. Built once by the ingest path and never mutated;
//! an edit from the service produces a replacement record.
//!
//! ```text
//! [14:02] [0a] <alice> see you at standup
//!  time    id   author  text
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Local};

/// Visual role of a record. The TUI maps each to a palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A top-level message.
    Normal,
    /// A reply inside a thread.
    Reply,
    /// One field of an attachment, rendered before its message.
    Attachment,
}

/// Session-unique handle for referencing a message in `/edit` and `/thread`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortId(pub u32);

impl ShortId {
    /// Parse the hex tag a user types back (`7`, `07`, `1f`).
    pub fn parse(s: &str) -> Option<Self> {
        u32::from_str_radix(s, 16).ok().map(ShortId)
    }
}

impl std::fmt::Display for ShortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub time: DateTime<Local>,
    pub author: String,
    pub text: String,
    pub kind: MessageKind,
    pub short_id: Option<ShortId>,
    /// Server timestamp of the message this record belongs to.
    pub ts: String,
    /// Parent thread timestamp, for replies.
    pub thread_ts: Option<String>,
}

impl Message {
    /// The single line the transcript wraps and paints.
    pub fn render_line(&self) -> String {
        let time = self.time.format("%H:%M");
        let tag = match self.short_id {
            Some(id) => format!("[{id}] "),
            None => String::new(),
        };
        match self.kind {
            MessageKind::Attachment => format!("[{time}] {tag}  {}", self.text),
            MessageKind::Reply => format!("[{time}] {tag}↳ <{}> {}", self.author, self.text),
            MessageKind::Normal => format!("[{time}] {tag}<{}> {}", self.author, self.text),
        }
    }
}

/// Hands out short IDs, one per server timestamp, for the whole session.
///
/// Re-loading a channel hands back the IDs already shown for its messages,
/// so a tag the user is reading never changes meaning.
#[derive(Debug, Default)]
pub struct ShortIds {
    next: u32,
    by_ts: HashMap<String, ShortId>,
}

impl ShortIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, ts: &str) -> ShortId {
        if let Some(id) = self.by_ts.get(ts) {
            return *id;
        }
        self.next += 1;
        let id = ShortId(self.next);
        self.by_ts.insert(ts.to_string(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 5, 1, hour, minute, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn short_id_round_trips_through_tag() {
        let id = ShortId(26);
        assert_eq!(id.to_string(), "1a");
        assert_eq!(ShortId::parse("1a"), Some(id));
        assert_eq!(ShortId::parse("7"), Some(ShortId(7)));
        assert_eq!(ShortId::parse("07"), Some(ShortId(7)));
        assert_eq!(ShortId::parse("zz"), None);
    }

    #[test]
    fn assign_is_injective_and_stable() {
        let mut ids = ShortIds::new();
        let a = ids.assign("100.1");
        let b = ids.assign("100.2");
        assert_ne!(a, b);
        assert_eq!(ids.assign("100.1"), a);
    }

    #[test]
    fn render_line_formats() {
        let msg = Message {
            time: at(9, 5),
            author: "alice".to_string(),
            text: "hello".to_string(),
            kind: MessageKind::Normal,
            short_id: Some(ShortId(7)),
            ts: "1.0".to_string(),
            thread_ts: None,
        };
        assert_eq!(msg.render_line(), "[09:05] [07] <alice> hello");

        let reply = Message {
            kind: MessageKind::Reply,
            ..msg.clone()
        };
        assert_eq!(reply.render_line(), "[09:05] [07] ↳ <alice> hello");

        let field = Message {
            kind: MessageKind::Attachment,
            short_id: None,
            text: "Status green".to_string(),
            ..msg
        };
        assert_eq!(field.render_line(), "[09:05]   Status green");
    }
}
