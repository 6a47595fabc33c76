//! Service-side data as the engine sees it.
//!
//! These are the shapes the adapter hands to the engine: raw messages (with
//! attachments still folded in), channel and user descriptors, and the
//! events of the real-time stream. The Slack wire format is decoded into
//! these in `service::slack`.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Channel,
    Group,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Active,
    Away,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One field of a message attachment (`title: value` pair).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AttachmentField {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub fields: Vec<AttachmentField>,
}

/// A message as the service delivers it, from history or the stream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMessage {
    /// Server timestamp; doubles as the message identifier.
    #[serde(default)]
    pub ts: String,
    /// Set on stream events; history replies omit it.
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Display name supplied by bots.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl RawMessage {
    /// True for a reply inside a thread (not the thread's parent).
    pub fn is_reply(&self) -> bool {
        self.thread_ts
            .as_deref()
            .is_some_and(|thread| !thread.is_empty() && thread != self.ts)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    pub id: String,
    pub name: String,
    pub topic: Option<String>,
    pub kind: ChannelKind,
    /// Peer of a direct conversation.
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub is_bot: bool,
}

/// Everything the real-time stream can tell the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A new message (top-level or reply) in some conversation.
    Message(RawMessage),
    /// An existing message's text was edited.
    MessageChanged { channel: String, message: RawMessage },
    /// A user's presence changed.
    Presence { user_id: String, presence: Presence },
    /// The stream (re)connected.
    Connected,
    /// The stream dropped and is being re-established.
    Reconnecting { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_message_tolerates_nulls_and_missing_fields() {
        let json = r#"{"type":"message","ts":"1.5","user":null,"bot_id":"B1","text":"hi"}"#;
        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.ts, "1.5");
        assert_eq!(msg.user, None);
        assert_eq!(msg.bot_id.as_deref(), Some("B1"));
        assert!(msg.attachments.is_empty());
    }

    #[test]
    fn reply_detection() {
        let mut msg = RawMessage {
            ts: "2.0".to_string(),
            ..Default::default()
        };
        assert!(!msg.is_reply());
        msg.thread_ts = Some("2.0".to_string());
        assert!(!msg.is_reply(), "thread parent is not a reply");
        msg.thread_ts = Some("1.0".to_string());
        assert!(msg.is_reply());
    }

    #[test]
    fn unknown_presence_falls_back() {
        let p: Presence = serde_json::from_str(r#""dnd""#).unwrap();
        assert_eq!(p, Presence::Unknown);
        let p: Presence = serde_json::from_str(r#""away""#).unwrap();
        assert_eq!(p, Presence::Away);
    }
}
