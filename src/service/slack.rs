//! Slack implementation of [`ChatService`].
//!
//! Web API calls are form-encoded POSTs to `<base_url>/<method>` with the
//! token as a bearer header. Every reply carries an `ok` flag; `ok: false`
//! becomes [`ServiceError::Api`] (or [`ServiceError::Auth`] for token
//! problems).
//!
//! The real-time stream uses `rtm.connect` to obtain a WebSocket URL and
//! decodes each text frame into a [`StreamEvent`]. Right after connecting
//! the client subscribes to the presence of its direct-message peers; Slack
//! answers with their current presence and then sends changes. A dropped
//! socket is reported as `Reconnecting` and retried after a short back-off.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::service::{
    ChannelDescriptor, ChannelKind, ChatService, Presence, RawMessage, ServiceError, StreamEvent,
    UserDescriptor,
};

pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const PAGE_LIMIT: &str = "200";

/// Error codes that mean the token itself is bad.
const AUTH_ERRORS: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "account_inactive",
    "token_revoked",
    "token_expired",
];

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Deserialize, Debug)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize, Debug)]
struct AuthTest {
    user_id: String,
}

#[derive(Deserialize, Debug)]
struct Topic {
    #[serde(default)]
    value: String,
}

#[derive(Deserialize, Debug)]
struct WireChannel {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    is_im: bool,
    #[serde(default)]
    is_mpim: bool,
    #[serde(default)]
    is_group: bool,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    is_member: bool,
    #[serde(default)]
    is_archived: bool,
    /// Peer of an IM.
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    topic: Option<Topic>,
}

#[derive(Deserialize, Debug)]
struct ConversationsList {
    channels: Vec<WireChannel>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Deserialize, Debug)]
struct UsersList {
    members: Vec<UserDescriptor>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Deserialize, Debug)]
struct UsersInfo {
    user: UserDescriptor,
}

#[derive(Deserialize, Debug)]
struct Messages {
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Deserialize, Debug)]
struct RtmConnect {
    url: String,
}

#[derive(Deserialize, Debug)]
struct PresenceChange {
    user: String,
    #[serde(default)]
    presence: Presence,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Maps a conversation from `conversations.list` onto a channel descriptor.
/// Archived conversations and public channels the user has not joined are
/// dropped.
fn to_descriptor(channel: WireChannel) -> Option<ChannelDescriptor> {
    if channel.is_archived {
        return None;
    }
    let kind = if channel.is_im {
        ChannelKind::Direct
    } else if channel.is_mpim || channel.is_group || channel.is_private {
        ChannelKind::Group
    } else if channel.is_member {
        ChannelKind::Channel
    } else {
        return None;
    };
    let name = match kind {
        // IMs have no name; the engine resolves the peer's user name.
        ChannelKind::Direct => channel.user.clone().unwrap_or_default(),
        _ => channel.name.unwrap_or_default(),
    };
    Some(ChannelDescriptor {
        id: channel.id,
        name,
        topic: channel
            .topic
            .map(|t| t.value)
            .filter(|value| !value.is_empty()),
        kind,
        user_id: if kind == ChannelKind::Direct {
            channel.user
        } else {
            None
        },
    })
}

/// Decodes one real-time frame. Returns `None` for frames the engine does
/// not care about (hello, typing, acks, deletions, ...).
pub fn decode_event(frame: &str) -> Option<StreamEvent> {
    let value: serde_json::Value = match serde_json::from_str(frame) {
        Ok(v) => v,
        Err(e) => {
            warn!("Undecodable stream frame ({e}): {frame}");
            return None;
        }
    };
    match value.get("type").and_then(|t| t.as_str()) {
        Some("message") => match value.get("subtype").and_then(|s| s.as_str()) {
            Some("message_changed") => {
                let channel = value.get("channel")?.as_str()?.to_string();
                let message = serde_json::from_value(value.get("message")?.clone()).ok()?;
                Some(StreamEvent::MessageChanged { channel, message })
            }
            Some("message_deleted") | Some("message_replied") => None,
            _ => match serde_json::from_value(value) {
                Ok(message) => Some(StreamEvent::Message(message)),
                Err(e) => {
                    warn!("Undecodable message frame ({e}): {frame}");
                    None
                }
            },
        },
        Some("presence_change") => {
            let change: PresenceChange = serde_json::from_value(value).ok()?;
            Some(StreamEvent::Presence {
                user_id: change.user,
                presence: change.presence,
            })
        }
        other => {
            debug!("Ignoring stream frame of type {:?}", other);
            None
        }
    }
}

// ============================================================================
// Service Implementation
// ============================================================================

pub struct SlackService {
    token: String,
    base_url: String,
    client: reqwest::Client,
    reconnect_delay: Duration,
}

impl SlackService {
    /// Creates a client for the Slack Web API.
    ///
    /// `base_url` defaults to Slack's production endpoint; tests point it at
    /// a mock server.
    pub fn new(token: String, base_url: Option<String>) -> Self {
        Self {
            token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    /// Wait this long before re-opening a dropped stream.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Calls one Web API method and decodes the reply.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        debug!("Slack call {method} ({} params)", params.len());
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .bearer_auth(&self.token)
            .form(params)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!("Slack {method} returned HTTP {status}: {body}");
            return Err(ServiceError::Transport(format!("HTTP {status} from {method}")));
        }

        let envelope: Envelope = serde_json::from_str(&body)
            .map_err(|e| ServiceError::Protocol(format!("{method}: {e}")))?;
        if !envelope.ok {
            let error = envelope.error.unwrap_or_else(|| "unknown_error".to_string());
            warn!("Slack {method} failed: {error}");
            if AUTH_ERRORS.contains(&error.as_str()) {
                return Err(ServiceError::Auth(error));
            }
            return Err(ServiceError::Api {
                method: method.to_string(),
                error,
            });
        }

        serde_json::from_str(&body).map_err(|e| ServiceError::Protocol(format!("{method}: {e}")))
    }

    /// One real-time session: connect, then forward frames until the socket
    /// closes. `Ok` means the server hung up.
    async fn pump_events(
        &self,
        presence_ids: &[String],
        sender: &Sender<StreamEvent>,
    ) -> Result<(), ServiceError> {
        let connect: RtmConnect = self.call("rtm.connect", &[]).await?;
        debug!("RTM URL obtained");

        let (socket, _) = tokio_tungstenite::connect_async(connect.url.as_str())
            .await
            .map_err(|e| ServiceError::Transport(format!("WebSocket connect: {e}")))?;
        let (mut sink, mut stream) = socket.split();
        info!("Real-time stream connected");
        sender
            .send(StreamEvent::Connected)
            .await
            .map_err(|_| ServiceError::ChannelClosed)?;

        if !presence_ids.is_empty() {
            let subscribe = serde_json::json!({ "type": "presence_sub", "ids": presence_ids });
            sink.send(WsMessage::Text(subscribe.to_string()))
                .await
                .map_err(|e| ServiceError::Transport(format!("presence_sub: {e}")))?;
            debug!("Subscribed to presence of {} users", presence_ids.len());
        }

        while let Some(frame) = stream.next().await {
            match frame.map_err(|e| ServiceError::Transport(e.to_string()))? {
                WsMessage::Text(text) => {
                    if let Some(event) = decode_event(&text) {
                        // Blocks while the dispatcher is behind: dropping
                        // events would lose notifications.
                        sender
                            .send(event)
                            .await
                            .map_err(|_| ServiceError::ChannelClosed)?;
                    }
                }
                WsMessage::Close(_) => break,
                _ => {}
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChatService for SlackService {
    async fn auth(&self) -> Result<String, ServiceError> {
        let auth: AuthTest = self.call("auth.test", &[]).await?;
        info!("Authenticated as {}", auth.user_id);
        Ok(auth.user_id)
    }

    async fn list_channels(&self) -> Result<Vec<ChannelDescriptor>, ServiceError> {
        let mut channels = Vec::new();
        let mut cursor = String::new();
        loop {
            let page: ConversationsList = self
                .call(
                    "conversations.list",
                    &[
                        ("types", "public_channel,private_channel,mpim,im"),
                        ("exclude_archived", "true"),
                        ("limit", PAGE_LIMIT),
                        ("cursor", cursor.as_str()),
                    ],
                )
                .await?;
            channels.extend(page.channels.into_iter().filter_map(to_descriptor));
            if page.response_metadata.next_cursor.is_empty() {
                break;
            }
            cursor = page.response_metadata.next_cursor;
        }
        info!("Listed {} conversations", channels.len());
        Ok(channels)
    }

    async fn list_users(&self) -> Result<Vec<UserDescriptor>, ServiceError> {
        let mut users = Vec::new();
        let mut cursor = String::new();
        loop {
            let page: UsersList = self
                .call("users.list", &[("limit", PAGE_LIMIT), ("cursor", cursor.as_str())])
                .await?;
            users.extend(page.members);
            if page.response_metadata.next_cursor.is_empty() {
                break;
            }
            cursor = page.response_metadata.next_cursor;
        }
        info!("Listed {} users", users.len());
        Ok(users)
    }

    async fn history(&self, channel: &str, count: usize) -> Result<Vec<RawMessage>, ServiceError> {
        let limit = count.to_string();
        let page: Messages = self
            .call(
                "conversations.history",
                &[("channel", channel), ("limit", limit.as_str())],
            )
            .await?;
        Ok(page.messages)
    }

    async fn fetch_message(
        &self,
        channel: &str,
        ts: &str,
        thread_ts: Option<&str>,
    ) -> Result<RawMessage, ServiceError> {
        let (method, page): (&str, Messages) = match thread_ts {
            Some(thread) => (
                "conversations.replies",
                self.call(
                    "conversations.replies",
                    &[
                        ("channel", channel),
                        ("ts", thread),
                        ("latest", ts),
                        ("oldest", ts),
                        ("inclusive", "true"),
                    ],
                )
                .await?,
            ),
            None => (
                "conversations.history",
                self.call(
                    "conversations.history",
                    &[
                        ("channel", channel),
                        ("latest", ts),
                        ("oldest", ts),
                        ("inclusive", "true"),
                        ("limit", "1"),
                    ],
                )
                .await?,
            ),
        };
        page.messages
            .into_iter()
            .find(|m| m.ts == ts)
            .ok_or_else(|| ServiceError::Api {
                method: method.to_string(),
                error: "message_not_found".to_string(),
            })
    }

    async fn post(&self, channel: &str, text: &str) -> Result<(), ServiceError> {
        let _: serde_json::Value = self
            .call(
                "chat.postMessage",
                &[("channel", channel), ("text", text), ("as_user", "true")],
            )
            .await?;
        Ok(())
    }

    async fn edit(&self, channel: &str, ts: &str, text: &str) -> Result<(), ServiceError> {
        let _: serde_json::Value = self
            .call(
                "chat.update",
                &[("channel", channel), ("ts", ts), ("text", text)],
            )
            .await?;
        Ok(())
    }

    async fn reply(&self, channel: &str, thread_ts: &str, text: &str) -> Result<(), ServiceError> {
        let _: serde_json::Value = self
            .call(
                "chat.postMessage",
                &[
                    ("channel", channel),
                    ("thread_ts", thread_ts),
                    ("text", text),
                    ("as_user", "true"),
                ],
            )
            .await?;
        Ok(())
    }

    async fn command(
        &self,
        channel: &str,
        command: &str,
        text: &str,
    ) -> Result<(), ServiceError> {
        let _: serde_json::Value = self
            .call(
                "chat.command",
                &[("channel", channel), ("command", command), ("text", text)],
            )
            .await?;
        Ok(())
    }

    async fn user_info(&self, user_id: &str) -> Result<UserDescriptor, ServiceError> {
        let info: UsersInfo = self.call("users.info", &[("user", user_id)]).await?;
        Ok(info.user)
    }

    async fn stream_events(
        &self,
        presence_ids: Vec<String>,
        sender: Sender<StreamEvent>,
    ) -> Result<(), ServiceError> {
        loop {
            let reason = match self.pump_events(&presence_ids, &sender).await {
                Ok(()) => "connection closed by server".to_string(),
                Err(ServiceError::ChannelClosed) => return Err(ServiceError::ChannelClosed),
                Err(e @ ServiceError::Auth(_)) => return Err(e),
                Err(e) => e.to_string(),
            };
            warn!(
                "Real-time stream dropped: {reason}; retrying in {:?}",
                self.reconnect_delay
            );
            sender
                .send(StreamEvent::Reconnecting { reason })
                .await
                .map_err(|_| ServiceError::ChannelClosed)?;
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(json: &str) -> WireChannel {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn maps_conversation_kinds() {
        let channel = to_descriptor(wire(
            r#"{"id":"C1","name":"general","is_member":true,"topic":{"value":"all hands"}}"#,
        ))
        .unwrap();
        assert_eq!(channel.kind, ChannelKind::Channel);
        assert_eq!(channel.topic.as_deref(), Some("all hands"));

        let group = to_descriptor(wire(r#"{"id":"G1","name":"ops","is_private":true}"#)).unwrap();
        assert_eq!(group.kind, ChannelKind::Group);

        let mpim = to_descriptor(wire(r#"{"id":"G2","name":"mpdm-a--b","is_mpim":true}"#)).unwrap();
        assert_eq!(mpim.kind, ChannelKind::Group);

        let im = to_descriptor(wire(r#"{"id":"D1","is_im":true,"user":"U42"}"#)).unwrap();
        assert_eq!(im.kind, ChannelKind::Direct);
        assert_eq!(im.user_id.as_deref(), Some("U42"));
        assert_eq!(im.name, "U42");
    }

    #[test]
    fn drops_unjoined_and_archived() {
        assert!(to_descriptor(wire(r#"{"id":"C2","name":"lurk","is_member":false}"#)).is_none());
        assert!(
            to_descriptor(wire(r#"{"id":"C3","name":"old","is_member":true,"is_archived":true}"#))
                .is_none()
        );
    }

    #[test]
    fn empty_topic_is_none() {
        let channel = to_descriptor(wire(
            r#"{"id":"C1","name":"general","is_member":true,"topic":{"value":""}}"#,
        ))
        .unwrap();
        assert_eq!(channel.topic, None);
    }

    #[test]
    fn decodes_message_frame() {
        let event = decode_event(
            r#"{"type":"message","channel":"C1","user":"U1","text":"hi","ts":"10.1"}"#,
        );
        match event {
            Some(StreamEvent::Message(msg)) => {
                assert_eq!(msg.channel.as_deref(), Some("C1"));
                assert_eq!(msg.user.as_deref(), Some("U1"));
                assert_eq!(msg.text, "hi");
            }
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn decodes_message_changed_frame() {
        let event = decode_event(
            r#"{"type":"message","subtype":"message_changed","channel":"C1",
                "message":{"user":"U1","text":"edited","ts":"10.1"}}"#,
        );
        assert_eq!(
            event,
            Some(StreamEvent::MessageChanged {
                channel: "C1".to_string(),
                message: RawMessage {
                    ts: "10.1".to_string(),
                    user: Some("U1".to_string()),
                    text: "edited".to_string(),
                    ..Default::default()
                },
            })
        );
    }

    #[test]
    fn decodes_presence_frame() {
        let event = decode_event(r#"{"type":"presence_change","user":"U7","presence":"away"}"#);
        assert_eq!(
            event,
            Some(StreamEvent::Presence {
                user_id: "U7".to_string(),
                presence: Presence::Away,
            })
        );
    }

    #[test]
    fn ignores_other_frames() {
        assert_eq!(decode_event(r#"{"type":"hello"}"#), None);
        assert_eq!(decode_event(r#"{"type":"user_typing","channel":"C1"}"#), None);
        assert_eq!(
            decode_event(r#"{"type":"message","subtype":"message_deleted","channel":"C1"}"#),
            None
        );
        assert_eq!(decode_event("not json"), None);
    }

    #[test]
    fn drops_message_frames_with_bad_fields() {
        assert_eq!(
            decode_event(r#"{"type":"message","channel":"C1","ts":17,"text":"x"}"#),
            None
        );
    }
}
