use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use super::types::{ChannelDescriptor, RawMessage, StreamEvent, UserDescriptor};

/// Errors that can occur while talking to the messaging service.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The service rejected the token. Fatal at startup.
    Auth(String),
    /// Network-level failure (timeout, DNS, connection refused, socket drop).
    Transport(String),
    /// The service answered with a payload we could not make sense of.
    Protocol(String),
    /// The service answered `ok: false` for a call.
    Api { method: String, error: String },
    /// The event receiver was dropped; the stream has nobody to talk to.
    ChannelClosed,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Auth(msg) => write!(f, "authentication failed: {msg}"),
            ServiceError::Transport(msg) => write!(f, "network error: {msg}"),
            ServiceError::Protocol(msg) => write!(f, "unexpected response: {msg}"),
            ServiceError::Api { method, error } => write!(f, "{method} failed: {error}"),
            ServiceError::ChannelClosed => write!(f, "event channel closed"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// The remote messaging service, as far as the engine is concerned.
///
/// Calls are awaited inline by the dispatcher, so a slow call stalls the UI
/// for its duration. Only [`stream_events`](ChatService::stream_events) is
/// meant to run on its own task.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Verify the token; returns the current user's ID.
    async fn auth(&self) -> Result<String, ServiceError>;

    async fn list_channels(&self) -> Result<Vec<ChannelDescriptor>, ServiceError>;

    async fn list_users(&self) -> Result<Vec<UserDescriptor>, ServiceError>;

    /// Most recent `count` top-level messages, newest first.
    async fn history(&self, channel: &str, count: usize) -> Result<Vec<RawMessage>, ServiceError>;

    /// Fetch one message by timestamp; `thread_ts` selects a thread reply.
    async fn fetch_message(
        &self,
        channel: &str,
        ts: &str,
        thread_ts: Option<&str>,
    ) -> Result<RawMessage, ServiceError>;

    async fn post(&self, channel: &str, text: &str) -> Result<(), ServiceError>;

    async fn edit(&self, channel: &str, ts: &str, text: &str) -> Result<(), ServiceError>;

    async fn reply(&self, channel: &str, thread_ts: &str, text: &str) -> Result<(), ServiceError>;

    /// Run a server-side slash command, e.g. `/giphy cats`.
    async fn command(&self, channel: &str, command: &str, text: &str)
    -> Result<(), ServiceError>;

    async fn user_info(&self, user_id: &str) -> Result<UserDescriptor, ServiceError>;

    /// Pump real-time events into `sender` until the receiver is dropped.
    ///
    /// `presence_ids` are the users whose presence changes should be
    /// delivered (the peers of direct conversations).
    ///
    /// Implementations reconnect on their own; they only return when the
    /// engine has gone away (`ChannelClosed`) or on a fatal error.
    async fn stream_events(
        &self,
        presence_ids: Vec<String>,
        sender: Sender<StreamEvent>,
    ) -> Result<(), ServiceError>;
}
