//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::service::{
    ChannelDescriptor, ChannelKind, ChatService, RawMessage, ServiceError, StreamEvent,
    UserDescriptor,
};

/// Current user reported by [`MockService::auth`].
pub const ME: &str = "UME";

/// A scripted service that records every call as a short string, e.g.
/// `"history C1 50"` or `"edit C1 100.7 world"`.
#[derive(Default)]
pub struct MockService {
    calls: Mutex<Vec<String>>,
    users: HashMap<String, UserDescriptor>,
    channels: Vec<ChannelDescriptor>,
    histories: HashMap<String, Vec<RawMessage>>,
    messages: HashMap<(String, String), RawMessage>,
    reject_auth: bool,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: &str, name: &str) -> Self {
        self.users.insert(
            id.to_string(),
            UserDescriptor {
                id: id.to_string(),
                name: name.to_string(),
                ..Default::default()
            },
        );
        self
    }

    pub fn with_channel(mut self, id: &str, name: &str, kind: ChannelKind) -> Self {
        self.channels.push(ChannelDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            topic: None,
            kind,
            user_id: None,
        });
        self
    }

    /// A direct conversation with `user_id`; its name is the user ID, as
    /// the real service reports it.
    pub fn with_direct(mut self, id: &str, user_id: &str) -> Self {
        self.channels.push(ChannelDescriptor {
            id: id.to_string(),
            name: user_id.to_string(),
            topic: None,
            kind: ChannelKind::Direct,
            user_id: Some(user_id.to_string()),
        });
        self
    }

    /// History for `channel`, newest first.
    pub fn with_history(mut self, channel: &str, messages: Vec<RawMessage>) -> Self {
        self.histories.insert(channel.to_string(), messages);
        self
    }

    /// A message only reachable through `fetch_message`.
    pub fn with_message(mut self, channel: &str, message: RawMessage) -> Self {
        self.messages
            .insert((channel.to_string(), message.ts.clone()), message);
        self
    }

    pub fn rejecting_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose description starts with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn api_error(method: &str, error: &str) -> ServiceError {
    ServiceError::Api {
        method: method.to_string(),
        error: error.to_string(),
    }
}

#[async_trait]
impl ChatService for MockService {
    async fn auth(&self) -> Result<String, ServiceError> {
        self.record("auth".to_string());
        if self.reject_auth {
            return Err(ServiceError::Auth("invalid_auth".to_string()));
        }
        Ok(ME.to_string())
    }

    async fn list_channels(&self) -> Result<Vec<ChannelDescriptor>, ServiceError> {
        self.record("list_channels".to_string());
        Ok(self.channels.clone())
    }

    async fn list_users(&self) -> Result<Vec<UserDescriptor>, ServiceError> {
        self.record("list_users".to_string());
        Ok(self.users.values().cloned().collect())
    }

    async fn history(&self, channel: &str, count: usize) -> Result<Vec<RawMessage>, ServiceError> {
        self.record(format!("history {channel} {count}"));
        self.histories
            .get(channel)
            .map(|h| h.iter().take(count).cloned().collect())
            .ok_or_else(|| api_error("conversations.history", "channel_not_found"))
    }

    async fn fetch_message(
        &self,
        channel: &str,
        ts: &str,
        _thread_ts: Option<&str>,
    ) -> Result<RawMessage, ServiceError> {
        self.record(format!("fetch {channel} {ts}"));
        if let Some(msg) = self.messages.get(&(channel.to_string(), ts.to_string())) {
            return Ok(msg.clone());
        }
        self.histories
            .get(channel)
            .and_then(|h| h.iter().find(|m| m.ts == ts))
            .cloned()
            .ok_or_else(|| api_error("conversations.history", "message_not_found"))
    }

    async fn post(&self, channel: &str, text: &str) -> Result<(), ServiceError> {
        self.record(format!("post {channel} {text}"));
        Ok(())
    }

    async fn edit(&self, channel: &str, ts: &str, text: &str) -> Result<(), ServiceError> {
        self.record(format!("edit {channel} {ts} {text}"));
        Ok(())
    }

    async fn reply(&self, channel: &str, thread_ts: &str, text: &str) -> Result<(), ServiceError> {
        self.record(format!("reply {channel} {thread_ts} {text}"));
        Ok(())
    }

    async fn command(
        &self,
        channel: &str,
        command: &str,
        text: &str,
    ) -> Result<(), ServiceError> {
        self.record(format!("command {channel} {command} {text}"));
        Ok(())
    }

    async fn user_info(&self, user_id: &str) -> Result<UserDescriptor, ServiceError> {
        self.record(format!("user_info {user_id}"));
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| api_error("users.info", "user_not_found"))
    }

    async fn stream_events(
        &self,
        presence_ids: Vec<String>,
        _sender: Sender<StreamEvent>,
    ) -> Result<(), ServiceError> {
        self.record(format!("stream_events {}", presence_ids.join(",")));
        Ok(())
    }
}
