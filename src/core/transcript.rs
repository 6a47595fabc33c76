//! # Transcript
//!
//! The messages of the loaded conversation, oldest first, plus the scroll
//! state of the chat pane.
//!
//! ```text
//!   line 0   [09:01] [01] <alice> morning
//!   ...                                         ▲
//!   ───────────── viewport top ────────────     │ scroll_offset
//!   ...                                         │ counts wrapped lines
//!   ───────────── viewport bottom ─────────     │ hidden below the
//!   line N   [09:44] [0c] <bob> latest          ▼ viewport
//! ```
//!
//! Painting starts at the newest line and walks upward, skipping
//! `scroll_offset` lines first. `scroll_offset == 0` means "pinned to the
//! newest message".

use std::collections::HashMap;

use log::debug;
use textwrap::{Options, WordSeparator};

use crate::core::channels::ChannelEntry;
use crate::core::ingest::MessageBuilder;
use crate::core::message::{Message, MessageKind, ShortId};
use crate::service::ServiceError;

/// What a short ID points at on the service side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub ts: String,
    /// Parent timestamp when the target is a thread reply.
    pub thread_ts: Option<String>,
}

#[derive(Debug)]
pub struct Transcript {
    channel_id: Option<String>,
    messages: Vec<Message>,
    scroll_offset: usize,
    width: usize,
    height: usize,
    top_level: HashMap<ShortId, String>,
    replies: HashMap<ShortId, MessageRef>,
    border_label: String,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            channel_id: None,
            messages: Vec::new(),
            scroll_offset: 0,
            width: 80,
            height: 20,
            top_level: HashMap::new(),
            replies: HashMap::new(),
            border_label: String::new(),
        }
    }

    /// Fetch the recent history of `channel` and make it the transcript.
    ///
    /// The old transcript is only replaced once everything is built, so a
    /// failed fetch leaves the pane showing what it showed before.
    pub async fn load(
        &mut self,
        channel: &ChannelEntry,
        builder: &mut MessageBuilder<'_>,
        count: usize,
    ) -> Result<(), ServiceError> {
        let mut raw = builder.service().history(&channel.id, count).await?;
        // history arrives newest first
        raw.reverse();

        let mut messages = Vec::with_capacity(raw.len());
        for msg in &raw {
            messages.extend(builder.build(msg).await);
        }
        debug!("Loaded {} records for {}", messages.len(), channel.id);

        self.clear();
        self.channel_id = Some(channel.id.clone());
        for msg in messages {
            self.push(msg);
        }
        self.border_label = match channel.topic.as_deref().filter(|t| !t.is_empty()) {
            Some(topic) => format!("{} - {topic}", channel.label()),
            None => channel.label(),
        };
        Ok(())
    }

    /// ID of the conversation currently shown.
    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.top_level.clear();
        self.replies.clear();
        self.scroll_offset = 0;
    }

    /// Add a record at the bottom; returns whether it was added. A message
    /// record whose server timestamp and kind are already present is
    /// dropped. Attachment records are always kept: identical fields of one
    /// message are distinct lines.
    ///
    /// A scrolled-back view keeps showing the same lines.
    pub fn append(&mut self, msg: Message) -> bool {
        if self.contains(&msg) {
            return false;
        }
        if self.scroll_offset > 0 {
            self.scroll_offset += self.wrap_message(&msg).len();
        }
        self.push(msg);
        self.clamp_scroll();
        true
    }

    /// True once the message with server timestamp `ts` is shown (its own
    /// record, not just its attachment lines).
    pub fn has_message(&self, ts: &str) -> bool {
        self.messages
            .iter()
            .any(|m| m.ts == ts && m.kind != MessageKind::Attachment)
    }

    /// Swap in new text for the message with server timestamp `ts`.
    pub fn replace_text(&mut self, ts: &str, text: &str) -> bool {
        let Some(msg) = self
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.ts == ts && m.kind != MessageKind::Attachment)
        else {
            return false;
        };
        msg.text = text.to_string();
        self.clamp_scroll();
        true
    }

    /// Resolve a short ID shown in this transcript.
    pub fn lookup(&self, id: ShortId) -> Option<MessageRef> {
        if let Some(ts) = self.top_level.get(&id) {
            return Some(MessageRef {
                ts: ts.clone(),
                thread_ts: None,
            });
        }
        self.replies.get(&id).cloned()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
        self.clamp_scroll();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Inner size of the chat pane, in cells.
    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.clamp_scroll();
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn border_label(&self) -> &str {
        &self.border_label
    }

    pub fn set_border_label(&mut self, label: impl Into<String>) {
        self.border_label = label.into();
    }

    /// Every message wrapped to the pane width, oldest line first.
    pub fn wrap_lines(&self) -> Vec<(MessageKind, String)> {
        self.messages
            .iter()
            .flat_map(|m| {
                self.wrap_message(m)
                    .into_iter()
                    .map(move |line| (m.kind, line))
            })
            .collect()
    }

    /// The wrapped lines that fit the viewport after skipping
    /// `scroll_offset` lines from the bottom, oldest first.
    pub fn visible_lines(&self) -> Vec<(MessageKind, String)> {
        let mut lines = self.wrap_lines();
        let end = lines.len().saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(self.height);
        lines.truncate(end);
        lines.drain(..start);
        lines
    }

    fn push(&mut self, msg: Message) {
        if let Some(id) = msg.short_id {
            match (msg.kind, &msg.thread_ts) {
                (MessageKind::Reply, Some(thread_ts)) => {
                    self.replies.insert(
                        id,
                        MessageRef {
                            ts: msg.ts.clone(),
                            thread_ts: Some(thread_ts.clone()),
                        },
                    );
                }
                _ => {
                    self.top_level.insert(id, msg.ts.clone());
                }
            }
        }
        self.messages.push(msg);
    }

    fn contains(&self, msg: &Message) -> bool {
        msg.kind != MessageKind::Attachment
            && self
                .messages
                .iter()
                .any(|m| m.ts == msg.ts && m.kind == msg.kind)
    }

    fn wrap_message(&self, msg: &Message) -> Vec<String> {
        let options = Options::new(self.width)
            .break_words(true)
            .word_separator(WordSeparator::AsciiSpace);
        textwrap::wrap(&msg.render_line(), options)
            .into_iter()
            .map(|line| line.into_owned())
            .collect()
    }

    fn clamp_scroll(&mut self) {
        let total = self.wrap_lines().len();
        let max = total.saturating_sub(self.height);
        self.scroll_offset = self.scroll_offset.min(max);
    }
}
