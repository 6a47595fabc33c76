//! # Channel List
//!
//! Left pane state: every conversation the user can open, a selection
//! cursor, and a viewport that scrolls to keep the selection visible.
//!
//! ```text
//!   entries      offset ─┐
//!   0 #general           │
//!   1 #random    ◄───────┘  row 1
//!   2 #dev                  row 2   ◄── selected (cursor_row = 2)
//!   3 secret-group          row 3   (viewport_height = 3)
//!   4 ● alice
//! ```
//!
//! Rows are counted from 1 (row 0 is the pane border), so
//! `cursor_row == selected - offset + 1` always holds.

pub use crate::service::types::{ChannelKind, Presence};

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEntry {
    pub id: String,
    pub name: String,
    pub topic: Option<String>,
    pub kind: ChannelKind,
    /// Only meaningful for `Direct` entries.
    pub presence: Presence,
    pub notification: bool,
    /// Peer user of a `Direct` entry.
    pub user_id: Option<String>,
}

impl ChannelEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            topic: None,
            kind,
            presence: Presence::Unknown,
            notification: false,
            user_id: None,
        }
    }

    /// Text shown in the pane and matched by search.
    pub fn label(&self) -> String {
        match self.kind {
            ChannelKind::Channel => format!("#{}", self.name),
            ChannelKind::Group => self.name.clone(),
            ChannelKind::Direct => {
                let icon = match self.presence {
                    Presence::Active => '●',
                    Presence::Away => '○',
                    Presence::Unknown => ' ',
                };
                format!("{icon} {}", self.name)
            }
        }
    }
}

#[derive(Debug)]
pub struct ChannelList {
    entries: Vec<ChannelEntry>,
    selected: usize,
    offset: usize,
    cursor_row: usize,
    viewport_height: usize,
}

impl Default for ChannelList {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelList {
    const DEFAULT_HEIGHT: usize = 20;

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
            offset: 0,
            cursor_row: 1,
            viewport_height: Self::DEFAULT_HEIGHT,
        }
    }

    /// Replace the entries, keeping kind order (channels, groups, directs)
    /// and the service's order within each kind.
    pub fn set_channels(&mut self, mut entries: Vec<ChannelEntry>) {
        entries.sort_by_key(|e| match e.kind {
            ChannelKind::Channel => 0,
            ChannelKind::Group => 1,
            ChannelKind::Direct => 2,
        });
        self.entries = entries;
        self.move_top();
    }

    pub fn entries(&self) -> &[ChannelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected(&self) -> Option<&ChannelEntry> {
        self.entries.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Entries currently inside the viewport, with their absolute index.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &ChannelEntry)> {
        self.entries
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(self.viewport_height)
    }

    fn max_offset(&self) -> usize {
        self.entries.len().saturating_sub(self.viewport_height)
    }

    pub fn move_up(&mut self) {
        if self.selected == 0 {
            return;
        }
        self.selected -= 1;
        if self.cursor_row == 1 && self.offset > 0 {
            self.offset -= 1;
        } else {
            self.cursor_row -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 >= self.entries.len() {
            return;
        }
        self.selected += 1;
        if self.cursor_row == self.viewport_height && self.offset < self.max_offset() {
            self.offset += 1;
        } else {
            self.cursor_row += 1;
        }
    }

    pub fn move_top(&mut self) {
        self.selected = 0;
        self.offset = 0;
        self.cursor_row = 1;
    }

    pub fn move_bottom(&mut self) {
        if self.entries.is_empty() {
            return self.move_top();
        }
        self.selected = self.entries.len() - 1;
        if self.entries.len() <= self.viewport_height {
            self.offset = 0;
            self.cursor_row = self.selected + 1;
        } else {
            self.offset = self.max_offset();
            self.cursor_row = self.viewport_height;
        }
    }

    /// Select the first entry whose label contains `term`, shifting the
    /// viewport as little as possible. Returns whether anything matched.
    pub fn search(&mut self, term: &str) -> bool {
        let Some(i) = self.entries.iter().position(|e| e.label().contains(term)) else {
            return false;
        };
        self.select(i);
        true
    }

    /// Jump to index `i`, keeping the viewport shift minimal.
    pub fn select(&mut self, i: usize) {
        if i >= self.entries.len() {
            return;
        }
        self.selected = i;
        if i < self.offset {
            self.offset = i;
        } else if i >= self.offset + self.viewport_height {
            self.offset = i + 1 - self.viewport_height;
        }
        self.cursor_row = i - self.offset + 1;
    }

    /// Resize the viewport, scrolling if the selection fell out of it.
    pub fn set_viewport_height(&mut self, height: usize) {
        let height = height.max(1);
        if height == self.viewport_height {
            return;
        }
        self.viewport_height = height;
        self.offset = self.offset.min(self.max_offset());
        self.select(self.selected);
    }

    pub fn mark_notification(&mut self, id: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.notification = true;
        }
    }

    pub fn clear_notification(&mut self, id: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.notification = false;
        }
    }

    /// Update presence of the direct conversation with `user_id`.
    pub fn set_presence(&mut self, user_id: &str, presence: Presence) -> bool {
        let mut changed = false;
        for entry in self.entries.iter_mut().filter(|e| {
            e.kind == ChannelKind::Direct && e.user_id.as_deref() == Some(user_id)
        }) {
            entry.presence = presence;
            changed = true;
        }
        changed
    }

    pub fn find(&self, id: &str) -> Option<&ChannelEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// User IDs behind the direct entries, for presence subscription.
    pub fn direct_peers(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.kind == ChannelKind::Direct)
            .filter_map(|e| e.user_id.clone())
            .collect()
    }
}
