//! # Application State
//!
//! Everything the dispatcher mutates, in one place. No TUI types here;
//! the render pass only reads this (plus syncing viewport sizes back in).
//!
//! ```text
//! App
//! ├── mode: Mode                  // COMMAND / INSERT / SEARCH
//! ├── input: InputState           // message being composed
//! ├── search: String              // SEARCH buffer
//! ├── channels: ChannelList       // left pane
//! ├── transcript: Transcript      // chat pane
//! ├── users: UserCache            // author names
//! ├── short_ids: ShortIds         // session-wide [id] tags
//! ├── current_user: String        // who we are logged in as
//! ├── status: String              // last notice, shown in the bottom row
//! └── notices: VecDeque<String>   // debug column backlog
//! ```

use std::collections::VecDeque;

use chrono::Local;
use log::warn;

use crate::core::channels::ChannelList;
use crate::core::ingest::UserCache;
use crate::core::input::InputState;
use crate::core::keymap::Mode;
use crate::core::message::ShortIds;
use crate::core::transcript::Transcript;

/// Entries kept for the debug column.
pub const MAX_NOTICES: usize = 100;

#[derive(Debug, Default)]
pub struct App {
    pub mode: Mode,
    pub input: InputState,
    pub search: String,
    /// Selection to restore when a search is cancelled.
    pub search_origin: Option<usize>,
    pub channels: ChannelList,
    pub transcript: Transcript,
    pub users: UserCache,
    pub short_ids: ShortIds,
    pub current_user: String,
    pub status: String,
    pub notices: VecDeque<String>,
    /// Show the debug column.
    pub debug: bool,
}

impl App {
    pub fn new(debug: bool) -> Self {
        Self {
            status: String::from("connecting..."),
            debug,
            ..Default::default()
        }
    }

    /// Record something the user should know about: it becomes the status
    /// line and joins the debug backlog.
    pub fn notice(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!("{msg}");
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices
            .push_back(format!("{} {msg}", Local::now().format("%H:%M:%S")));
        self.status = msg;
    }
}
