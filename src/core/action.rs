//! # Actions
//!
//! Every key binding resolves to an `Action`. The names are the ones users
//! write in the `key_map` section of the config file.
//!
//! ```text
//! (mode, "C-b")  →  keymap  →  Action::ChatUp  →  dispatcher
//! ```

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    ModeCommand,
    ModeInsert,
    ModeSearch,
    Send,
    Space,
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    ChannelUp,
    ChannelDown,
    ChannelTop,
    ChannelBottom,
    ChatUp,
    ChatDown,
}

impl Action {
    pub const ALL: [Action; 18] = [
        Action::Quit,
        Action::ModeCommand,
        Action::ModeInsert,
        Action::ModeSearch,
        Action::Send,
        Action::Space,
        Action::Backspace,
        Action::Delete,
        Action::CursorLeft,
        Action::CursorRight,
        Action::CursorUp,
        Action::CursorDown,
        Action::ChannelUp,
        Action::ChannelDown,
        Action::ChannelTop,
        Action::ChannelBottom,
        Action::ChatUp,
        Action::ChatDown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Quit => "quit",
            Action::ModeCommand => "mode-command",
            Action::ModeInsert => "mode-insert",
            Action::ModeSearch => "mode-search",
            Action::Send => "send",
            Action::Space => "space",
            Action::Backspace => "backspace",
            Action::Delete => "delete",
            Action::CursorLeft => "cursor-left",
            Action::CursorRight => "cursor-right",
            Action::CursorUp => "cursor-up",
            Action::CursorDown => "cursor-down",
            Action::ChannelUp => "channel-up",
            Action::ChannelDown => "channel-down",
            Action::ChannelTop => "channel-top",
            Action::ChannelBottom => "channel-bottom",
            Action::ChatUp => "chat-up",
            Action::ChatDown => "chat-down",
        }
    }

    /// Actions that move the channel cursor and so (re)start the
    /// channel-switch timer.
    pub fn moves_channel_cursor(self) -> bool {
        matches!(
            self,
            Action::ChannelUp | Action::ChannelDown | Action::ChannelTop | Action::ChannelBottom
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// What the TUI loop should do after the dispatcher handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing visible changed.
    None,
    Redraw,
    Quit,
}
