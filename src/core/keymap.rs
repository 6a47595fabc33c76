//! # Modes and Key Bindings
//!
//! A binding maps `(mode, key string)` to an [`Action`]. Key strings are the
//! normalized form produced by the TUI: a bare rune (`j`, `G`), a modified
//! key (`C-c`, `M-x`), or a named key (`<enter>`, `<f5>`).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::core::action::Action;
use crate::core::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Command,
    Insert,
    Search,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Command => "command",
            Mode::Insert => "insert",
            Mode::Search => "search",
        }
    }

    /// Text of the mode indicator in the bottom row.
    pub fn indicator(self) -> &'static str {
        match self {
            Mode::Command => "COMMAND",
            Mode::Insert => "INSERT",
            Mode::Search => "SEARCH",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "command" => Ok(Mode::Command),
            "insert" => Ok(Mode::Insert),
            "search" => Ok(Mode::Search),
            other => Err(other.to_string()),
        }
    }
}

const COMMAND_DEFAULTS: &[(&str, Action)] = &[
    ("i", Action::ModeInsert),
    ("/", Action::ModeSearch),
    ("k", Action::ChannelUp),
    ("<up>", Action::ChannelUp),
    ("j", Action::ChannelDown),
    ("<down>", Action::ChannelDown),
    ("g", Action::ChannelTop),
    ("<home>", Action::ChannelTop),
    ("G", Action::ChannelBottom),
    ("<end>", Action::ChannelBottom),
    ("<previous>", Action::ChatUp),
    ("C-b", Action::ChatUp),
    ("C-u", Action::ChatUp),
    ("<next>", Action::ChatDown),
    ("C-f", Action::ChatDown),
    ("C-d", Action::ChatDown),
    ("q", Action::Quit),
    ("C-c", Action::Quit),
];

const INSERT_DEFAULTS: &[(&str, Action)] = &[
    ("<left>", Action::CursorLeft),
    ("<right>", Action::CursorRight),
    ("<up>", Action::CursorUp),
    ("<down>", Action::CursorDown),
    ("<enter>", Action::Send),
    ("<escape>", Action::ModeCommand),
    ("<backspace>", Action::Backspace),
    ("<delete>", Action::Delete),
    ("<space>", Action::Space),
    ("C-c", Action::Quit),
];

const SEARCH_DEFAULTS: &[(&str, Action)] = &[
    ("<enter>", Action::Send),
    ("<escape>", Action::ModeCommand),
    ("<backspace>", Action::Backspace),
    ("<space>", Action::Space),
    ("C-c", Action::Quit),
];

const EMACS_INSERT: &[(&str, Action)] = &[
    ("C-b", Action::CursorLeft),
    ("C-f", Action::CursorRight),
    ("C-p", Action::CursorUp),
    ("C-n", Action::CursorDown),
    ("C-d", Action::Delete),
    ("C-h", Action::Backspace),
];

#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: HashMap<Mode, HashMap<String, Action>>,
}

impl KeyMap {
    /// The built-in bindings.
    pub fn defaults() -> Self {
        let mut map = Self::default();
        map.bind_all(Mode::Command, COMMAND_DEFAULTS);
        map.bind_all(Mode::Insert, INSERT_DEFAULTS);
        map.bind_all(Mode::Search, SEARCH_DEFAULTS);
        map
    }

    /// Add the emacs-style editing keys to INSERT.
    pub fn with_emacs(mut self) -> Self {
        self.bind_all(Mode::Insert, EMACS_INSERT);
        self
    }

    pub fn bind(&mut self, mode: Mode, key: &str, action: Action) {
        self.bindings
            .entry(mode)
            .or_default()
            .insert(key.to_string(), action);
    }

    /// Layer user bindings (`mode → key → action name`) over the current ones.
    pub fn merge(
        &mut self,
        overrides: &HashMap<String, HashMap<String, String>>,
    ) -> Result<(), ConfigError> {
        for (mode_name, keys) in overrides {
            let mode = mode_name
                .parse::<Mode>()
                .map_err(|m| ConfigError::Invalid(format!("unknown mode {m:?} in key_map")))?;
            for (key, action_name) in keys {
                let action = action_name.parse::<Action>().map_err(|name| {
                    ConfigError::UnknownAction {
                        mode: mode_name.clone(),
                        key: key.clone(),
                        action: name,
                    }
                })?;
                self.bind(mode, key, action);
            }
        }
        Ok(())
    }

    pub fn lookup(&self, mode: Mode, key: &str) -> Option<Action> {
        self.bindings.get(&mode)?.get(key).copied()
    }

    fn bind_all(&mut self, mode: Mode, pairs: &[(&str, Action)]) {
        for (key, action) in pairs {
            self.bind(mode, key, *action);
        }
    }
}
