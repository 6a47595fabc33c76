//! # Core Application Logic
//!
//! This module contains Slackline's engine. It knows nothing about any
//! specific UI technology; the service is reached only through the
//! [`ChatService`](crate::service::ChatService) trait.
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │         CORE             │
//!                    │  (this module)           │
//!                    │                          │
//!                    │  • App (all state)       │
//!                    │  • Dispatcher (writer)   │
//!                    │  • controllers           │
//!                    └────────────┬─────────────┘
//!                                 │
//!                 ┌───────────────┴───────────────┐
//!                 ▼                               ▼
//!          ┌────────────┐                  ┌────────────┐
//!          │    TUI     │                  │  Service   │
//!          │  Adapter   │                  │  Adapter   │
//!          │ (ratatui)  │                  │  (Slack)   │
//!          └────────────┘                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`dispatch`]: The `Dispatcher`, the only thing that mutates `App`
//! - [`input`], [`channels`], [`transcript`]: the three controllers
//! - [`ingest`]: raw service messages → transcript records
//! - [`command`]: `/edit`, `/thread` and pass-through commands
//! - [`keymap`], [`action`]: modes, key bindings, and what they do
//! - [`config`]: config file and override resolution
//! - [`width`]: terminal column arithmetic

pub mod action;
pub mod channels;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod ingest;
pub mod input;
pub mod keymap;
pub mod message;
pub mod state;
pub mod transcript;
pub mod width;

pub use action::{Action, Effect};
pub use dispatch::{Dispatcher, KeyPress, TermEvent, View};
pub use keymap::{KeyMap, Mode};
pub use state::App;
