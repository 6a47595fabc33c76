//! # TUI Components
//!
//! All components here are props-based: they borrow what they show from
//! `App` for the duration of one render and hold no state of their own.
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── channel_list.rs    (left pane)
//! ├── chat.rs            (transcript pane)
//! ├── debug_log.rs       (optional notice column)
//! ├── input_box.rs       (editor / search term + status)
//! └── mode_indicator.rs  (COMMAND / INSERT / SEARCH badge)
//! ```
//!
//! Each file carries its own `TestBackend` tests.

pub mod channel_list;
pub mod chat;
pub mod debug_log;
pub mod input_box;
pub mod mode_indicator;

pub use channel_list::ChannelPane;
pub use chat::ChatPane;
pub use debug_log::DebugPane;
pub use input_box::InputPane;
pub use mode_indicator::ModeIndicator;
