//! # Dispatcher
//!
//! The only code that mutates [`App`]. Three sources feed it:
//!
//! ```text
//!   terminal poll thread ──TermEvent────┐
//!                                       ├──► select! ──► controllers ──► View::draw
//!   stream task ──────────StreamEvent───┤
//!                                       │
//!   channel-switch deadline ────────────┘
//! ```
//!
//! Each event is applied completely before the next one is taken, and a
//! redraw happens once at the end of it. Service calls are awaited inline,
//! so while one is in flight no other event is applied.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc::Receiver;
use tokio::time::{Instant, sleep_until};

use crate::core::action::{Action, Effect};
use crate::core::channels::ChannelEntry;
use crate::core::command::{self, Outcome};
use crate::core::config::{DEFAULT_DEBOUNCE_MS, DEFAULT_HISTORY_COUNT};
use crate::core::ingest::{MessageBuilder, unescape};
use crate::core::keymap::{KeyMap, Mode};
use crate::core::state::App;
use crate::service::{ChannelKind, ChatService, RawMessage, ServiceError, StreamEvent};

/// One normalized keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// Key string as used in the key map: `j`, `C-c`, `<enter>`.
    pub key: String,
    /// The printable rune, when the key produces one.
    pub rune: Option<char>,
}

impl KeyPress {
    pub fn named(key: &str) -> Self {
        Self {
            key: key.to_string(),
            rune: None,
        }
    }

    pub fn rune(c: char) -> Self {
        Self {
            key: c.to_string(),
            rune: Some(c),
        }
    }
}

/// What the terminal producer hands the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermEvent {
    Key(KeyPress),
    /// The terminal changed size; repaint everything.
    Resize,
}

/// Something that can paint the application state.
///
/// Takes `&mut App` so the render pass can tell the controllers how big
/// their panes turned out to be.
pub trait View {
    fn draw(&mut self, app: &mut App) -> std::io::Result<()>;
}

pub struct Dispatcher<V: View> {
    pub app: App,
    view: V,
    service: Arc<dyn ChatService>,
    keymap: KeyMap,
    history_count: usize,
    debounce: Duration,
    /// When the selected channel gets loaded, if a switch is pending.
    pending_switch: Option<Instant>,
}

impl<V: View> Dispatcher<V> {
    pub fn new(app: App, view: V, service: Arc<dyn ChatService>, keymap: KeyMap) -> Self {
        Self {
            app,
            view,
            service,
            keymap,
            history_count: DEFAULT_HISTORY_COUNT,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            pending_switch: None,
        }
    }

    pub fn with_history_count(mut self, count: usize) -> Self {
        self.history_count = count;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn pending_switch(&self) -> Option<Instant> {
        self.pending_switch
    }

    /// Authenticate, fill the user cache and channel list, and show the
    /// first channel. Errors here are fatal.
    pub async fn bootstrap(&mut self) -> Result<(), ServiceError> {
        self.app.current_user = self.service.auth().await?;
        info!("Authenticated as {}", self.app.current_user);

        match self.service.list_users().await {
            Ok(users) => self.app.users.seed(&users),
            Err(e) => self.app.notice(format!("listing users: {e}")),
        }

        let descriptors = self.service.list_channels().await?;
        let entries: Vec<ChannelEntry> = descriptors
            .into_iter()
            .map(|d| {
                let name = match (d.kind, d.user_id.as_deref()) {
                    (ChannelKind::Direct, Some(user_id)) => self
                        .app
                        .users
                        .user(user_id)
                        .map(str::to_string)
                        .unwrap_or(d.name),
                    _ => d.name,
                };
                ChannelEntry {
                    topic: d.topic,
                    user_id: d.user_id,
                    ..ChannelEntry::new(d.id, name, d.kind)
                }
            })
            .collect();
        info!("{} conversations", entries.len());
        self.app.channels.set_channels(entries);

        self.load_selected().await;
        self.app.status = format!("logged in as {}", self.author_name());
        Ok(())
    }

    /// Process events until quit or until the terminal source goes away.
    pub async fn run(
        &mut self,
        mut terminal: Receiver<TermEvent>,
        mut events: Receiver<StreamEvent>,
    ) {
        self.redraw();
        loop {
            let deadline = self.pending_switch.unwrap_or_else(Instant::now);
            let effect = tokio::select! {
                term = terminal.recv() => match term {
                    Some(TermEvent::Key(key)) => self.handle_key(&key).await,
                    Some(TermEvent::Resize) => Effect::Redraw,
                    None => Effect::Quit,
                },
                Some(event) = events.recv() => self.handle_stream(event).await,
                () = sleep_until(deadline), if self.pending_switch.is_some() => {
                    self.fire_channel_switch().await
                }
            };
            match effect {
                Effect::Quit => break,
                Effect::Redraw => self.redraw(),
                Effect::None => {}
            }
        }
        info!("Dispatcher stopped");
    }

    pub fn redraw(&mut self) {
        if let Err(e) = self.view.draw(&mut self.app) {
            log::error!("Redraw failed: {e}");
        }
    }

    // ------------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------------

    pub async fn handle_key(&mut self, press: &KeyPress) -> Effect {
        let mode = self.app.mode;
        if let Some(action) = self.keymap.lookup(mode, &press.key) {
            debug!("{mode} {} -> {action}", press.key);
            return self.apply(action).await;
        }
        match (mode, press.rune) {
            (Mode::Insert, Some(r)) => {
                self.app.input.insert(r);
                Effect::Redraw
            }
            (Mode::Search, Some(r)) => {
                self.app.search.push(r);
                self.run_search();
                Effect::Redraw
            }
            _ => Effect::None,
        }
    }

    async fn apply(&mut self, action: Action) -> Effect {
        let mode = self.app.mode;
        match action {
            Action::Quit => return Effect::Quit,
            Action::ModeCommand => {
                if mode == Mode::Search {
                    self.cancel_search();
                }
                self.app.mode = Mode::Command;
            }
            Action::ModeInsert => self.app.mode = Mode::Insert,
            Action::ModeSearch => {
                self.app.search.clear();
                self.app.search_origin = Some(self.app.channels.selected_index());
                self.app.mode = Mode::Search;
            }
            Action::Send => match mode {
                Mode::Insert => return self.send().await,
                Mode::Search => {
                    self.app.search.clear();
                    self.app.search_origin = None;
                    self.app.mode = Mode::Command;
                    self.schedule_switch();
                }
                Mode::Command => return Effect::None,
            },
            Action::Space => match mode {
                Mode::Insert => self.app.input.insert(' '),
                Mode::Search => {
                    self.app.search.push(' ');
                    self.run_search();
                }
                Mode::Command => return Effect::None,
            },
            Action::Backspace => match mode {
                Mode::Insert => self.app.input.backspace(),
                Mode::Search => {
                    self.app.search.pop();
                    self.run_search();
                }
                Mode::Command => return Effect::None,
            },
            Action::Delete => self.app.input.delete(),
            Action::CursorLeft => self.app.input.move_left(),
            Action::CursorRight => self.app.input.move_right(),
            Action::CursorUp => self.app.input.move_up(),
            Action::CursorDown => self.app.input.move_down(),
            Action::ChannelUp => self.app.channels.move_up(),
            Action::ChannelDown => self.app.channels.move_down(),
            Action::ChannelTop => self.app.channels.move_top(),
            Action::ChannelBottom => self.app.channels.move_bottom(),
            Action::ChatUp => {
                let page = self.chat_page();
                self.app.transcript.scroll_up(page);
            }
            Action::ChatDown => {
                let page = self.chat_page();
                self.app.transcript.scroll_down(page);
            }
        }
        if action.moves_channel_cursor() {
            self.schedule_switch();
        }
        Effect::Redraw
    }

    fn chat_page(&self) -> usize {
        (self.app.transcript.height() / 2).max(1)
    }

    fn run_search(&mut self) {
        if self.app.search.is_empty() {
            if let Some(origin) = self.app.search_origin {
                self.app.channels.select(origin);
            }
            return;
        }
        let term = self.app.search.clone();
        if !self.app.channels.search(&term) {
            self.app.status = format!("no match for {term:?}");
        }
    }

    fn cancel_search(&mut self) {
        if let Some(origin) = self.app.search_origin.take() {
            self.app.channels.select(origin);
        }
        self.app.search.clear();
    }

    /// (Re)start the channel-switch timer; any earlier deadline is dropped.
    fn schedule_switch(&mut self) {
        self.pending_switch = Some(Instant::now() + self.debounce);
    }

    pub async fn fire_channel_switch(&mut self) -> Effect {
        self.pending_switch = None;
        self.load_selected().await;
        Effect::Redraw
    }

    async fn load_selected(&mut self) {
        let Some(channel) = self.app.channels.selected().cloned() else {
            return;
        };
        if self.app.transcript.channel_id() == Some(channel.id.as_str()) {
            self.app.channels.clear_notification(&channel.id);
            return;
        }
        let mut builder = MessageBuilder::new(
            self.service.as_ref(),
            &mut self.app.users,
            &mut self.app.short_ids,
        );
        match self
            .app
            .transcript
            .load(&channel, &mut builder, self.history_count)
            .await
        {
            Ok(()) => self.app.channels.clear_notification(&channel.id),
            Err(e) => self.app.notice(format!("loading {}: {e}", channel.label())),
        }
    }

    /// Clear the input, show that, then post or run the command.
    async fn send(&mut self) -> Effect {
        if self.app.input.is_empty() {
            return Effect::None;
        }
        let text = self.app.input.text();
        self.app.input.clear();
        self.redraw();

        let Some(channel) = self.app.channels.selected().map(|c| c.id.clone()) else {
            self.app.input.set_text(&text);
            self.app.notice("no channel selected");
            return Effect::Redraw;
        };

        if !text.starts_with('/') {
            if let Err(e) = self.service.post(&channel, &text).await {
                self.app.notice(format!("send failed: {e}"));
            }
            return Effect::Redraw;
        }

        // Short IDs belong to the transcript on screen, not the selection.
        let target = self
            .app
            .transcript
            .channel_id()
            .map(str::to_string)
            .unwrap_or(channel);
        let result = match command::parse(&text) {
            Ok(cmd) => {
                command::execute(cmd, &target, &self.app.transcript, self.service.as_ref()).await
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(Outcome::Done) => {}
            Ok(Outcome::Refill(refill)) => {
                self.app.input.set_text(&refill);
                self.app.mode = Mode::Insert;
            }
            Err(e) => {
                if e.is_user_input() {
                    self.app.input.set_text(&text);
                }
                self.app.notice(e.to_string());
            }
        }
        Effect::Redraw
    }

    // ------------------------------------------------------------------------
    // Stream
    // ------------------------------------------------------------------------

    pub async fn handle_stream(&mut self, event: StreamEvent) -> Effect {
        match event {
            StreamEvent::Message(raw) => self.incoming(raw).await,
            StreamEvent::MessageChanged { channel, message } => {
                if self.app.transcript.channel_id() == Some(channel.as_str())
                    && self
                        .app
                        .transcript
                        .replace_text(&message.ts, &unescape(&message.text))
                {
                    Effect::Redraw
                } else {
                    Effect::None
                }
            }
            StreamEvent::Presence { user_id, presence } => {
                if self.app.channels.set_presence(&user_id, presence) {
                    Effect::Redraw
                } else {
                    Effect::None
                }
            }
            StreamEvent::Connected => {
                self.app.status = "connected".to_string();
                Effect::Redraw
            }
            StreamEvent::Reconnecting { reason } => {
                self.app.notice(format!("stream lost ({reason}), reconnecting"));
                Effect::Redraw
            }
        }
    }

    async fn incoming(&mut self, raw: RawMessage) -> Effect {
        let Some(channel) = raw.channel.clone() else {
            debug!("Dropping message without channel: {}", raw.ts);
            return Effect::None;
        };

        let mut effect = Effect::None;
        if self.app.transcript.channel_id() == Some(channel.as_str())
            && !self.app.transcript.has_message(&raw.ts)
        {
            let mut builder = MessageBuilder::new(
                self.service.as_ref(),
                &mut self.app.users,
                &mut self.app.short_ids,
            );
            let records = builder.build(&raw).await;
            for record in records {
                if self.app.transcript.append(record) {
                    effect = Effect::Redraw;
                }
            }
        }

        if raw.user.as_deref() != Some(self.app.current_user.as_str()) {
            self.app.channels.mark_notification(&channel);
            effect = Effect::Redraw;
        }
        effect
    }

    fn author_name(&self) -> String {
        self.app
            .users
            .user(&self.app.current_user)
            .unwrap_or(&self.app.current_user)
            .to_string()
    }
}
