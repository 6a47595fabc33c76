//! # TUI Adapter
//!
//! The ratatui-specific layer: terminal setup and teardown, the key poller,
//! and a [`View`] that paints [`App`] with the components.
//!
//! This is the only module that knows about ratatui and crossterm. The
//! dispatcher only sees [`View`] and [`TermEvent`]s.
//!
//! ## Startup order
//!
//! Bootstrap (auth, channel list, first history) runs before the terminal
//! enters raw mode so a bad token prints a plain error on a normal screen.
//! The view has no terminal until then and draws nothing.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call.

mod component;
mod components;
mod event;
mod theme;
mod ui;

use std::fmt;
use std::io::stdout;
use std::sync::Arc;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::execute;
use log::{info, warn};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::core::config::ResolvedConfig;
use crate::core::dispatch::{Dispatcher, TermEvent, View};
use crate::core::state::App;
use crate::service::{ChatService, ServiceError, StreamEvent};

pub use theme::Palette;
pub use ui::UiStyle;

/// Terminal events waiting for the dispatcher.
const TERM_QUEUE: usize = 20;
/// Stream events waiting for the dispatcher.
const STREAM_QUEUE: usize = 50;

/// Why the client stopped.
#[derive(Debug)]
pub enum RunError {
    /// Startup could not reach or authenticate with the service.
    Service(ServiceError),
    /// The terminal could not be driven.
    Io(std::io::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Service(e) => write!(f, "{e}"),
            RunError::Io(e) => write!(f, "terminal error: {e}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ServiceError> for RunError {
    fn from(e: ServiceError) -> Self {
        RunError::Service(e)
    }
}

impl From<std::io::Error> for RunError {
    fn from(e: std::io::Error) -> Self {
        RunError::Io(e)
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), Show, SetCursorStyle::SteadyBlock)?;
        info!("Terminal modes enabled (steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), SetCursorStyle::DefaultUserShape, Hide);
    }
}

/// Paints the app into a ratatui terminal once one is attached.
pub struct TuiView {
    terminal: Option<DefaultTerminal>,
    style: UiStyle,
}

impl TuiView {
    pub fn new(style: UiStyle) -> Self {
        Self {
            terminal: None,
            style,
        }
    }

    pub fn attach(&mut self, terminal: DefaultTerminal) {
        self.terminal = Some(terminal);
    }

    pub fn detach(&mut self) -> Option<DefaultTerminal> {
        self.terminal.take()
    }
}

impl View for TuiView {
    fn draw(&mut self, app: &mut App) -> std::io::Result<()> {
        let Some(terminal) = self.terminal.as_mut() else {
            return Ok(());
        };
        let style = &self.style;
        terminal.draw(|f| ui::draw_ui(f, app, style))?;
        Ok(())
    }
}

/// Connect, take over the terminal, and run until the user quits.
pub async fn run(
    config: ResolvedConfig,
    service: Arc<dyn ChatService>,
    debug: bool,
) -> Result<(), RunError> {
    let style = UiStyle {
        palette: Palette::for_theme(config.theme),
        sidebar_width: config.sidebar_width,
    };
    let mut dispatcher = Dispatcher::new(
        App::new(debug),
        TuiView::new(style),
        service.clone(),
        config.key_map,
    )
    .with_history_count(config.history_count)
    .with_debounce(config.debounce);

    dispatcher.bootstrap().await?;

    let (stream_tx, stream_rx) = mpsc::channel::<StreamEvent>(STREAM_QUEUE);
    let presence_ids = dispatcher.app.channels.direct_peers();
    let stream = tokio::spawn(async move {
        if let Err(e) = service.stream_events(presence_ids, stream_tx).await {
            warn!("Event stream ended: {e}");
        }
    });

    dispatcher.view_mut().attach(ratatui::init());
    let guard = TerminalModeGuard::new();
    if let Err(e) = &guard {
        warn!("Could not set terminal modes: {e}");
    }

    let (term_tx, term_rx) = mpsc::channel::<TermEvent>(TERM_QUEUE);
    let poller = event::spawn_poller(term_tx);

    dispatcher.run(term_rx, stream_rx).await;

    stream.abort();
    drop(guard);
    dispatcher.view_mut().detach();
    ratatui::restore();
    if poller.join().is_err() {
        warn!("Terminal poller panicked");
    }
    info!("Slackline stopped");
    Ok(())
}
