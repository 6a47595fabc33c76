//! Terminal input producer.
//!
//! A plain thread blocks on crossterm's poll and forwards normalized key
//! strings to the dispatcher. Key strings follow the key map's spelling:
//! bare runes (`j`, `G`), `C-`/`M-` prefixes for control and alt, and
//! bracketed names for the rest (`<enter>`, `<previous>`, `<f5>`).

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error};
use tokio::sync::mpsc::Sender;

use crate::core::dispatch::{KeyPress, TermEvent};

/// How long one poll blocks before the thread re-checks the channel.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn named(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Insert => "insert".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "previous".to_string(),
        KeyCode::PageDown => "next".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::F(n @ 1..=12) => format!("f{n}"),
        _ => return None,
    };
    Some(format!("<{name}>"))
}

/// Turn a crossterm key event into the key map's spelling. Releases and
/// keys without a spelling yield `None`.
pub fn normalize(event: KeyEvent) -> Option<KeyPress> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let mut prefix = String::new();
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        prefix.push_str("C-");
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        prefix.push_str("M-");
    }

    if let Some(name) = named(event.code) {
        return Some(KeyPress::named(&format!("{prefix}{name}")));
    }
    match event.code {
        KeyCode::Char(c) if prefix.is_empty() => Some(KeyPress::rune(c)),
        KeyCode::Char(c) => Some(KeyPress::named(&format!("{prefix}{}", c.to_ascii_lowercase()))),
        _ => None,
    }
}

fn translate(event: Event) -> Option<TermEvent> {
    match event {
        Event::Key(key) => normalize(key).map(TermEvent::Key),
        Event::Resize(..) => Some(TermEvent::Resize),
        _ => None,
    }
}

/// Start the poll thread. It stops once the dispatcher drops the receiver
/// or the terminal stops answering.
pub fn spawn_poller(tx: Sender<TermEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    error!("terminal poll failed: {e}");
                    break;
                }
            }
            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    error!("terminal read failed: {e}");
                    break;
                }
            };
            let Some(out) = translate(event) else {
                continue;
            };
            if let TermEvent::Key(press) = &out {
                debug!("key {}", press.key);
            }
            if tx.blocking_send(out).is_err() {
                break;
            }
        }
        debug!("terminal poller stopped");
    })
}
