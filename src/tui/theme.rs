//! Color palettes for the `dark` and `light` themes.

use ratatui::style::{Color, Modifier, Style};

use crate::core::config::Theme;
use crate::core::keymap::Mode;
use crate::core::message::MessageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub border: Color,
    pub notification: Color,
    pub reply: Color,
    pub attachment: Color,
    pub command: Color,
    pub insert: Color,
    pub search: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                fg: Color::White,
                bg: Color::Black,
                border: Color::DarkGray,
                notification: Color::Red,
                reply: Color::Cyan,
                attachment: Color::Yellow,
                command: Color::Blue,
                insert: Color::Green,
                search: Color::Magenta,
            },
            Theme::Light => Self {
                fg: Color::Black,
                bg: Color::White,
                border: Color::Gray,
                notification: Color::Red,
                reply: Color::Blue,
                attachment: Color::Rgb(150, 100, 0),
                command: Color::Blue,
                insert: Color::Green,
                search: Color::Magenta,
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Foreground and background swapped.
    pub fn selected(&self) -> Style {
        Style::default().fg(self.bg).bg(self.fg)
    }

    pub fn border(&self) -> Style {
        self.base().fg(self.border)
    }

    pub fn mode(&self, mode: Mode) -> Style {
        let color = match mode {
            Mode::Command => self.command,
            Mode::Insert => self.insert,
            Mode::Search => self.search,
        };
        Style::default()
            .fg(self.bg)
            .bg(color)
            .add_modifier(Modifier::BOLD)
    }

    pub fn message(&self, kind: MessageKind) -> Style {
        match kind {
            MessageKind::Normal => self.base(),
            MessageKind::Reply => self.base().fg(self.reply),
            MessageKind::Attachment => self.base().fg(self.attachment),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_theme(Theme::default())
    }
}
