//! # InputPane Component
//!
//! The editor (or, in SEARCH, the search term) in a bordered box whose
//! title carries the status line.
//!
//! Only INSERT and SEARCH place the terminal cursor; in COMMAND the box is
//! dimmed and the cursor hidden.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use crate::core::input::InputState;
use crate::core::keymap::Mode;
use crate::core::width::str_width;
use crate::tui::component::Component;
use crate::tui::theme::Palette;

/// Most editor lines shown at once; longer drafts scroll.
pub const MAX_VISIBLE_LINES: usize = 5;

pub struct InputPane<'a> {
    pub input: &'a InputState,
    pub mode: Mode,
    pub search: &'a str,
    pub status: &'a str,
    pub palette: &'a Palette,
}

impl InputPane<'_> {
    /// Rows the pane needs, borders included.
    pub fn height(input: &InputState) -> u16 {
        input.line_count().clamp(1, MAX_VISIBLE_LINES) as u16 + 2
    }
}

impl Component for InputPane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut style = self.palette.base();
        if self.mode == Mode::Command {
            style = style.add_modifier(Modifier::DIM);
        }
        let block = Block::bordered()
            .title(self.status.to_string())
            .border_style(self.palette.border())
            .style(style);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        match self.mode {
            Mode::Search => {
                let text = format!("/{}", self.search);
                let col = str_width(&text) as u16;
                frame.render_widget(Paragraph::new(Line::raw(text)).style(style), inner);
                frame.set_cursor_position(Position::new(
                    inner.x + col.min(inner.width - 1),
                    inner.y,
                ));
            }
            Mode::Insert | Mode::Command => {
                let rows = inner.height as usize;
                let first = (self.input.line() + 1).saturating_sub(rows);
                let lines: Vec<Line> = self
                    .input
                    .visible_lines()
                    .into_iter()
                    .skip(first)
                    .take(rows)
                    .map(Line::raw)
                    .collect();
                frame.render_widget(Paragraph::new(lines).style(style), inner);
                if self.mode == Mode::Insert {
                    frame.set_cursor_position(Position::new(
                        inner.x + (self.input.col() as u16).min(inner.width - 1),
                        inner.y + (self.input.line() - first) as u16,
                    ));
                }
            }
        }
    }
}
