//! # DebugPane Component
//!
//! Optional right-hand column (`--debug`) listing recent engine notices,
//! newest at the bottom.

use std::collections::VecDeque;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::tui::component::Component;
use crate::tui::theme::Palette;

pub struct DebugPane<'a> {
    pub notices: &'a VecDeque<String>,
    pub palette: &'a Palette,
}

impl Component for DebugPane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title("Debug")
            .border_style(self.palette.border())
            .style(self.palette.base());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let skip = self.notices.len().saturating_sub(inner.height as usize);
        let lines: Vec<Line> = self
            .notices
            .iter()
            .skip(skip)
            .map(|n| Line::raw(n.as_str()))
            .collect();
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}
