//! # ChannelPane Component
//!
//! Left pane: the visible slice of the channel list.
//!
//! ```text
//! ┌Channels────┐
//! │  #general  │
//! │* #random   │  ← notification marker
//! │  #dev      │  ← selected: fg/bg swapped, padded to the pane width
//! │  ● alice   │
//! └────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use crate::core::channels::ChannelList;
use crate::core::width::pad_to_width;
use crate::tui::component::Component;
use crate::tui::theme::Palette;

pub struct ChannelPane<'a> {
    pub list: &'a ChannelList,
    pub palette: &'a Palette,
}

impl Component for ChannelPane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title("Channels")
            .border_style(self.palette.border())
            .style(self.palette.base());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width as usize;
        let selected = self.list.selected_index();
        let lines: Vec<Line> = self
            .list
            .visible()
            .map(|(i, entry)| {
                let marker = if entry.notification { "* " } else { "  " };
                let text = pad_to_width(&format!("{marker}{}", entry.label()), width);
                let style = if i == selected {
                    self.palette.selected()
                } else if entry.notification {
                    self.palette.base().fg(self.palette.notification)
                } else {
                    self.palette.base()
                };
                Line::styled(text, style)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}
