//! # ChatPane Component
//!
//! The transcript, painted from the bottom row upward so the newest line
//! always sits just above the border. The border title is the channel
//! label and topic.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};

use crate::core::transcript::Transcript;
use crate::tui::component::Component;
use crate::tui::theme::Palette;

pub struct ChatPane<'a> {
    pub transcript: &'a Transcript,
    pub palette: &'a Palette,
}

impl Component for ChatPane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut block = Block::bordered()
            .title(self.transcript.border_label().to_string())
            .border_style(self.palette.border())
            .style(self.palette.base());
        if self.transcript.scroll_offset() > 0 {
            block = block.title_bottom(format!("↑ {} more", self.transcript.scroll_offset()));
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = self.transcript.visible_lines();
        let height = (lines.len() as u16).min(inner.height);
        let target = Rect {
            y: inner.y + inner.height - height,
            height,
            ..inner
        };
        let lines: Vec<Line> = lines
            .into_iter()
            .map(|(kind, text)| Line::styled(text, self.palette.message(kind)))
            .collect();
        frame.render_widget(Paragraph::new(lines), target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{Message, MessageKind, ShortId};
    use chrono::{Local, TimeZone};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    fn message(id: u32, text: &str) -> Message {
        Message {
            time: Local.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single().unwrap(),
            author: "bob".to_string(),
            text: text.to_string(),
            kind: MessageKind::Normal,
            short_id: Some(ShortId(id)),
            ts: format!("{id}.0"),
            thread_ts: None,
        }
    }

    fn draw(transcript: &mut Transcript, width: u16, height: u16) -> Vec<String> {
        transcript.set_viewport(width as usize - 2, height as usize - 2);
        let palette = Palette::default();
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| {
                ChatPane {
                    transcript: &*transcript,
                    palette: &palette,
                }
                .render(f, f.area());
            })
            .unwrap();
        rows(&terminal)
    }

    #[test]
    fn test_newest_line_sits_at_the_bottom() {
        let mut transcript = Transcript::new();
        transcript.set_border_label("#general");
        transcript.append(message(1, "first"));
        transcript.append(message(2, "second"));

        let rows = draw(&mut transcript, 40, 6);
        assert!(rows[0].contains("#general"));
        assert!(rows[1].trim_matches(|c| c == '│' || c == ' ').is_empty());
        assert!(rows[3].contains("[09:30] [01] <bob> first"));
        assert!(rows[4].contains("[09:30] [02] <bob> second"));
    }

    #[test]
    fn test_scrolled_view_shows_older_lines() {
        let mut transcript = Transcript::new();
        for i in 1..=10 {
            transcript.append(message(i, &format!("line {i}")));
        }
        transcript.set_viewport(38, 4);
        transcript.scroll_up(3);

        let rows = draw(&mut transcript, 40, 6);
        assert!(rows[4].contains("line 7"));
        assert!(rows[1].contains("line 4"));
        assert!(rows[5].contains("3 more"));
    }
}
