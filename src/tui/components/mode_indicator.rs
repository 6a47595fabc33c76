use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::{Block, Paragraph};

use crate::core::keymap::Mode;
use crate::tui::component::Component;
use crate::tui::theme::Palette;

/// Width of the indicator box, borders included.
pub const WIDTH: u16 = 11;

/// The `COMMAND` / `INSERT` / `SEARCH` badge left of the input box.
pub struct ModeIndicator<'a> {
    pub mode: Mode,
    pub palette: &'a Palette,
}

impl Component for ModeIndicator<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let badge = Paragraph::new(self.mode.indicator())
            .alignment(Alignment::Center)
            .style(self.palette.mode(self.mode))
            .block(Block::bordered().border_style(self.palette.border()));
        frame.render_widget(badge, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_shows_mode_name() {
        let palette = Palette::default();
        let mut terminal = Terminal::new(TestBackend::new(WIDTH, 3)).unwrap();
        for mode in [Mode::Command, Mode::Insert, Mode::Search] {
            terminal
                .draw(|f| {
                    ModeIndicator {
                        mode,
                        palette: &palette,
                    }
                    .render(f, f.area());
                })
                .unwrap();
            let text: String = terminal
                .backend()
                .buffer()
                .content()
                .iter()
                .map(|c| c.symbol())
                .collect();
            assert!(text.contains(mode.indicator()));
        }
    }
}
