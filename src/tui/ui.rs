//! Screen layout.
//!
//! ```text
//! ┌Channels─┐┌#general - topic─────────────────┐┌Debug──────┐
//! │         ││                                 ││           │  top row:
//! │         ││                                 ││           │  sidebar | chat | debug
//! └─────────┘└─────────────────────────────────┘└───────────┘  (12-column grid)
//! ┌─────────┐┌status───────────────────────────────────────┐
//! │ INSERT  ││draft                                        │  bottom row:
//! └─────────┘└─────────────────────────────────────────────┘  mode | input
//! ```
//!
//! The render pass is also where controllers learn their pane sizes.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::config::GRID_COLUMNS;
use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::mode_indicator;
use crate::tui::components::{ChannelPane, ChatPane, DebugPane, InputPane, ModeIndicator};
use crate::tui::theme::Palette;

/// Grid columns the debug column borrows from the chat pane.
const DEBUG_COLUMNS: u16 = 3;

#[derive(Debug, Clone)]
pub struct UiStyle {
    pub palette: Palette,
    /// Sidebar share of the 12-column grid.
    pub sidebar_width: u16,
}

struct Areas {
    sidebar: Rect,
    chat: Rect,
    debug: Option<Rect>,
    mode: Rect,
    input: Rect,
}

fn split(area: Rect, app: &App, style: &UiStyle) -> Areas {
    use Constraint::{Fill, Length, Min};

    let input_height = InputPane::height(&app.input);
    let [top, bottom] = Layout::vertical([Min(0), Length(input_height)]).areas(area);

    let sidebar = style.sidebar_width.clamp(1, GRID_COLUMNS - 1);
    let main = GRID_COLUMNS - sidebar;
    let (sidebar_area, chat_area, debug_area) = if app.debug {
        let [s, c, d] = Layout::horizontal([
            Fill(sidebar),
            Fill(main.saturating_sub(DEBUG_COLUMNS).max(1)),
            Fill(DEBUG_COLUMNS),
        ])
        .areas(top);
        (s, c, Some(d))
    } else {
        let [s, c] = Layout::horizontal([Fill(sidebar), Fill(main)]).areas(top);
        (s, c, None)
    };

    let [mode, input] =
        Layout::horizontal([Length(mode_indicator::WIDTH), Min(0)]).areas(bottom);

    Areas {
        sidebar: sidebar_area,
        chat: chat_area,
        debug: debug_area,
        mode,
        input,
    }
}

/// Inner size of a bordered pane.
fn inner(area: Rect) -> (usize, usize) {
    (
        area.width.saturating_sub(2) as usize,
        area.height.saturating_sub(2) as usize,
    )
}

pub fn draw_ui(frame: &mut Frame, app: &mut App, style: &UiStyle) {
    let areas = split(frame.area(), app, style);

    let (_, sidebar_rows) = inner(areas.sidebar);
    app.channels.set_viewport_height(sidebar_rows);
    let (chat_cols, chat_rows) = inner(areas.chat);
    app.transcript.set_viewport(chat_cols, chat_rows);
    let (input_cols, _) = inner(areas.input);
    app.input.set_width(input_cols);

    let palette = &style.palette;
    ChannelPane {
        list: &app.channels,
        palette,
    }
    .render(frame, areas.sidebar);
    ChatPane {
        transcript: &app.transcript,
        palette,
    }
    .render(frame, areas.chat);
    if let Some(debug) = areas.debug {
        DebugPane {
            notices: &app.notices,
            palette,
        }
        .render(frame, debug);
    }
    ModeIndicator {
        mode: app.mode,
        palette,
    }
    .render(frame, areas.mode);
    InputPane {
        input: &app.input,
        mode: app.mode,
        search: &app.search,
        status: &app.status,
        palette,
    }
    .render(frame, areas.input);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channels::{ChannelEntry, ChannelKind};
    use crate::core::keymap::Mode;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn style(sidebar_width: u16) -> UiStyle {
        UiStyle {
            palette: Palette::default(),
            sidebar_width,
        }
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_draw_ui_syncs_viewports() {
        let mut app = App::new(false);
        app.channels.set_channels(vec![
            ChannelEntry::new("C1", "general", ChannelKind::Channel),
            ChannelEntry::new("C2", "random", ChannelKind::Channel),
        ]);
        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();

        terminal
            .draw(|f| draw_ui(f, &mut app, &style(2)))
            .unwrap();

        // 24 rows - 3 for the input row - 2 borders
        assert_eq!(app.channels.viewport_height(), 19);
        assert_eq!(app.transcript.height(), 19);
        // 120 - 11 for the mode badge - 2 borders
        assert_eq!(app.input.width(), 107);

        let text = screen(&terminal);
        assert!(text.contains("#general"));
        assert!(text.contains("COMMAND"));
        assert!(!text.contains("Debug"));
    }

    #[test]
    fn test_sidebar_width_sets_the_split() {
        let app = App::new(false);
        let wide = split(Rect::new(0, 0, 120, 24), &app, &style(6));
        assert_eq!(wide.sidebar.width, 60);
        assert_eq!(wide.chat.width, 60);

        let narrow = split(Rect::new(0, 0, 120, 24), &app, &style(1));
        assert_eq!(narrow.sidebar.width, 10);
        assert_eq!(narrow.chat.width, 110);
    }

    #[test]
    fn test_debug_column_appears_with_flag() {
        let mut app = App::new(true);
        app.notice("stream lost (eof), reconnecting");
        app.mode = Mode::Insert;
        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();

        terminal
            .draw(|f| draw_ui(f, &mut app, &style(2)))
            .unwrap();

        let text = screen(&terminal);
        assert!(text.contains("Debug"));
        assert!(text.contains("INSERT"));
        assert!(text.contains("reconnecting"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let mut app = App::new(true);
        app.input.set_text("a\nb\nc\nd\ne\nf");
        let mut terminal = Terminal::new(TestBackend::new(8, 4)).unwrap();
        terminal
            .draw(|f| draw_ui(f, &mut app, &style(11)))
            .unwrap();
    }
}
