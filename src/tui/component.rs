use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive data via props (struct fields, usually borrowed from
/// `App`) and render to a `Frame` within a given `Rect`. They never mutate
/// application state; key handling belongs to the dispatcher.
///
/// `render` takes `&mut self` so a component may keep presentation caches
/// between frames.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
