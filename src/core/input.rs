//! # Input Editor
//!
//! Multi-line rune buffer behind the bottom input box.
//!
//! ```text
//! lines:  ["hello", "wor|ld"]      active line = 1, text cursor = 3
//!                   ^^^
//!                   offset ..cursor is what sits left of the screen cursor
//! ```
//!
//! The editor tracks two cursors: `cursor` indexes runes in the active line,
//! `col` is the screen column of the cursor inside the input box. Moving
//! over a wide glyph moves `col` by two. When `col` would leave the box,
//! `offset` (the first displayed rune of the active line) shifts instead.
//!
//! Invariants after every operation:
//! - `line < lines.len()`
//! - `cursor <= lines[line].len()`
//! - `col == width(lines[line][offset..cursor]) <= width - 1`
//!
//! Vertical moves reset the horizontal cursor to column 0, and merging a
//! line into its predecessor on backspace leaves the cursor at the join.

use crate::core::width::{rune_width, runes_width};

#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    lines: Vec<Vec<char>>,
    line: usize,
    cursor: usize,
    col: usize,
    offset: usize,
    width: usize,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH)
    }
}

impl InputState {
    const DEFAULT_WIDTH: usize = 80;

    pub fn new(width: usize) -> Self {
        Self {
            lines: vec![Vec::new()],
            line: 0,
            cursor: 0,
            col: 0,
            offset: 0,
            width: width.max(1),
        }
    }

    /// Columns available to the cursor: the last column stays free so the
    /// cursor can sit after the final rune.
    fn budget(&self) -> usize {
        self.width.saturating_sub(1)
    }

    fn current(&self) -> &Vec<char> {
        &self.lines[self.line]
    }

    pub fn insert(&mut self, r: char) {
        let cursor = self.cursor;
        self.lines[self.line].insert(cursor, r);
        self.cursor += 1;
        self.advance_col(rune_width(r));
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let cursor = self.cursor;
            let removed = self.lines[self.line].remove(cursor);
            self.retreat_col(rune_width(removed));
        } else if self.line > 0 {
            let tail = self.lines.remove(self.line);
            self.line -= 1;
            self.cursor = self.current().len();
            self.lines[self.line].extend(tail);
            self.scroll_to_cursor();
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.current().len() {
            let cursor = self.cursor;
            self.lines[self.line].remove(cursor);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let w = rune_width(self.current()[self.cursor]);
        self.retreat_col(w);
    }

    pub fn move_right(&mut self) {
        if self.cursor >= self.current().len() {
            return;
        }
        let w = rune_width(self.current()[self.cursor]);
        self.cursor += 1;
        self.advance_col(w);
    }

    pub fn move_up(&mut self) {
        if self.line > 0 {
            self.line -= 1;
            self.reset_horizontal();
        }
    }

    /// Moving down past the last line opens a new empty one.
    pub fn move_down(&mut self) {
        if self.line + 1 == self.lines.len() {
            self.lines.push(Vec::new());
        }
        self.line += 1;
        self.reset_horizontal();
    }

    pub fn clear(&mut self) {
        self.lines = vec![Vec::new()];
        self.line = 0;
        self.reset_horizontal();
    }

    /// Replace the whole buffer, leaving the cursor at the end of the last line.
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(|l| l.chars().collect()).collect();
        self.line = self.lines.len() - 1;
        self.cursor = self.current().len();
        self.scroll_to_cursor();
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Resize the box. The cursor is re-fitted to the new width.
    pub fn set_width(&mut self, width: usize) {
        let width = width.max(1);
        if width != self.width {
            self.width = width;
            self.scroll_to_cursor();
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Active line index.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Text cursor within the active line, in runes.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Screen column of the cursor inside the box.
    pub fn col(&self) -> usize {
        self.col
    }

    /// First displayed rune of the active line.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The lines as displayed: the active line starts at `offset`, the others
    /// at their first rune.
    pub fn visible_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .enumerate()
            .map(|(i, l)| {
                let start = if i == self.line { self.offset } else { 0 };
                l[start..].iter().collect()
            })
            .collect()
    }

    fn reset_horizontal(&mut self) {
        self.cursor = 0;
        self.col = 0;
        self.offset = 0;
    }

    /// The cursor moved right over a rune of width `w`.
    fn advance_col(&mut self, w: usize) {
        if self.col + w > self.budget() {
            self.scroll_to_cursor();
        } else {
            self.col += w;
        }
    }

    /// The cursor moved left over a rune of width `w`.
    fn retreat_col(&mut self, w: usize) {
        if self.cursor < self.offset {
            self.offset = self.cursor;
            self.col = 0;
        } else {
            self.col = self.col.saturating_sub(w);
        }
    }

    /// Walk left from the cursor accumulating widths until the budget is
    /// full; that rune becomes the new offset.
    fn scroll_to_cursor(&mut self) {
        let budget = self.budget();
        let line = &self.lines[self.line];
        let mut offset = self.cursor;
        let mut acc = 0;
        while offset > 0 {
            let w = rune_width(line[offset - 1]);
            if acc + w > budget {
                break;
            }
            acc += w;
            offset -= 1;
        }
        self.offset = offset;
        self.col = runes_width(&line[offset..self.cursor]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariants(input: &InputState) {
        assert!(input.line < input.lines.len());
        assert!(input.cursor <= input.lines[input.line].len());
        assert!(input.offset <= input.cursor);
        assert!(input.col <= input.width - 1, "col {} width {}", input.col, input.width);
        assert_eq!(
            input.col,
            runes_width(&input.lines[input.line][input.offset..input.cursor])
        );
    }

    #[test]
    fn new_input_is_empty() {
        let input = InputState::new(20);
        assert!(input.is_empty());
        assert_eq!(input.text(), "");
    }

    #[test]
    fn multi_line_edit() {
        let mut input = InputState::new(20);
        input.insert('a');
        input.insert('b');
        input.move_down();
        input.insert('c');
        input.backspace();

        assert_eq!(input.lines.len(), 2);
        assert_eq!(input.visible_lines(), vec!["ab".to_string(), String::new()]);
        assert_eq!(input.line(), 1);
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.text(), "ab\n");
        assert_invariants(&input);
    }

    #[test]
    fn wide_glyph_moves_screen_cursor_by_two() {
        let mut input = InputState::new(5);
        input.insert('a');
        input.insert('あ');
        input.insert('b');
        assert_eq!(input.col(), 4);
        assert_eq!(input.text(), "aあb");
        assert_invariants(&input);
    }

    #[test]
    fn insert_past_width_scrolls_offset() {
        let mut input = InputState::new(5);
        for c in "abcdef".chars() {
            input.insert(c);
            assert_invariants(&input);
        }
        // budget is 4 columns: "cdef" stays visible left of the cursor
        assert_eq!(input.offset(), 2);
        assert_eq!(input.col(), 4);
    }

    #[test]
    fn wide_glyph_scroll_never_splits_glyph() {
        let mut input = InputState::new(4);
        for c in "aあいう".chars() {
            input.insert(c);
            assert_invariants(&input);
        }
        // budget 3 columns only fits one wide glyph
        assert_eq!(input.offset(), 3);
        assert_eq!(input.col(), 2);
    }

    #[test]
    fn move_left_past_offset_scrolls_back() {
        let mut input = InputState::new(4);
        for c in "abcdef".chars() {
            input.insert(c);
        }
        for _ in 0..6 {
            input.move_left();
            assert_invariants(&input);
        }
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.offset(), 0);
        assert_eq!(input.col(), 0);

        input.move_left();
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn move_right_stops_at_line_end() {
        let mut input = InputState::new(10);
        input.insert('x');
        input.move_left();
        input.move_right();
        input.move_right();
        assert_eq!(input.cursor(), 1);
        assert_eq!(input.col(), 1);
    }

    #[test]
    fn move_right_over_wide_glyph() {
        let mut input = InputState::new(10);
        input.set_text("あい");
        input.move_left();
        input.move_left();
        assert_eq!(input.col(), 0);
        input.move_right();
        assert_eq!(input.col(), 2);
        assert_invariants(&input);
    }

    #[test]
    fn insert_then_backspace_restores_state() {
        for r in ['x', 'あ'] {
            let mut input = InputState::new(12);
            input.set_text("hello");
            input.move_left();
            input.move_left();
            let before = (input.text(), input.cursor(), input.col(), input.offset());

            input.insert(r);
            input.backspace();

            let after = (input.text(), input.cursor(), input.col(), input.offset());
            assert_eq!(before, after, "rune {r:?}");
        }
    }

    #[test]
    fn backspace_at_line_start_merges_lines() {
        let mut input = InputState::new(20);
        input.set_text("ab\ncd");
        input.move_up();
        input.move_down();
        assert_eq!(input.line(), 1);
        assert_eq!(input.cursor(), 0);

        input.backspace();
        assert_eq!(input.text(), "abcd");
        assert_eq!(input.line(), 0);
        assert_eq!(input.cursor(), 2);
        assert_eq!(input.col(), 2);
        assert_invariants(&input);
    }

    #[test]
    fn backspace_on_empty_input_is_noop() {
        let mut input = InputState::new(20);
        input.backspace();
        assert!(input.is_empty());
        assert_invariants(&input);
    }

    #[test]
    fn delete_removes_rune_under_cursor() {
        let mut input = InputState::new(20);
        input.set_text("abc");
        input.move_left();
        input.move_left();
        input.delete();
        assert_eq!(input.text(), "ac");
        assert_eq!(input.cursor(), 1);

        input.move_right();
        input.delete();
        assert_eq!(input.text(), "ac");
    }

    #[test]
    fn vertical_moves_reset_horizontal_cursor() {
        let mut input = InputState::new(20);
        input.set_text("first\nsecond");
        assert_eq!(input.cursor(), 6);
        input.move_up();
        assert_eq!(input.line(), 0);
        assert_eq!((input.cursor(), input.col(), input.offset()), (0, 0, 0));

        input.move_up();
        assert_eq!(input.line(), 0);
    }

    #[test]
    fn move_down_appends_line_only_at_end() {
        let mut input = InputState::new(20);
        input.set_text("a\nb");
        input.move_up();
        input.move_down();
        assert_eq!(input.line_count(), 2);
        input.move_down();
        assert_eq!(input.line_count(), 3);
        assert_eq!(input.text(), "a\nb\n");
    }

    #[test]
    fn clear_then_is_empty() {
        let mut input = InputState::new(20);
        input.set_text("one\ntwo");
        input.clear();
        assert!(input.is_empty());
        assert_eq!(input.line(), 0);
        assert_invariants(&input);
    }

    #[test]
    fn set_width_refits_cursor() {
        let mut input = InputState::new(40);
        input.set_text("abcdefghij");
        assert_eq!(input.offset(), 0);
        input.set_width(5);
        assert_invariants(&input);
        assert_eq!(input.offset(), 6);
    }

    #[test]
    fn random_walk_keeps_invariants() {
        let mut input = InputState::new(6);
        let script = "abあcdいe<<<<>>x^^vvy<<<<<<<<bbbbvzうえお>>>>bbbbbbbbbbbb";
        for op in script.chars() {
            match op {
                '<' => input.move_left(),
                '>' => input.move_right(),
                '^' => input.move_up(),
                'v' => input.move_down(),
                'b' => input.backspace(),
                'x' => input.delete(),
                c => input.insert(c),
            }
            assert_invariants(&input);
        }
    }
}
