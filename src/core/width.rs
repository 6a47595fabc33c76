//! Column-width helpers.
//!
//! Everything that positions a cursor, scrolls a viewport or wraps a line
//! reasons in terminal columns, not in chars. A CJK ideograph takes two
//! columns, a combining mark takes none.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a single char: 0, 1 or 2 columns.
///
/// Control characters report 0.
pub fn rune_width(c: char) -> usize {
    c.width().unwrap_or(0).min(2)
}

/// Display width of a run of chars.
pub fn runes_width(runes: &[char]) -> usize {
    runes.iter().map(|&c| rune_width(c)).sum()
}

/// Display width of a string.
pub fn str_width(s: &str) -> usize {
    s.width()
}

/// Longest prefix of `s` that fits in `budget` columns.
///
/// A wide glyph that would straddle the budget is left out entirely.
pub fn trim_to_width(s: &str, budget: usize) -> &str {
    let mut used = 0;
    for (i, c) in s.char_indices() {
        let w = rune_width(c);
        if used + w > budget {
            return &s[..i];
        }
        used += w;
    }
    s
}

/// Pad `s` with spaces on the right up to `width` columns, trimming first
/// if it is too long.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let trimmed = trim_to_width(s, width);
    let fill = width.saturating_sub(str_width(trimmed));
    let mut out = String::with_capacity(trimmed.len() + fill);
    out.push_str(trimmed);
    out.extend(std::iter::repeat_n(' ', fill));
    out
}
