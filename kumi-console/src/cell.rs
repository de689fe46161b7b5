//! Terminal cell widths.
//!
//! Widths are measured per grapheme cluster so that emoji sequences and
//! combining marks occupy the cells a terminal actually gives them.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Cells occupied by a single codepoint.
#[inline]
pub fn char_width(c: char) -> usize {
    match c as u32 {
        // Emoji blocks most terminals draw double width.
        0x2600..=0x27BF => 2,
        0x1F300..=0x1F5FF => 2,
        0x1F600..=0x1F64F => 2,
        0x1F680..=0x1F6FF => 2,
        0x1F900..=0x1F9FF => 2,
        0x1FA70..=0x1FAFF => 2,
        _ => c.width().unwrap_or(0),
    }
}

/// Cells occupied by one grapheme cluster.
///
/// Flags, ZWJ sequences, skin tones, keycaps and VS16 presentations are two
/// cells. A base character followed by combining marks takes the width of
/// the base.
pub fn grapheme_width(grapheme: &str) -> usize {
    let mut chars = grapheme.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return 0,
    };
    if grapheme.len() == first.len_utf8() {
        return char_width(first);
    }

    if (0x1F1E6..=0x1F1FF).contains(&(first as u32)) {
        return 2;
    }
    for c in chars {
        match c as u32 {
            0x200D | 0xFE0F | 0x20E3 | 0x1F3FB..=0x1F3FF => return 2,
            _ => {}
        }
    }
    first.width().unwrap_or(0)
}

/// Cells occupied by `text`.
pub fn cell_len(text: &str) -> usize {
    if text.is_ascii() {
        return text.bytes().filter(|b| (0x20..0x7F).contains(b)).count();
    }
    text.graphemes(true).map(grapheme_width).sum()
}

/// Byte offset of the longest prefix of `text` that fits in `cells`.
///
/// A grapheme that would straddle the boundary is left out of the prefix.
pub fn fit_prefix(text: &str, cells: usize) -> (usize, usize) {
    let mut used = 0;
    for (offset, grapheme) in text.grapheme_indices(true) {
        let width = grapheme_width(grapheme);
        if used + width > cells {
            return (offset, used);
        }
        used += width;
    }
    (text.len(), used)
}

/// Byte length of the first grapheme of `text`.
pub(crate) fn first_grapheme_len(text: &str) -> usize {
    text.graphemes(true).next().map(str::len).unwrap_or(0)
}

/// Collapse `text` to at most `cells` cells, appending `…` when cut.
pub fn ellipsize(text: &str, cells: usize) -> String {
    if cell_len(text) <= cells {
        return text.to_string();
    }
    if cells == 0 {
        return String::new();
    }
    let (end, _) = fit_prefix(text, cells - 1);
    format!("{}…", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_and_control() {
        assert_eq!(cell_len("hello"), 5);
        assert_eq!(cell_len("a\tb"), 2);
        assert_eq!(cell_len(""), 0);
    }

    #[test]
    fn test_wide_characters() {
        assert_eq!(cell_len("日本語"), 6);
        assert_eq!(cell_len("🚀"), 2);
        assert_eq!(cell_len("e\u{301}"), 1);
        assert_eq!(grapheme_width("🇺🇸"), 2);
        assert_eq!(grapheme_width("👍🏽"), 2);
    }

    #[test]
    fn test_fit_prefix_never_splits_wide_grapheme() {
        assert_eq!(fit_prefix("日本語", 3), (3, 2));
        assert_eq!(fit_prefix("abc", 5), (3, 3));
        assert_eq!(fit_prefix("abc", 0), (0, 0));
    }

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("Hello World", 6), "Hello…");
        assert_eq!(ellipsize("Hi", 6), "Hi");
        assert_eq!(ellipsize("Hello", 1), "…");
    }
}
