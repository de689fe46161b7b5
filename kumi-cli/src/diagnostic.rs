//! Caret diagnostics for parse errors.

use std::fmt;
use std::ops::Range;

use unicode_width::UnicodeWidthChar;

const INDENT: &str = "       ";

/// A one-line diagnostic with a caret under the offending token.
///
/// `caret` is expressed in terminal cells relative to the start of `line`,
/// so wide characters before the token shift the caret correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub line: String,
    pub caret: Range<usize>,
    pub hint: Option<String>,
}

impl Diagnostic {
    /// Build a diagnostic from a character position and length in `line`.
    pub fn new(
        message: impl Into<String>,
        line: impl Into<String>,
        position: usize,
        length: usize,
        hint: Option<String>,
    ) -> Self {
        let line = line.into();
        let start = cell_offset(&line, position);
        let end = cell_offset(&line, position + length).max(start + 1);
        Self {
            message: message.into(),
            line,
            caret: start..end,
            hint,
        }
    }

    /// The caret row: spaces up to the token, then one `^` per cell.
    pub fn caret_line(&self) -> String {
        let mut out = " ".repeat(self.caret.start);
        out.push_str(&"^".repeat(self.caret.end - self.caret.start));
        if let Some(hint) = &self.hint {
            out.push(' ');
            out.push_str(hint);
        }
        out
    }

    /// Plain-text rendering without styling.
    pub fn render_plain(&self) -> String {
        format!(
            "Error: {}\n\n{}{}\n{}{}",
            self.message,
            INDENT,
            self.line,
            INDENT,
            self.caret_line()
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_plain())
    }
}

/// Cell column of character `position`; positions past the end count one cell each.
fn cell_offset(line: &str, position: usize) -> usize {
    let mut cells = 0;
    let mut count = 0;
    for c in line.chars().take(position) {
        cells += c.width().unwrap_or(0);
        count += 1;
    }
    cells + position.saturating_sub(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_under_token() {
        let d = Diagnostic::new(
            "Unknown command 'bat'.",
            "bat 14",
            0,
            3,
            Some("Did you mean 'cat'?".to_string()),
        );
        assert_eq!(d.caret, 0..3);
        assert_eq!(d.caret_line(), "^^^ Did you mean 'cat'?");
    }

    #[test]
    fn test_render_plain_layout() {
        let d = Diagnostic::new("Unknown option 'x'.", "add --x", 4, 3, None);
        assert_eq!(
            d.render_plain(),
            "Error: Unknown option 'x'.\n\n       add --x\n           ^^^"
        );
    }

    #[test]
    fn test_wide_characters_shift_caret() {
        let d = Diagnostic::new("m", "日本 --x", 3, 3, None);
        assert_eq!(d.caret, 5..8);
    }
}
