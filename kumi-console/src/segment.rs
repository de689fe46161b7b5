//! Styled segments and line layout.
//!
//! Every renderable produces a flat stream of [`Segment`]s. Line breaks are
//! dedicated segments, so line splitting never rescans text for `\n`.

use crate::cell::{cell_len, first_grapheme_len, fit_prefix};
use crate::render::{Justify, Overflow};
use crate::style::Style;

/// One line of segments, without line-break segments.
pub type SegmentLine = Vec<Segment>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Text,
    LineBreak,
    Control,
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: Style,
    kind: SegmentKind,
}

impl Segment {
    /// Plain text. Must not contain newlines.
    pub fn new(text: impl Into<String>) -> Self {
        Self::styled(text, Style::default())
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            kind: SegmentKind::Text,
        }
    }

    pub fn line_break() -> Self {
        Self {
            text: "\n".to_string(),
            style: Style::default(),
            kind: SegmentKind::LineBreak,
        }
    }

    /// Zero-width terminal control sequence, written verbatim.
    pub fn control(code: impl Into<String>) -> Self {
        Self {
            text: code.into(),
            style: Style::default(),
            kind: SegmentKind::Control,
        }
    }

    pub fn padding(cells: usize, style: Style) -> Self {
        Self::styled(" ".repeat(cells), style)
    }

    pub fn is_line_break(&self) -> bool {
        self.kind == SegmentKind::LineBreak
    }

    pub fn is_control(&self) -> bool {
        self.kind == SegmentKind::Control
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == SegmentKind::Text && self.text.chars().all(char::is_whitespace)
    }

    pub fn cell_count(&self) -> usize {
        match self.kind {
            SegmentKind::Text => cell_len(&self.text),
            SegmentKind::LineBreak | SegmentKind::Control => 0,
        }
    }

    /// Split so that the left part occupies at most `cut` cells.
    ///
    /// A wide grapheme straddling the cut goes to the right part.
    pub fn split_at_cell(&self, cut: usize) -> (Segment, Segment) {
        if self.kind != SegmentKind::Text {
            return (self.clone(), self.with_text(String::new()));
        }
        let (offset, _) = fit_prefix(&self.text, cut);
        (
            self.with_text(self.text[..offset].to_string()),
            self.with_text(self.text[offset..].to_string()),
        )
    }

    fn with_text(&self, text: String) -> Segment {
        Segment {
            text,
            style: self.style.clone(),
            kind: self.kind,
        }
    }
}

/// Total cells of a line.
pub fn line_width(line: &[Segment]) -> usize {
    line.iter().map(Segment::cell_count).sum()
}

/// Split a segment stream into lines.
///
/// Line-break segments always end a line. With `max_width`, a segment that
/// would overflow the current line is split at the cell offset that fits;
/// the prefix closes the line and the remainder starts the next one.
pub fn split_lines(segments: &[Segment], max_width: Option<usize>) -> Vec<SegmentLine> {
    let mut lines = Vec::new();
    let mut line: SegmentLine = Vec::new();
    let mut width = 0;

    for segment in segments {
        if segment.is_line_break() {
            lines.push(std::mem::take(&mut line));
            width = 0;
            continue;
        }
        if segment.is_control() {
            line.push(segment.clone());
            continue;
        }
        let Some(max_width) = max_width else {
            line.push(segment.clone());
            continue;
        };

        let mut pending = segment.clone();
        loop {
            let cells = pending.cell_count();
            if width + cells <= max_width {
                width += cells;
                if !pending.text.is_empty() {
                    line.push(pending);
                }
                break;
            }
            let (mut head, mut tail) = pending.split_at_cell(max_width - width);
            if head.text.is_empty() && width == 0 {
                // Wider than the whole line: emit one grapheme so we make progress.
                let end = first_grapheme_len(&pending.text);
                head = pending.with_text(pending.text[..end].to_string());
                tail = pending.with_text(pending.text[end..].to_string());
            }
            if !head.text.is_empty() {
                line.push(head);
            }
            lines.push(std::mem::take(&mut line));
            width = 0;
            pending = tail;
            if pending.text.is_empty() {
                break;
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Fit one oversized segment into `width` cells.
pub fn split_overflow(segment: &Segment, width: usize, overflow: Overflow) -> Vec<Segment> {
    if segment.cell_count() <= width || segment.kind != SegmentKind::Text {
        return vec![segment.clone()];
    }
    match overflow {
        Overflow::Fold => {
            let mut chunks = Vec::new();
            let mut rest = segment.clone();
            while rest.cell_count() > width {
                let (mut head, mut tail) = rest.split_at_cell(width);
                if head.text.is_empty() {
                    let end = first_grapheme_len(&rest.text);
                    head = rest.with_text(rest.text[..end].to_string());
                    tail = rest.with_text(rest.text[end..].to_string());
                }
                chunks.push(head);
                rest = tail;
            }
            if !rest.text.is_empty() {
                chunks.push(rest);
            }
            chunks
        }
        Overflow::Crop => vec![segment.split_at_cell(width).0],
        Overflow::Ellipsis => {
            if width == 0 {
                return Vec::new();
            }
            let (head, _) = segment.split_at_cell(width - 1);
            vec![segment.with_text(format!("{}…", head.text))]
        }
    }
}

/// Cut a line down to `width` cells.
pub fn truncate(line: &[Segment], width: usize) -> SegmentLine {
    let mut out = Vec::new();
    let mut used = 0;
    for segment in line {
        let cells = segment.cell_count();
        if used + cells <= width {
            used += cells;
            out.push(segment.clone());
            continue;
        }
        let (head, _) = segment.split_at_cell(width - used);
        used += head.cell_count();
        if !head.text.is_empty() {
            out.push(head);
        }
        // Pad when a wide grapheme was left out.
        if used < width {
            out.push(Segment::padding(width - used, segment.style.clone()));
        }
        break;
    }
    out
}

/// Truncate or pad a line to exactly `width` cells.
pub fn pad_line(line: &[Segment], width: usize, style: &Style) -> SegmentLine {
    let current = line_width(line);
    if current > width {
        return truncate(line, width);
    }
    let mut out = line.to_vec();
    if current < width {
        out.push(Segment::padding(width - current, style.clone()));
    }
    out
}

/// Position a line within `width` cells.
pub fn align_line(line: &[Segment], width: usize, justify: Justify, style: &Style) -> SegmentLine {
    let current = line_width(line);
    if current >= width {
        return truncate(line, width);
    }
    let excess = width - current;
    let (left, right) = match justify {
        Justify::Left => (0, excess),
        Justify::Center => (excess / 2, excess - excess / 2),
        Justify::Right => (excess, 0),
    };
    let mut out = Vec::with_capacity(line.len() + 2);
    if left > 0 {
        out.push(Segment::padding(left, style.clone()));
    }
    out.extend_from_slice(line);
    if right > 0 {
        out.push(Segment::padding(right, style.clone()));
    }
    out
}

/// Join adjacent text segments that share a style.
pub fn merge(segments: &[Segment]) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.kind == SegmentKind::Text && segment.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last)
                if last.kind == SegmentKind::Text
                    && segment.kind == SegmentKind::Text
                    && last.style == segment.style =>
            {
                last.text.push_str(&segment.text);
            }
            _ => out.push(segment.clone()),
        }
    }
    out
}

/// Flatten lines back into a stream with a break after every line.
pub fn join_lines(lines: Vec<SegmentLine>) -> Vec<Segment> {
    let mut out = Vec::new();
    for line in lines {
        out.extend(line);
        out.push(Segment::line_break());
    }
    out
}

/// Split `text` into segments, turning each `\n` into a line break.
pub(crate) fn push_text(out: &mut Vec<Segment>, text: &str, style: &Style) {
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Segment::line_break());
        }
        if !part.is_empty() {
            out.push(Segment::styled(part, style.clone()));
        }
    }
}
