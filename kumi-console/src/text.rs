//! Styled text.
//!
//! A [`Text`] is a plain string plus style spans over byte ranges. Spans may
//! overlap; [`Text::segments`] resolves them with a sweep over the span
//! boundaries, layering later spans on top of earlier ones.

use crate::cell::cell_len;
use crate::measure::Measurement;
use crate::render::{Justify, Overflow, RenderOptions, Renderable};
use crate::segment::{
    align_line, join_lines, line_width, merge, push_text, split_lines, truncate, Segment,
    SegmentLine,
};
use crate::style::Style;

/// A style applied to `start..end` bytes of a [`Text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub style: Style,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    plain: String,
    spans: Vec<Span>,
    /// Base style under every span.
    pub style: Style,
    pub justify: Option<Justify>,
    pub overflow: Overflow,
    pub no_wrap: bool,
}

impl Text {
    pub fn new(plain: impl Into<String>) -> Self {
        Self {
            plain: plain.into(),
            ..Self::default()
        }
    }

    pub fn styled(plain: impl Into<String>, style: Style) -> Self {
        Self {
            plain: plain.into(),
            style,
            ..Self::default()
        }
    }

    /// Parse console markup.
    pub fn from_markup(markup: &str) -> Result<Self, crate::MarkupError> {
        crate::markup::Markup::parse(markup)
    }

    pub fn with_justify(mut self, justify: Justify) -> Self {
        self.justify = Some(justify);
        self
    }

    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_no_wrap(mut self, no_wrap: bool) -> Self {
        self.no_wrap = no_wrap;
        self
    }

    pub fn plain(&self) -> &str {
        &self.plain
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.plain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plain.is_empty()
    }

    pub fn cell_len(&self) -> usize {
        cell_len(&self.plain)
    }

    /// Apply `style` to the bytes `start..end`.
    ///
    /// Offsets are clamped to the text and moved down to char boundaries.
    /// Empty ranges are ignored.
    pub fn stylize(&mut self, start: usize, end: usize, style: Style) {
        let start = self.boundary(start);
        let end = self.boundary(end);
        if start < end {
            self.spans.push(Span { start, end, style });
        }
    }

    pub fn append(&mut self, text: &str, style: Option<Style>) {
        let start = self.plain.len();
        self.plain.push_str(text);
        if let Some(style) = style {
            self.stylize(start, self.plain.len(), style);
        }
    }

    /// Append another text, keeping its spans.
    pub fn append_text(&mut self, other: &Text) {
        let offset = self.plain.len();
        self.plain.push_str(&other.plain);
        if !other.style.is_plain() {
            self.stylize(offset, offset + other.plain.len(), other.style.clone());
        }
        for span in &other.spans {
            self.spans.push(Span {
                start: span.start + offset,
                end: span.end + offset,
                style: span.style.clone(),
            });
        }
    }

    fn boundary(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.plain.len());
        while !self.plain.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// One segment per contiguous style region, newlines as line breaks.
    pub fn segments(&self) -> Vec<Segment> {
        let mut events: Vec<(usize, bool, usize)> = Vec::with_capacity(self.spans.len() * 2);
        for (id, span) in self.spans.iter().enumerate() {
            events.push((span.start, true, id));
            events.push((span.end, false, id));
        }
        // Leaving sorts before entering at the same offset.
        events.sort_unstable();

        let mut active: Vec<usize> = Vec::new();
        let mut out = Vec::new();
        let mut last = 0;
        for (offset, entering, id) in events {
            if offset > last {
                push_text(&mut out, &self.plain[last..offset], &self.compose(&active));
                last = offset;
            }
            if entering {
                active.push(id);
            } else {
                active.retain(|&a| a != id);
            }
        }
        if last < self.plain.len() {
            push_text(&mut out, &self.plain[last..], &self.style);
        }
        merge(&out)
    }

    fn compose(&self, active: &[usize]) -> Style {
        let mut ids = active.to_vec();
        ids.sort_unstable();
        ids.iter()
            .fold(self.style.clone(), |style, id| style.combine(&self.spans[*id].style))
    }

    /// Widest unbreakable word, in cells.
    fn longest_word(&self) -> usize {
        self.plain
            .split_whitespace()
            .map(cell_len)
            .max()
            .unwrap_or(0)
    }

    fn lay_out(&self, line: &[Segment], width: usize, no_wrap: bool) -> Vec<SegmentLine> {
        if !no_wrap {
            return wrap_line(line, width, self.overflow);
        }
        if line_width(line) <= width {
            return vec![line.to_vec()];
        }
        match self.overflow {
            Overflow::Fold => split_lines(line, Some(width)),
            Overflow::Crop => vec![truncate(line, width)],
            Overflow::Ellipsis => vec![ellipsize_line(line, width)],
        }
    }
}

impl From<&str> for Text {
    fn from(plain: &str) -> Self {
        Text::new(plain)
    }
}

impl From<String> for Text {
    fn from(plain: String) -> Self {
        Text::new(plain)
    }
}

impl Renderable for Text {
    fn measure(&self, options: &RenderOptions, max_width: usize) -> Measurement {
        let max = self.plain.lines().map(cell_len).max().unwrap_or(0);
        let min = if self.no_wrap || options.no_wrap {
            max
        } else {
            self.longest_word()
        };
        Measurement::new(min, max).clamp_max(max_width)
    }

    fn render(&self, options: &RenderOptions, width: usize) -> Vec<Segment> {
        let justify = self.justify.or(options.justify);
        let no_wrap = self.no_wrap || options.no_wrap;
        let mut lines = Vec::new();
        for line in split_lines(&self.segments(), None) {
            for laid_out in self.lay_out(&line, width, no_wrap) {
                lines.push(match justify {
                    Some(justify) => align_line(&laid_out, width, justify, &self.style),
                    None => laid_out,
                });
            }
        }
        join_lines(lines)
    }
}

struct Word {
    pieces: Vec<Segment>,
    width: usize,
    space: bool,
}

/// Break a line into alternating runs of whitespace and non-whitespace.
/// A word may span several segments when its style changes mid-word.
fn words(line: &[Segment]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    for segment in line {
        if segment.is_control() {
            if let Some(last) = words.last_mut() {
                last.pieces.push(segment.clone());
            } else {
                words.push(Word {
                    pieces: vec![segment.clone()],
                    width: 0,
                    space: false,
                });
            }
            continue;
        }
        let mut start = 0;
        let text = segment.text.as_str();
        while start < text.len() {
            let space = text[start..].starts_with(char::is_whitespace);
            let end = text[start..]
                .find(|c: char| c.is_whitespace() != space)
                .map(|i| start + i)
                .unwrap_or(text.len());
            let piece = Segment::styled(&text[start..end], segment.style.clone());
            let width = piece.cell_count();
            match words.last_mut() {
                Some(last) if last.space == space => {
                    last.pieces.push(piece);
                    last.width += width;
                }
                _ => words.push(Word {
                    pieces: vec![piece],
                    width,
                    space,
                }),
            }
            start = end;
        }
    }
    words
}

fn trim_end(mut line: SegmentLine) -> SegmentLine {
    while let Some(last) = line.last_mut() {
        if last.is_control() {
            break;
        }
        let trimmed = last.text.trim_end().len();
        if trimmed == 0 {
            line.pop();
            continue;
        }
        last.text.truncate(trimmed);
        break;
    }
    line
}

fn ellipsize_line(line: &[Segment], width: usize) -> SegmentLine {
    if width == 0 {
        return Vec::new();
    }
    let mut out = truncate(line, width - 1);
    let style = line.last().map(|s| s.style.clone()).unwrap_or_default();
    out.push(Segment::styled("…", style));
    out
}

/// Greedy word wrap. Leading whitespace of wrapped lines is dropped.
pub(crate) fn wrap_line(line: &[Segment], width: usize, overflow: Overflow) -> Vec<SegmentLine> {
    let mut lines: Vec<SegmentLine> = Vec::new();
    let mut current: SegmentLine = Vec::new();
    let mut used = 0;
    let mut wrapped = false;

    for word in words(line) {
        if word.space {
            if current.is_empty() && wrapped {
                continue;
            }
            if used + word.width <= width {
                current.extend(word.pieces);
                used += word.width;
            } else {
                lines.push(trim_end(std::mem::take(&mut current)));
                used = 0;
                wrapped = true;
            }
            continue;
        }

        if used + word.width <= width {
            current.extend(word.pieces);
            used += word.width;
            continue;
        }
        if !current.is_empty() {
            lines.push(trim_end(std::mem::take(&mut current)));
            used = 0;
            wrapped = true;
        }
        if word.width <= width {
            current.extend(word.pieces);
            used = word.width;
            continue;
        }

        match overflow {
            Overflow::Fold => {
                let mut chunks = split_lines(&word.pieces, Some(width));
                if let Some(last) = chunks.pop() {
                    lines.extend(chunks);
                    used = line_width(&last);
                    current = last;
                }
            }
            Overflow::Crop => {
                current = truncate(&word.pieces, width);
                used = line_width(&current);
            }
            Overflow::Ellipsis => {
                current = ellipsize_line(&word.pieces, width);
                used = line_width(&current);
            }
        }
        wrapped = true;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
