use crate::measure::Measurement;
use crate::render::{render_lines, RenderOptions, Renderable};
use crate::segment::{join_lines, Segment, SegmentLine};
use crate::style::Style;

/// Space around a renderable, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    pub left: usize,
}

impl Padding {
    pub fn new(top: usize, right: usize, bottom: usize, left: usize) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn all(cells: usize) -> Self {
        Self::new(cells, cells, cells, cells)
    }

    /// `vertical` above and below, `horizontal` on both sides.
    pub fn symmetric(vertical: usize, horizontal: usize) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn horizontal(&self) -> usize {
        self.left + self.right
    }
}

/// Pads a renderable.
pub struct Padder<R> {
    inner: R,
    padding: Padding,
    style: Style,
    expand: bool,
}

impl<R: Renderable> Padder<R> {
    pub fn new(inner: R, padding: Padding) -> Self {
        Self {
            inner,
            padding,
            style: Style::default(),
            expand: true,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Fill the available width instead of fitting the content.
    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }
}

/// Wrap `lines` of `width` cells in padding.
pub(crate) fn pad_lines(
    lines: Vec<SegmentLine>,
    width: usize,
    padding: Padding,
    style: &Style,
) -> Vec<SegmentLine> {
    let full = width + padding.horizontal();
    let blank = || vec![Segment::padding(full, style.clone())];
    let mut out = Vec::with_capacity(lines.len() + padding.top + padding.bottom);
    out.extend((0..padding.top).map(|_| blank()));
    for line in lines {
        let mut padded = Vec::with_capacity(line.len() + 2);
        if padding.left > 0 {
            padded.push(Segment::padding(padding.left, style.clone()));
        }
        padded.extend(line);
        if padding.right > 0 {
            padded.push(Segment::padding(padding.right, style.clone()));
        }
        out.push(padded);
    }
    out.extend((0..padding.bottom).map(|_| blank()));
    out
}

impl<R: Renderable> Renderable for Padder<R> {
    fn measure(&self, options: &RenderOptions, max_width: usize) -> Measurement {
        let extra = self.padding.horizontal();
        if max_width <= extra {
            return Measurement::fixed(max_width);
        }
        self.inner
            .measure(options, max_width - extra)
            .grow(extra)
            .clamp_max(max_width)
    }

    fn render(&self, options: &RenderOptions, width: usize) -> Vec<Segment> {
        let extra = self.padding.horizontal();
        let inner_width = if self.expand {
            width.saturating_sub(extra)
        } else {
            self.measure(options, width).max.saturating_sub(extra)
        };
        let lines = render_lines(&self.inner, options, inner_width, &self.style);
        join_lines(pad_lines(lines, inner_width, self.padding, &self.style))
    }
}
