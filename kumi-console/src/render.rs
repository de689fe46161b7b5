//! The measure/render protocol.
//!
//! Parents measure their children first to negotiate widths, then render
//! each child once at its final width. Rendering never mutates the
//! renderable, so one instance can be rendered from several threads.

use crate::measure::Measurement;
use crate::segment::{pad_line, split_lines, Segment, SegmentLine};
use crate::style::Style;

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Left,
    Center,
    Right,
}

/// What to do with a word wider than the available width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Hard-wrap into width-sized chunks.
    #[default]
    Fold,
    Crop,
    /// Cut to `width - 1` cells and append `…`.
    Ellipsis,
}

/// Per-call rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Box-drawing characters are available. Borders fall back to ASCII otherwise.
    pub unicode: bool,
    pub ansi: bool,
    /// Default alignment for text that does not set its own.
    pub justify: Option<Justify>,
    /// Keep text on one line, applying the overflow policy instead of wrapping.
    pub no_wrap: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            unicode: true,
            ansi: true,
            justify: None,
            no_wrap: false,
        }
    }
}

pub trait Renderable {
    fn measure(&self, options: &RenderOptions, max_width: usize) -> Measurement;

    /// Render into at most `width` cells per line.
    fn render(&self, options: &RenderOptions, width: usize) -> Vec<Segment>;
}

impl<R: Renderable + ?Sized> Renderable for &R {
    fn measure(&self, options: &RenderOptions, max_width: usize) -> Measurement {
        (**self).measure(options, max_width)
    }

    fn render(&self, options: &RenderOptions, width: usize) -> Vec<Segment> {
        (**self).render(options, width)
    }
}

impl<R: Renderable + ?Sized> Renderable for Box<R> {
    fn measure(&self, options: &RenderOptions, max_width: usize) -> Measurement {
        (**self).measure(options, max_width)
    }

    fn render(&self, options: &RenderOptions, width: usize) -> Vec<Segment> {
        (**self).render(options, width)
    }
}

/// Render into lines of exactly `width` cells, padded with `style`.
pub fn render_lines(
    renderable: &dyn Renderable,
    options: &RenderOptions,
    width: usize,
    style: &Style,
) -> Vec<SegmentLine> {
    let segments = renderable.render(options, width);
    split_lines(&segments, Some(width))
        .into_iter()
        .map(|line| pad_line(&line, width, style))
        .collect()
}
