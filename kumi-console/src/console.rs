use std::io;
use std::sync::Mutex;

use tracing::trace;

use crate::error::ConsoleError;
use crate::markup::Markup;
use crate::render::{RenderOptions, Renderable};
use crate::segment::{join_lines, split_lines, Segment};
use crate::sink::{AnsiWriter, SegmentSink, TestConsole};

pub const DEFAULT_WIDTH: usize = 80;

/// Renders to a sink at a fixed width.
pub struct Console {
    sink: Mutex<Box<dyn SegmentSink>>,
    width: usize,
    options: RenderOptions,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("width", &self.width)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Console {
    pub fn new(sink: impl SegmentSink + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
            width: DEFAULT_WIDTH,
            options: RenderOptions::default(),
        }
    }

    /// Standard output with colors.
    pub fn stdout() -> Self {
        Self::new(AnsiWriter::stdout(true))
    }

    /// Standard error with colors.
    pub fn stderr() -> Self {
        Self::new(AnsiWriter::new(io::stderr(), true))
    }

    /// A console writing plain text to `sink`.
    pub fn testing(sink: TestConsole) -> Self {
        Self::new(sink).with_options(RenderOptions {
            ansi: false,
            ..RenderOptions::default()
        })
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `renderable` at the console width and write it, one line per row.
    pub fn print(&self, renderable: &dyn Renderable) -> io::Result<()> {
        let segments = renderable.render(&self.options, self.width);
        let lines = split_lines(&segments, Some(self.width));
        trace!(lines = lines.len(), width = self.width, "printing");
        self.write_segments(&join_lines(lines))
    }

    /// Parse `markup` and print it.
    pub fn markup_line(&self, markup: &str) -> Result<(), ConsoleError> {
        let text = Markup::parse(markup)?;
        self.print(&text)?;
        Ok(())
    }

    /// Print a plain line.
    pub fn line(&self, text: &str) -> io::Result<()> {
        self.write_segments(&[Segment::new(text), Segment::line_break()])
    }

    pub fn write_segments(&self, segments: &[Segment]) -> io::Result<()> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| io::Error::other("console sink lock poisoned"))?;
        sink.write_segments(segments)?;
        sink.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Text;

    #[test]
    fn test_print_wraps_at_console_width() {
        let sink = TestConsole::new();
        let console = Console::testing(sink.clone()).with_width(10);
        console.print(&Text::new("The quick brown fox")).unwrap();
        assert_eq!(sink.output(), "The quick\nbrown fox\n");
    }

    #[test]
    fn test_markup_line() {
        let sink = TestConsole::new();
        let console = Console::testing(sink.clone());
        console.markup_line("[bold]Hello[/] [[world]]").unwrap();
        assert_eq!(sink.output(), "Hello [world]\n");
        assert!(matches!(
            console.markup_line("[bold]oops"),
            Err(ConsoleError::Markup(_))
        ));
    }
}
