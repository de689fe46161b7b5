//! Segment destinations.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::segment::Segment;

/// Anything that can receive rendered segments.
pub trait SegmentSink: Send {
    fn write_segments(&mut self, segments: &[Segment]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes segments as ANSI text.
///
/// Styles become SGR sequences and links become OSC 8 hyperlinks. With
/// color off, only the plain text is written and control codes are dropped.
#[derive(Debug)]
pub struct AnsiWriter<W> {
    writer: W,
    color: bool,
}

impl<W: Write + Send> AnsiWriter<W> {
    pub fn new(writer: W, color: bool) -> Self {
        Self { writer, color }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_styled(&mut self, segment: &Segment) -> io::Result<()> {
        if !self.color || segment.style.is_plain() {
            return self.writer.write_all(segment.text.as_bytes());
        }
        let style = segment.style.to_anstyle();
        if let Some(url) = &segment.style.link {
            write!(self.writer, "\x1b]8;;{}\x1b\\", url)?;
        }
        write!(
            self.writer,
            "{}{}{}",
            style.render(),
            segment.text,
            style.render_reset()
        )?;
        if segment.style.link.is_some() {
            self.writer.write_all(b"\x1b]8;;\x1b\\")?;
        }
        Ok(())
    }
}

impl AnsiWriter<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write + Send> SegmentSink for AnsiWriter<W> {
    fn write_segments(&mut self, segments: &[Segment]) -> io::Result<()> {
        for segment in segments {
            if segment.is_line_break() {
                self.writer.write_all(b"\n")?;
            } else if segment.is_control() {
                if self.color {
                    self.writer.write_all(segment.text.as_bytes())?;
                }
            } else {
                self.write_styled(segment)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// In-memory sink capturing plain text.
///
/// Clones share one buffer, so a clone handed to a console can be read
/// back through the original.
#[derive(Debug, Clone, Default)]
pub struct TestConsole {
    buffer: Arc<Mutex<String>>,
}

impl TestConsole {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&self) -> MutexGuard<'_, String> {
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Everything written so far.
    pub fn output(&self) -> String {
        self.buffer().clone()
    }

    /// Output lines with trailing whitespace removed.
    pub fn lines(&self) -> Vec<String> {
        self.buffer()
            .lines()
            .map(|line| line.trim_end().to_string())
            .collect()
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }
}

impl SegmentSink for TestConsole {
    fn write_segments(&mut self, segments: &[Segment]) -> io::Result<()> {
        let mut buffer = self.buffer();
        for segment in segments.iter().filter(|s| !s.is_control()) {
            buffer.push_str(&segment.text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    #[test]
    fn test_ansi_writer_plain_when_color_off() {
        let mut writer = AnsiWriter::new(Vec::new(), false);
        writer
            .write_segments(&[
                Segment::control("\x1b[2K"),
                Segment::styled("hi", Style::new().bold()),
                Segment::line_break(),
            ])
            .unwrap();
        assert_eq!(writer.into_inner(), b"hi\n");
    }

    #[test]
    fn test_ansi_writer_styles_and_links() {
        let mut writer = AnsiWriter::new(Vec::new(), true);
        let style = Style::new().bold().link("https://example.com");
        writer
            .write_segments(&[Segment::styled("site", style)])
            .unwrap();
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert!(out.starts_with("\x1b]8;;https://example.com\x1b\\"));
        assert!(out.contains("\x1b[1msite"));
        assert!(out.ends_with("\x1b]8;;\x1b\\"));
    }

    #[test]
    fn test_test_console_shares_buffer() {
        let console = TestConsole::new();
        let mut handle = console.clone();
        handle
            .write_segments(&[Segment::new("a  "), Segment::line_break(), Segment::new("b")])
            .unwrap();
        assert_eq!(console.output(), "a  \nb");
        assert_eq!(console.lines(), vec!["a", "b"]);
        console.clear();
        assert!(console.output().is_empty());
    }
}
