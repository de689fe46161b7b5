//! # kumi-console
//!
//! Console layout for `kumi`: markup, styled text and composable
//! renderables laid out into terminal cells.
//!
//! Everything renders to a flat stream of [`Segment`]s through the
//! [`Renderable`] measure/render protocol, and a [`SegmentSink`] decides
//! where the segments go.
//!
//! ```
//! use kumi_console::{Column, Console, Justify, Table, TestConsole};
//!
//! let mut table = Table::new();
//! table
//!     .add_column(Column::new("Name"))
//!     .add_column(Column::new("Qty").justify(Justify::Right));
//! table.add_row(["apple", "3"]);
//!
//! let sink = TestConsole::new();
//! let console = Console::testing(sink.clone());
//! console.print(&table).unwrap();
//! assert_eq!(sink.lines()[1], "│ Name  │ Qty │");
//! ```

mod border;
mod cell;
mod console;
mod error;
mod grid;
mod markup;
mod measure;
mod padder;
mod panel;
mod ratio;
mod render;
mod rule;
mod segment;
mod sink;
mod style;
mod table;
mod text;

pub use border::{BoxBorder, BoxChars};
pub use cell::{cell_len, char_width, ellipsize, fit_prefix, grapheme_width};
pub use console::{Console, DEFAULT_WIDTH};
pub use error::{ConsoleError, MarkupError, StyleError};
pub use grid::Grid;
pub use markup::Markup;
pub use measure::Measurement;
pub use padder::{Padder, Padding};
pub use panel::Panel;
pub use ratio::{ratio_distribute, ratio_reduce};
pub use render::{render_lines, Justify, Overflow, RenderOptions, Renderable};
pub use rule::Rule;
pub use segment::{
    align_line, join_lines, line_width, merge, pad_line, split_lines, split_overflow, truncate,
    Segment, SegmentLine,
};
pub use sink::{AnsiWriter, SegmentSink, TestConsole};
pub use style::Style;
pub use table::{Cell, Column, Table};
pub use text::{Span, Text};

pub use anstyle::{AnsiColor, Color, Effects, RgbColor};
