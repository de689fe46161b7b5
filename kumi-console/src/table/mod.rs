//! Tables.
//!
//! Columns are measured first, widths are negotiated with
//! [`columns::calculate_widths`], and then every cell is rendered exactly
//! once at its column's width.

mod columns;

use tracing::trace;

use crate::border::{BoxBorder, BoxChars};
use crate::measure::Measurement;
use crate::padder::Padder;
use crate::panel::Panel;
use crate::render::{Justify, RenderOptions, Renderable};
use crate::rule::Rule;
use crate::segment::{align_line, join_lines, split_lines, Segment, SegmentLine};
use crate::style::Style;
use crate::text::Text;
use columns::{calculate_widths, ColumnSpec};

/// A table cell: any renderable.
pub struct Cell(Box<dyn Renderable + Send + Sync>);

impl Cell {
    pub fn new(renderable: impl Renderable + Send + Sync + 'static) -> Self {
        Self(Box::new(renderable))
    }

    pub fn empty() -> Self {
        Self::new(Text::default())
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Cell(..)")
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::new(Text::new(text))
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::new(Text::new(text))
    }
}

impl From<Text> for Cell {
    fn from(text: Text) -> Self {
        Cell::new(text)
    }
}

impl From<Table> for Cell {
    fn from(table: Table) -> Self {
        Cell::new(table)
    }
}

impl From<Rule> for Cell {
    fn from(rule: Rule) -> Self {
        Cell::new(rule)
    }
}

impl<R: Renderable + Send + Sync + 'static> From<Panel<R>> for Cell {
    fn from(panel: Panel<R>) -> Self {
        Cell::new(panel)
    }
}

impl<R: Renderable + Send + Sync + 'static> From<Padder<R>> for Cell {
    fn from(padder: Padder<R>) -> Self {
        Cell::new(padder)
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    header: Text,
    justify: Justify,
    /// Cells on the left and right of the content.
    padding: (usize, usize),
    no_wrap: bool,
    width: Option<usize>,
    ratio: Option<usize>,
}

impl Column {
    pub fn new(header: impl Into<Text>) -> Self {
        Self {
            header: header.into(),
            justify: Justify::Left,
            padding: (1, 1),
            no_wrap: false,
            width: None,
            ratio: None,
        }
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    pub fn padding(mut self, left: usize, right: usize) -> Self {
        self.padding = (left, right);
        self
    }

    pub fn no_wrap(mut self) -> Self {
        self.no_wrap = true;
        self
    }

    /// Fixed content width, padding excluded.
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Share of the leftover width when the table expands.
    pub fn ratio(mut self, ratio: usize) -> Self {
        self.ratio = Some(ratio);
        self
    }
}

#[derive(Debug)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
    border: BoxBorder,
    show_header: bool,
    show_row_separators: bool,
    pad_edge: bool,
    title: Option<Text>,
    caption: Option<Text>,
    expand: bool,
    width: Option<usize>,
    border_style: Style,
    header_style: Style,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            border: BoxBorder::Square,
            show_header: true,
            show_row_separators: false,
            pad_edge: true,
            title: None,
            caption: None,
            expand: false,
            width: None,
            border_style: Style::default(),
            header_style: Style::new().bold(),
        }
    }

    pub fn add_column(&mut self, column: Column) -> &mut Self {
        self.columns.push(column);
        self
    }

    /// Append a row. Missing cells are left empty; extra cells add
    /// header-less columns.
    pub fn add_row<I, C>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let mut row: Vec<Cell> = cells.into_iter().map(Into::into).collect();
        while self.columns.len() < row.len() {
            self.columns.push(Column::new(""));
        }
        for existing in &mut self.rows {
            while existing.len() < self.columns.len() {
                existing.push(Cell::empty());
            }
        }
        while row.len() < self.columns.len() {
            row.push(Cell::empty());
        }
        self.rows.push(row);
        self
    }

    pub fn border(&mut self, border: BoxBorder) -> &mut Self {
        self.border = border;
        self
    }

    pub fn show_header(&mut self, show: bool) -> &mut Self {
        self.show_header = show;
        self
    }

    pub fn show_row_separators(&mut self, show: bool) -> &mut Self {
        self.show_row_separators = show;
        self
    }

    /// Whether the outer columns keep their padding next to the edges.
    pub fn pad_edge(&mut self, pad: bool) -> &mut Self {
        self.pad_edge = pad;
        self
    }

    pub fn title(&mut self, title: impl Into<Text>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn caption(&mut self, caption: impl Into<Text>) -> &mut Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn expand(&mut self, expand: bool) -> &mut Self {
        self.expand = expand;
        self
    }

    /// Fixed total width, borders included.
    pub fn width(&mut self, width: usize) -> &mut Self {
        self.width = Some(width);
        self
    }

    pub fn border_style(&mut self, style: Style) -> &mut Self {
        self.border_style = style;
        self
    }

    pub fn header_style(&mut self, style: Style) -> &mut Self {
        self.header_style = style;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn chars(&self, options: &RenderOptions) -> Option<&'static BoxChars> {
        self.border.chars(options.unicode)
    }

    /// Cells taken by the edges and dividers.
    fn extra_width(&self, options: &RenderOptions) -> usize {
        match self.chars(options) {
            Some(_) if !self.columns.is_empty() => self.columns.len() + 1,
            _ => 0,
        }
    }

    fn cell_padding(&self, index: usize) -> (usize, usize) {
        let (mut left, mut right) = self.columns[index].padding;
        if !self.pad_edge {
            if index == 0 {
                left = 0;
            }
            if index + 1 == self.columns.len() {
                right = 0;
            }
        }
        (left, right)
    }

    fn column_options(&self, index: usize, options: &RenderOptions) -> RenderOptions {
        RenderOptions {
            no_wrap: self.columns[index].no_wrap,
            justify: None,
            ..*options
        }
    }

    fn column_spec(&self, index: usize, options: &RenderOptions, max_width: usize) -> ColumnSpec {
        let column = &self.columns[index];
        let (left, right) = self.cell_padding(index);
        let padding = left + right;
        let measurement = match column.width {
            Some(width) => Measurement::fixed(width + padding),
            None => {
                let options = self.column_options(index, options);
                let content_width = max_width.saturating_sub(padding);
                let header = self
                    .show_header
                    .then(|| column.header.measure(&options, content_width));
                self.rows
                    .iter()
                    .map(|row| row[index].0.measure(&options, content_width))
                    .chain(header)
                    .fold(Measurement::default(), Measurement::union)
                    .grow(padding)
            }
        };
        ColumnSpec {
            measurement,
            wrappable: !column.no_wrap && column.width.is_none(),
            ratio: column.ratio,
        }
    }

    fn column_widths(&self, options: &RenderOptions, available: usize) -> Vec<usize> {
        let specs: Vec<ColumnSpec> = (0..self.columns.len())
            .map(|i| self.column_spec(i, options, available))
            .collect();
        let expand = self.expand || self.width.is_some();
        let widths = calculate_widths(&specs, available, expand);
        trace!(columns = widths.len(), available, ?widths, "table column widths");
        widths
    }

    fn render_cell(
        &self,
        cell: &dyn Renderable,
        index: usize,
        width: usize,
        options: &RenderOptions,
        style: Option<&Style>,
    ) -> Vec<SegmentLine> {
        let (left, right) = self.cell_padding(index);
        // Padding gives way first when the column is narrower than it.
        let left = left.min(width);
        let right = right.min(width - left);
        let content_width = width - left - right;
        let options = self.column_options(index, options);
        let justify = self.columns[index].justify;

        let segments = cell.render(&options, content_width);
        split_lines(&segments, Some(content_width))
            .into_iter()
            .map(|line| {
                let line: SegmentLine = match style {
                    Some(style) => line
                        .into_iter()
                        .map(|mut s| {
                            s.style = style.combine(&s.style);
                            s
                        })
                        .collect(),
                    None => line,
                };
                let mut padded = Vec::with_capacity(line.len() + 2);
                if left > 0 {
                    padded.push(Segment::padding(left, Style::default()));
                }
                padded.extend(align_line(&line, content_width, justify, &Style::default()));
                if right > 0 {
                    padded.push(Segment::padding(right, Style::default()));
                }
                padded
            })
            .collect()
    }

    fn render_row(
        &self,
        cells: &[&dyn Renderable],
        widths: &[usize],
        options: &RenderOptions,
        style: Option<&Style>,
        out: &mut Vec<SegmentLine>,
    ) {
        let mut rendered: Vec<Vec<SegmentLine>> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| self.render_cell(*cell, i, widths[i], options, style))
            .collect();
        let height = rendered.iter().map(Vec::len).max().unwrap_or(0).max(1);
        for (lines, width) in rendered.iter_mut().zip(widths) {
            while lines.len() < height {
                lines.push(vec![Segment::padding(*width, Style::default())]);
            }
        }

        let chars = self.chars(options);
        let edge = |c: char| Segment::styled(c.to_string(), self.border_style.clone());
        for row in 0..height {
            let mut line = Vec::new();
            if let Some(chars) = chars {
                line.push(edge(chars.cell[0]));
            }
            for (i, lines) in rendered.iter_mut().enumerate() {
                if i > 0 {
                    if let Some(chars) = chars {
                        line.push(edge(chars.cell[2]));
                    }
                }
                line.append(&mut lines[row]);
            }
            if let Some(chars) = chars {
                line.push(edge(chars.cell[3]));
            }
            out.push(line);
        }
    }

    fn border_line(&self, row: [char; 4], widths: &[usize]) -> SegmentLine {
        vec![Segment::styled(
            BoxChars::line(row, widths),
            self.border_style.clone(),
        )]
    }

    fn render_label(text: &Text, options: &RenderOptions, width: usize) -> Vec<SegmentLine> {
        let centered = text.clone().with_justify(Justify::Center);
        split_lines(&centered.render(options, width), Some(width))
    }
}

impl Renderable for Table {
    fn measure(&self, options: &RenderOptions, max_width: usize) -> Measurement {
        if let Some(width) = self.width {
            return Measurement::fixed(width.min(max_width));
        }
        let extra = self.extra_width(options);
        let available = max_width.saturating_sub(extra);
        let (min, max) = (0..self.columns.len())
            .map(|i| self.column_spec(i, options, available).measurement)
            .fold((0, 0), |(min, max), m| (min + m.min, max + m.max));
        Measurement::new(min + extra, max + extra).clamp_max(max_width)
    }

    fn render(&self, options: &RenderOptions, width: usize) -> Vec<Segment> {
        if self.columns.is_empty() {
            return Vec::new();
        }
        let max_width = self.width.map_or(width, |fixed| fixed.min(width));
        let extra = self.extra_width(options);
        if max_width <= extra {
            return Vec::new();
        }
        let widths = self.column_widths(options, max_width - extra);
        let table_width = widths.iter().sum::<usize>() + extra;
        let chars = self.chars(options);

        let mut lines: Vec<SegmentLine> = Vec::new();
        if let Some(title) = &self.title {
            lines.extend(Self::render_label(title, options, table_width));
        }
        if let Some(chars) = chars {
            lines.push(self.border_line(chars.top, &widths));
        }
        if self.show_header {
            let headers: Vec<&dyn Renderable> = self
                .columns
                .iter()
                .map(|c| &c.header as &dyn Renderable)
                .collect();
            self.render_row(&headers, &widths, options, Some(&self.header_style), &mut lines);
            if let (Some(chars), false) = (chars, self.rows.is_empty()) {
                lines.push(self.border_line(chars.head_row, &widths));
            }
        }
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 && self.show_row_separators {
                if let Some(chars) = chars {
                    lines.push(self.border_line(chars.row, &widths));
                }
            }
            let cells: Vec<&dyn Renderable> =
                row.iter().map(|c| &*c.0 as &dyn Renderable).collect();
            self.render_row(&cells, &widths, options, None, &mut lines);
        }
        if let Some(chars) = chars {
            lines.push(self.border_line(chars.bottom, &widths));
        }
        if let Some(caption) = &self.caption {
            lines.extend(Self::render_label(caption, options, table_width));
        }
        join_lines(lines)
    }
}
