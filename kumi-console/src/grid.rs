use crate::border::BoxBorder;
use crate::measure::Measurement;
use crate::render::{RenderOptions, Renderable};
use crate::segment::Segment;
use crate::table::{Cell, Column, Table};

/// Columns without borders or headers, separated by a gap.
#[derive(Debug)]
pub struct Grid {
    table: Table,
    gap: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        let mut table = Table::new();
        table
            .border(BoxBorder::None)
            .show_header(false)
            .pad_edge(false);
        Self { table, gap: 1 }
    }

    /// Cells between columns. Applies to columns added afterwards.
    pub fn gap(&mut self, gap: usize) -> &mut Self {
        self.gap = gap;
        self
    }

    pub fn add_column(&mut self, column: Column) -> &mut Self {
        self.table.add_column(column.padding(0, self.gap));
        self
    }

    pub fn add_row<I, C>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let row: Vec<Cell> = cells.into_iter().map(Into::into).collect();
        while self.table.column_count() < row.len() {
            self.add_column(Column::new(""));
        }
        self.table.add_row(row);
        self
    }

    pub fn expand(&mut self, expand: bool) -> &mut Self {
        self.table.expand(expand);
        self
    }
}

impl Renderable for Grid {
    fn measure(&self, options: &RenderOptions, max_width: usize) -> Measurement {
        self.table.measure(options, max_width)
    }

    fn render(&self, options: &RenderOptions, width: usize) -> Vec<Segment> {
        self.table.render(options, width)
    }
}

impl From<Grid> for Cell {
    fn from(grid: Grid) -> Self {
        Cell::new(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::split_lines;

    #[test]
    fn test_grid_aligns_columns() {
        let mut grid = Grid::new();
        grid.gap(2);
        grid.add_row(["-v, --verbose", "Print more"]);
        grid.add_row(["-h", "Help"]);
        let lines: Vec<String> = split_lines(&grid.render(&RenderOptions::default(), 80), None)
            .iter()
            .map(|line| line.iter().map(|s| s.text.as_str()).collect())
            .collect();
        assert_eq!(lines, vec!["-v, --verbose  Print more", "-h             Help      "]);
    }
}
