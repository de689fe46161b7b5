//! Box-drawing borders shared by panels and tables.

/// Border variants. Every variant except [`BoxBorder::None`] falls back to
/// [`BoxBorder::Ascii`] when the output is not unicode capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxBorder {
    None,
    Ascii,
    #[default]
    Square,
    Rounded,
    Heavy,
    Double,
    /// Inner dividers only.
    Minimal,
}

/// Characters for one border variant. Each row holds the left edge, the
/// horizontal fill, the column divider and the right edge.
#[derive(Debug, PartialEq, Eq)]
pub struct BoxChars {
    pub top: [char; 4],
    pub cell: [char; 4],
    pub head_row: [char; 4],
    pub row: [char; 4],
    pub bottom: [char; 4],
}

const ASCII: BoxChars = BoxChars {
    top: ['+', '-', '+', '+'],
    cell: ['|', ' ', '|', '|'],
    head_row: ['|', '-', '+', '|'],
    row: ['|', '-', '+', '|'],
    bottom: ['+', '-', '+', '+'],
};

const SQUARE: BoxChars = BoxChars {
    top: ['┌', '─', '┬', '┐'],
    cell: ['│', ' ', '│', '│'],
    head_row: ['├', '─', '┼', '┤'],
    row: ['├', '─', '┼', '┤'],
    bottom: ['└', '─', '┴', '┘'],
};

const ROUNDED: BoxChars = BoxChars {
    top: ['╭', '─', '┬', '╮'],
    cell: ['│', ' ', '│', '│'],
    head_row: ['├', '─', '┼', '┤'],
    row: ['├', '─', '┼', '┤'],
    bottom: ['╰', '─', '┴', '╯'],
};

const HEAVY: BoxChars = BoxChars {
    top: ['┏', '━', '┳', '┓'],
    cell: ['┃', ' ', '┃', '┃'],
    head_row: ['┣', '━', '╋', '┫'],
    row: ['┣', '━', '╋', '┫'],
    bottom: ['┗', '━', '┻', '┛'],
};

const DOUBLE: BoxChars = BoxChars {
    top: ['╔', '═', '╦', '╗'],
    cell: ['║', ' ', '║', '║'],
    head_row: ['╠', '═', '╬', '╣'],
    row: ['╠', '═', '╬', '╣'],
    bottom: ['╚', '═', '╩', '╝'],
};

const MINIMAL: BoxChars = BoxChars {
    top: [' ', ' ', '╷', ' '],
    cell: [' ', ' ', '│', ' '],
    head_row: ['╶', '─', '┼', '╴'],
    row: ['╶', '─', '┼', '╴'],
    bottom: [' ', ' ', '╵', ' '],
};

impl BoxBorder {
    /// Characters to draw with, or `None` for no border.
    pub fn chars(self, unicode: bool) -> Option<&'static BoxChars> {
        let chars = match self {
            BoxBorder::None => return None,
            _ if !unicode => &ASCII,
            BoxBorder::Ascii => &ASCII,
            BoxBorder::Square => &SQUARE,
            BoxBorder::Rounded => &ROUNDED,
            BoxBorder::Heavy => &HEAVY,
            BoxBorder::Double => &DOUBLE,
            BoxBorder::Minimal => &MINIMAL,
        };
        Some(chars)
    }
}

impl BoxChars {
    /// A horizontal line over columns of `widths` cells.
    pub fn line(row: [char; 4], widths: &[usize]) -> String {
        let [left, fill, divider, right] = row;
        let mut out = String::new();
        out.push(left);
        for (i, width) in widths.iter().enumerate() {
            if i > 0 {
                out.push(divider);
            }
            out.extend(std::iter::repeat(fill).take(*width));
        }
        out.push(right);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line() {
        let chars = BoxBorder::Square.chars(true).unwrap();
        assert_eq!(BoxChars::line(chars.top, &[2, 3]), "┌──┬───┐");
        assert_eq!(BoxChars::line(chars.bottom, &[1]), "└─┘");
    }

    #[test]
    fn test_ascii_fallback() {
        assert_eq!(BoxBorder::Heavy.chars(false), Some(&ASCII));
        assert_eq!(BoxBorder::None.chars(true), None);
    }
}
