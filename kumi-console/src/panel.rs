use crate::border::{BoxBorder, BoxChars};
use crate::cell::{cell_len, ellipsize};
use crate::measure::Measurement;
use crate::padder::{pad_lines, Padding};
use crate::render::{render_lines, Justify, RenderOptions, Renderable};
use crate::segment::{join_lines, Segment, SegmentLine};
use crate::style::Style;

/// A renderable inside a box border, with an optional header set into the
/// top edge.
pub struct Panel<R> {
    inner: R,
    border: BoxBorder,
    header: Option<String>,
    header_justify: Justify,
    padding: Padding,
    expand: bool,
    width: Option<usize>,
    border_style: Style,
}

impl<R: Renderable> Panel<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            border: BoxBorder::Square,
            header: None,
            header_justify: Justify::Left,
            padding: Padding::symmetric(0, 1),
            expand: true,
            width: None,
            border_style: Style::default(),
        }
    }

    pub fn border(mut self, border: BoxBorder) -> Self {
        self.border = border;
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn header_justify(mut self, justify: Justify) -> Self {
        self.header_justify = justify;
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Fill the available width. When off, the panel fits its content.
    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    fn edges(&self, options: &RenderOptions) -> usize {
        if self.border.chars(options.unicode).is_some() {
            2
        } else {
            0
        }
    }

    fn top_edge(&self, chars: &BoxChars, inner: usize) -> SegmentLine {
        let [left, fill, _, right] = chars.top;
        let style = self.border_style.clone();
        let header = match self.header.as_deref() {
            Some(header) if inner >= 4 => header,
            _ => return vec![Segment::styled(BoxChars::line(chars.top, &[inner]), style)],
        };

        let label = format!(" {} ", ellipsize(header, inner - 2));
        let rest = inner - cell_len(&label);
        let before = match self.header_justify {
            Justify::Left => rest.min(1),
            Justify::Center => rest / 2,
            Justify::Right => rest.saturating_sub(1),
        };
        let run = |cells: usize| std::iter::repeat(fill).take(cells).collect::<String>();
        vec![
            Segment::styled(format!("{}{}", left, run(before)), style.clone()),
            Segment::new(label),
            Segment::styled(format!("{}{}", run(rest - before), right), style),
        ]
    }
}

impl<R: Renderable> Renderable for Panel<R> {
    fn measure(&self, options: &RenderOptions, max_width: usize) -> Measurement {
        if let Some(width) = self.width {
            return Measurement::fixed(width.min(max_width));
        }
        let extra = self.edges(options) + self.padding.horizontal();
        if max_width <= extra {
            return Measurement::fixed(max_width);
        }
        let content = self.inner.measure(options, max_width - extra);
        let header = self.header.as_deref().map(|h| cell_len(h) + 6).unwrap_or(0);
        Measurement::new(content.min + extra, (content.max + extra).max(header))
            .clamp_max(max_width)
    }

    fn render(&self, options: &RenderOptions, width: usize) -> Vec<Segment> {
        let width = match self.width {
            Some(fixed) => fixed.min(width),
            None if self.expand => width,
            None => self.measure(options, width).max,
        };
        let edges = self.edges(options);
        let extra = edges + self.padding.horizontal();
        if width < extra {
            return Vec::new();
        }
        let content_width = width - extra;
        let lines = render_lines(&self.inner, options, content_width, &Style::default());
        let body = pad_lines(lines, content_width, self.padding, &Style::default());

        let Some(chars) = self.border.chars(options.unicode) else {
            return join_lines(body);
        };
        let inner = width - edges;
        let left = Segment::styled(chars.cell[0].to_string(), self.border_style.clone());
        let right = Segment::styled(chars.cell[3].to_string(), self.border_style.clone());

        let mut out = Vec::with_capacity(body.len() + 2);
        out.push(self.top_edge(chars, inner));
        for line in body {
            let mut framed = Vec::with_capacity(line.len() + 2);
            framed.push(left.clone());
            framed.extend(line);
            framed.push(right.clone());
            out.push(framed);
        }
        out.push(vec![Segment::styled(
            BoxChars::line(chars.bottom, &[inner]),
            self.border_style.clone(),
        )]);
        join_lines(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::split_lines;
    use crate::text::Text;

    fn plain_lines(panel: &impl Renderable, options: &RenderOptions, width: usize) -> Vec<String> {
        split_lines(&panel.render(options, width), None)
            .iter()
            .map(|line| line.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_panel_expands() {
        let panel = Panel::new(Text::new("Hello"));
        assert_eq!(
            plain_lines(&panel, &RenderOptions::default(), 11),
            vec!["┌─────────┐", "│ Hello   │", "└─────────┘"]
        );
    }

    #[test]
    fn test_panel_fits_content_with_header() {
        let panel = Panel::new(Text::new("Hi"))
            .expand(false)
            .border(BoxBorder::Rounded)
            .header("Title");
        assert_eq!(
            plain_lines(&panel, &RenderOptions::default(), 40),
            vec!["╭─ Title ─╮", "│ Hi      │", "╰─────────╯"]
        );
    }

    #[test]
    fn test_panel_ascii_fallback() {
        let options = RenderOptions {
            unicode: false,
            ..RenderOptions::default()
        };
        let panel = Panel::new(Text::new("x")).width(5);
        assert_eq!(
            plain_lines(&panel, &options, 20),
            vec!["+---+", "| x |", "+---+"]
        );
    }
}
