use crate::cell::{cell_len, ellipsize};
use crate::measure::Measurement;
use crate::render::{Justify, RenderOptions, Renderable};
use crate::segment::Segment;
use crate::style::Style;

/// A horizontal line, optionally with a title.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    title: Option<String>,
    justify: Justify,
    style: Style,
    title_style: Style,
}

impl Rule {
    pub fn new() -> Self {
        Self {
            justify: Justify::Center,
            ..Self::default()
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::new()
        }
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn title_style(mut self, style: Style) -> Self {
        self.title_style = style;
        self
    }
}

impl Renderable for Rule {
    fn measure(&self, _options: &RenderOptions, max_width: usize) -> Measurement {
        Measurement::new(1, max_width)
    }

    fn render(&self, options: &RenderOptions, width: usize) -> Vec<Segment> {
        let fill = if options.unicode { "─" } else { "-" };
        let line = |cells: usize| Segment::styled(fill.repeat(cells), self.style.clone());

        let mut out = Vec::new();
        match self.title.as_deref() {
            // A title needs one cell of space on each side plus a line cell.
            Some(title) if width >= 5 => {
                let title = ellipsize(title, width - 4);
                let label = format!(" {} ", title);
                let rest = width - cell_len(&label);
                let left = match self.justify {
                    Justify::Left => rest.min(2),
                    Justify::Center => rest / 2,
                    Justify::Right => rest.saturating_sub(2),
                };
                if left > 0 {
                    out.push(line(left));
                }
                out.push(Segment::styled(label, self.title_style.clone()));
                if rest > left {
                    out.push(line(rest - left));
                }
            }
            _ => out.push(line(width)),
        }
        out.push(Segment::line_break());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(rule: &Rule, options: &RenderOptions, width: usize) -> String {
        rule.render(options, width)
            .iter()
            .filter(|s| !s.is_line_break())
            .map(|s| s.text.as_str())
            .collect()
    }

    #[test]
    fn test_plain_rule() {
        let options = RenderOptions::default();
        assert_eq!(plain(&Rule::new(), &options, 4), "────");
        let ascii = RenderOptions {
            unicode: false,
            ..options
        };
        assert_eq!(plain(&Rule::new(), &ascii, 4), "----");
    }

    #[test]
    fn test_titled_rule() {
        let options = RenderOptions::default();
        assert_eq!(plain(&Rule::with_title("Hi"), &options, 10), "─── Hi ───");
        let left = Rule::with_title("Hi").justify(Justify::Left);
        assert_eq!(plain(&left, &options, 10), "── Hi ────");
        assert_eq!(plain(&Rule::with_title("Hello"), &options, 6), "─ H… ─");
    }
}
