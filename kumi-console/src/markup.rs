//! Console markup: `[bold red]text[/]`.
//!
//! A tag opens a style scope that lasts until `[/]` (closes the innermost
//! scope) or `[/tag]` (closes the innermost scope opened with that exact
//! tag). `[[` and `]]` produce literal brackets.

use tracing::trace;

use crate::error::MarkupError;
use crate::style::Style;
use crate::text::Text;

pub struct Markup;

struct OpenTag {
    tag: String,
    position: usize,
    span: usize,
}

impl Markup {
    pub fn parse(markup: &str) -> Result<Text, MarkupError> {
        let mut plain = String::with_capacity(markup.len());
        let mut spans: Vec<(usize, usize, Style)> = Vec::new();
        let mut stack: Vec<OpenTag> = Vec::new();

        let mut i = 0;
        while i < markup.len() {
            let rest = &markup[i..];
            if rest.starts_with("[[") {
                plain.push('[');
                i += 2;
                continue;
            }
            if rest.starts_with("]]") {
                plain.push(']');
                i += 2;
                continue;
            }
            if rest.starts_with(']') {
                return Err(MarkupError::UnescapedBracket {
                    character: ']',
                    position: i,
                });
            }
            if !rest.starts_with('[') {
                if let Some(c) = rest.chars().next() {
                    plain.push(c);
                    i += c.len_utf8();
                }
                continue;
            }

            let close = rest[1..].find(']').ok_or(MarkupError::UnescapedBracket {
                character: '[',
                position: i,
            })?;
            let tag = rest[1..1 + close].trim();
            let position = i;
            i += close + 2;

            if let Some(name) = tag.strip_prefix('/') {
                let name = name.trim();
                let found = if name.is_empty() {
                    stack.len().checked_sub(1)
                } else {
                    stack.iter().rposition(|open| open.tag == name)
                };
                let index = found.ok_or_else(|| MarkupError::UnexpectedClosingTag {
                    tag: name.to_string(),
                    position,
                })?;
                let open = stack.remove(index);
                spans[open.span].1 = plain.len();
                continue;
            }

            let style = Style::parse(tag).map_err(|source| MarkupError::UnknownStyle {
                tag: tag.to_string(),
                position,
                source,
            })?;
            spans.push((plain.len(), plain.len(), style));
            stack.push(OpenTag {
                tag: tag.to_string(),
                position,
                span: spans.len() - 1,
            });
        }

        if let Some(open) = stack.pop() {
            return Err(MarkupError::Unbalanced {
                tag: open.tag,
                position: open.position,
            });
        }

        trace!(spans = spans.len(), "parsed markup");
        let mut text = Text::new(plain);
        for (start, end, style) in spans {
            text.stylize(start, end, style);
        }
        Ok(text)
    }

    /// Escape brackets so `text` renders literally.
    pub fn escape(text: &str) -> String {
        text.replace('[', "[[").replace(']', "]]")
    }

    /// Strip all tags, leaving the plain text.
    pub fn remove(markup: &str) -> Result<String, MarkupError> {
        Markup::parse(markup).map(|text| text.plain().to_string())
    }
}
