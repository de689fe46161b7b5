//! Text styles.
//!
//! A [`Style`] is a set of optional attributes. Styles layer with
//! [`Style::combine`]: attributes set on the upper style win, effects are
//! unioned.

use std::fmt;

use anstyle::{Ansi256Color, AnsiColor, Color, Effects, RgbColor};

use crate::error::StyleError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub effects: Effects,
    pub link: Option<String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fg(mut self, color: impl Into<Color>) -> Self {
        self.foreground = Some(color.into());
        self
    }

    pub fn bg(mut self, color: impl Into<Color>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn effect(mut self, effect: Effects) -> Self {
        self.effects = self.effects | effect;
        self
    }

    pub fn bold(self) -> Self {
        self.effect(Effects::BOLD)
    }

    pub fn dim(self) -> Self {
        self.effect(Effects::DIMMED)
    }

    pub fn italic(self) -> Self {
        self.effect(Effects::ITALIC)
    }

    pub fn underline(self) -> Self {
        self.effect(Effects::UNDERLINE)
    }

    pub fn link(mut self, url: impl Into<String>) -> Self {
        self.link = Some(url.into());
        self
    }

    pub fn is_plain(&self) -> bool {
        self.foreground.is_none()
            && self.background.is_none()
            && self.effects.is_plain()
            && self.link.is_none()
    }

    /// Layer `upper` on top of `self`.
    pub fn combine(&self, upper: &Style) -> Style {
        Style {
            foreground: upper.foreground.or(self.foreground),
            background: upper.background.or(self.background),
            effects: self.effects | upper.effects,
            link: upper.link.clone().or_else(|| self.link.clone()),
        }
    }

    /// The SGR part of this style. Links are written separately.
    pub fn to_anstyle(&self) -> anstyle::Style {
        anstyle::Style::new()
            .fg_color(self.foreground)
            .bg_color(self.background)
            .effects(self.effects)
    }

    /// Parse a style definition such as `bold red on #0000ff`.
    pub fn parse(definition: &str) -> Result<Style, StyleError> {
        let mut style = Style::new();
        let mut words = definition.split_whitespace();
        while let Some(word) = words.next() {
            let lower = word.to_ascii_lowercase();
            if lower == "on" {
                let color = words.next().ok_or(StyleError::MissingBackground)?;
                style.background = parse_color(color)?;
                continue;
            }
            if let Some(url) = word.strip_prefix("link=") {
                style.link = Some(url.to_string());
                continue;
            }
            if let Some(effect) = parse_effect(&lower) {
                style.effects = style.effects | effect;
                continue;
            }
            match parse_color(word) {
                Ok(color) => style.foreground = color,
                Err(StyleError::InvalidColor(_)) if !looks_like_color(&lower) => {
                    return Err(StyleError::UnknownWord(word.to_string()));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(style)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words: Vec<String> = Vec::new();
        for (effect, name) in EFFECT_NAMES {
            if self.effects.contains(*effect) {
                words.push(name.to_string());
            }
        }
        if let Some(color) = self.foreground {
            words.push(color_name(color));
        }
        if let Some(color) = self.background {
            words.push(format!("on {}", color_name(color)));
        }
        if let Some(link) = &self.link {
            words.push(format!("link={}", link));
        }
        if words.is_empty() {
            return f.write_str("none");
        }
        f.write_str(&words.join(" "))
    }
}

const EFFECT_NAMES: &[(Effects, &str)] = &[
    (Effects::BOLD, "bold"),
    (Effects::DIMMED, "dim"),
    (Effects::ITALIC, "italic"),
    (Effects::UNDERLINE, "underline"),
    (Effects::BLINK, "blink"),
    (Effects::INVERT, "invert"),
    (Effects::HIDDEN, "conceal"),
    (Effects::STRIKETHROUGH, "strikethrough"),
];

const COLOR_NAMES: &[(&str, AnsiColor)] = &[
    ("black", AnsiColor::Black),
    ("red", AnsiColor::Red),
    ("green", AnsiColor::Green),
    ("yellow", AnsiColor::Yellow),
    ("blue", AnsiColor::Blue),
    ("magenta", AnsiColor::Magenta),
    ("cyan", AnsiColor::Cyan),
    ("white", AnsiColor::White),
    ("bright_black", AnsiColor::BrightBlack),
    ("bright_red", AnsiColor::BrightRed),
    ("bright_green", AnsiColor::BrightGreen),
    ("bright_yellow", AnsiColor::BrightYellow),
    ("bright_blue", AnsiColor::BrightBlue),
    ("bright_magenta", AnsiColor::BrightMagenta),
    ("bright_cyan", AnsiColor::BrightCyan),
    ("bright_white", AnsiColor::BrightWhite),
];

fn parse_effect(word: &str) -> Option<Effects> {
    let effect = match word {
        "bold" | "b" => Effects::BOLD,
        "dim" => Effects::DIMMED,
        "italic" | "i" => Effects::ITALIC,
        "underline" | "u" => Effects::UNDERLINE,
        "blink" => Effects::BLINK,
        "invert" | "reverse" => Effects::INVERT,
        "conceal" => Effects::HIDDEN,
        "strikethrough" | "s" => Effects::STRIKETHROUGH,
        _ => return None,
    };
    Some(effect)
}

fn looks_like_color(word: &str) -> bool {
    word.starts_with('#') || word.starts_with("rgb(") || word.starts_with("color(")
}

/// `Ok(None)` for `default`.
fn parse_color(word: &str) -> Result<Option<Color>, StyleError> {
    let lower = word.to_ascii_lowercase();
    let invalid = || StyleError::InvalidColor(word.to_string());

    if lower == "default" {
        return Ok(None);
    }
    if lower == "grey" || lower == "gray" {
        return Ok(Some(AnsiColor::BrightBlack.into()));
    }
    if let Some((_, color)) = COLOR_NAMES.iter().find(|(name, _)| *name == lower) {
        return Ok(Some((*color).into()));
    }
    if let Some(hex) = lower.strip_prefix('#') {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        return Ok(Some(RgbColor(channel(0)?, channel(2)?, channel(4)?).into()));
    }
    if let Some(inner) = lower.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
        let channels = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<Result<Vec<u8>, StyleError>>()?;
        return match channels.as_slice() {
            [r, g, b] => Ok(Some(RgbColor(*r, *g, *b).into())),
            _ => Err(invalid()),
        };
    }
    if let Some(inner) = lower.strip_prefix("color(").and_then(|s| s.strip_suffix(')')) {
        let index = inner.trim().parse::<u8>().map_err(|_| invalid())?;
        return Ok(Some(Ansi256Color(index).into()));
    }
    Err(invalid())
}

fn color_name(color: Color) -> String {
    match color {
        Color::Ansi(ansi) => COLOR_NAMES
            .iter()
            .find(|(_, c)| *c == ansi)
            .map(|(name, _)| name.to_string())
            .unwrap_or_default(),
        Color::Ansi256(Ansi256Color(index)) => format!("color({})", index),
        Color::Rgb(RgbColor(r, g, b)) => format!("#{:02x}{:02x}{:02x}", r, g, b),
    }
}
