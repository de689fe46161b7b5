use std::io;

use thiserror::Error;

/// A style definition that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("Unknown style '{0}'")]
    UnknownWord(String),

    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    #[error("Expected a color after 'on'")]
    MissingBackground,
}

/// Malformed markup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Unknown style '{tag}' at position {position}: {source}")]
    UnknownStyle {
        tag: String,
        position: usize,
        source: StyleError,
    },

    #[error("Unexpected closing tag '[/{tag}]' at position {position}")]
    UnexpectedClosingTag { tag: String, position: usize },

    #[error("Unbalanced markup: '[{tag}]' opened at position {position} is never closed")]
    Unbalanced { tag: String, position: usize },

    #[error("Unescaped '{character}' at position {position}")]
    UnescapedBracket { character: char, position: usize },
}

/// Failure printing to a console.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
