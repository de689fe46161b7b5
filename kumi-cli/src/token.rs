//! Token types produced by the tokenizer.

use std::fmt;

/// Kind of a command-line token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `--name`
    LongOption,

    /// `-x`, possibly one of several grouped short options (`-abc`).
    ShortOption,

    /// Any value: positional arguments, option values, raw arguments after `--`.
    String,

    /// A bare `--` that ends option parsing.
    Separator,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::LongOption => "long option",
            TokenKind::ShortOption => "short option",
            TokenKind::String => "string",
            TokenKind::Separator => "separator",
        };
        f.write_str(name)
    }
}

/// A single token of the command line.
///
/// Tokens are immutable once produced. `position` is the character offset
/// of the token inside the command line rendered by [`CommandLine::text`],
/// which is what caret diagnostics point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,

    /// Character offset inside the joined command line.
    pub position: usize,

    /// Index of the argument this token was scanned from.
    pub argument: usize,

    /// Semantic value (option name without dashes, unquoted string).
    pub value: String,

    /// Text as it appeared in the argument.
    pub representation: String,

    /// Part of a short option group such as `-abc`.
    pub is_grouped: bool,

    /// A value embedded in an option argument with `=` or `:`.
    pub is_assigned: bool,
}

impl Token {
    pub(crate) fn new(
        kind: TokenKind,
        position: usize,
        argument: usize,
        value: impl Into<String>,
        representation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            position,
            argument,
            value: value.into(),
            representation: representation.into(),
            is_grouped: false,
            is_assigned: false,
        }
    }

    pub(crate) fn assigned(mut self) -> Self {
        self.is_assigned = true;
        self
    }

    /// Whether this token is an option (long or short).
    pub fn is_option(&self) -> bool {
        matches!(self.kind, TokenKind::LongOption | TokenKind::ShortOption)
    }

    /// Option-style display name (`--name`, `-n`), or the value for other kinds.
    pub fn option_name(&self) -> String {
        match self.kind {
            TokenKind::LongOption => format!("--{}", self.value),
            TokenKind::ShortOption => format!("-{}", self.value),
            TokenKind::String | TokenKind::Separator => self.value.clone(),
        }
    }
}

/// The original argument vector, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandLine {
    args: Vec<String>,
}

impl CommandLine {
    /// Wrap an argument vector (process name excluded).
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// The raw arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Arguments joined with single spaces.
    pub fn text(&self) -> String {
        self.args.join(" ")
    }

    /// Character length of [`CommandLine::text`].
    pub fn char_len(&self) -> usize {
        let chars: usize = self.args.iter().map(|a| a.chars().count()).sum();
        chars + self.args.len().saturating_sub(1)
    }

    /// Character offset at which argument `index` starts.
    pub fn offset_of(&self, index: usize) -> usize {
        self.args
            .iter()
            .take(index)
            .map(|a| a.chars().count() + 1)
            .sum()
    }
}

/// Ordered token sequence with a read cursor.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
    command_line: CommandLine,
}

impl TokenStream {
    pub(crate) fn new(tokens: Vec<Token>, command_line: CommandLine) -> Self {
        Self {
            tokens,
            cursor: 0,
            command_line,
        }
    }

    /// All tokens, independent of the cursor.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The command line the tokens were produced from.
    pub fn command_line(&self) -> &CommandLine {
        &self.command_line
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Next unconsumed token.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    /// Consume and return the next token.
    pub fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    /// Rebuild one string per argument by concatenating token representations.
    ///
    /// For unquoted input this reproduces the original arguments.
    pub fn reconstruct(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        let mut current: Option<usize> = None;
        for token in &self.tokens {
            if current == Some(token.argument) {
                if let Some(last) = args.last_mut() {
                    last.push_str(&token.representation);
                }
            } else {
                args.push(token.representation.clone());
                current = Some(token.argument);
            }
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(args: &[&str]) -> CommandLine {
        CommandLine::new(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_command_line_offsets() {
        let line = line(&["add", "--name", "Rufus"]);
        assert_eq!(line.text(), "add --name Rufus");
        assert_eq!(line.offset_of(0), 0);
        assert_eq!(line.offset_of(1), 4);
        assert_eq!(line.offset_of(2), 11);
        assert_eq!(line.char_len(), 16);
    }

    #[test]
    fn test_stream_cursor() {
        let mut stream = TokenStream::new(
            vec![
                Token::new(TokenKind::String, 0, 0, "a", "a"),
                Token::new(TokenKind::String, 2, 1, "b", "b"),
            ],
            line(&["a", "b"]),
        );
        assert_eq!(stream.peek().map(|t| t.value.as_str()), Some("a"));
        assert_eq!(stream.consume().map(|t| t.value), Some("a".to_string()));
        assert_eq!(stream.consume().map(|t| t.value), Some("b".to_string()));
        assert!(stream.consume().is_none());
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_option_name() {
        let long = Token::new(TokenKind::LongOption, 0, 0, "name", "--name");
        let short = Token::new(TokenKind::ShortOption, 0, 0, "n", "-n");
        assert_eq!(long.option_name(), "--name");
        assert_eq!(short.option_name(), "-n");
        assert!(long.is_option());
    }
}
