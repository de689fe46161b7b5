//! Converts raw arguments into a flat token stream.
//!
//! Arguments arrive already split by the OS. Each argument is scanned left to
//! right; option arguments may expand into several tokens (grouped short
//! options, embedded `=`/`:` values). A bare `--` switches the remainder of the
//! input into raw mode.

use tracing::trace;

use crate::error::{ParseError, ParseErrorKind};
use crate::token::{CommandLine, Token, TokenKind, TokenStream};

/// Tokenize an argument vector (process name excluded).
///
/// # Example
///
/// ```
/// use kumi_cli::{tokenize, TokenKind};
///
/// let args = vec!["add".to_string(), "--name=Rufus".to_string()];
/// let stream = tokenize(&args).unwrap();
/// let kinds: Vec<_> = stream.tokens().iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, [TokenKind::String, TokenKind::LongOption, TokenKind::String]);
/// ```
pub fn tokenize(args: &[String]) -> Result<TokenStream, ParseError> {
    let line = CommandLine::new(args.to_vec());
    let mut tokens = Vec::new();
    let mut raw = false;

    for (index, arg) in args.iter().enumerate() {
        let position = line.offset_of(index);

        if raw {
            tokens.push(Token::new(TokenKind::String, position, index, arg.as_str(), arg.as_str()));
            continue;
        }

        if arg == "--" {
            tokens.push(Token::new(TokenKind::Separator, position, index, "--", "--"));
            raw = true;
            continue;
        }

        let scanner = ArgScanner {
            line: &line,
            index,
            position,
            chars: arg.chars().collect(),
        };
        scanner.scan(&mut tokens)?;
    }

    trace!(args = args.len(), tokens = tokens.len(), "tokenized command line");
    Ok(TokenStream::new(tokens, line))
}

/// Scanner over a single argument.
struct ArgScanner<'a> {
    line: &'a CommandLine,
    index: usize,
    position: usize,
    chars: Vec<char>,
}

impl ArgScanner<'_> {
    fn scan(&self, tokens: &mut Vec<Token>) -> Result<(), ParseError> {
        match self.chars.as_slice() {
            ['-', '-', ..] => self.scan_long_option(tokens),
            ['-', _, ..] if self.is_negative_number() => {
                tokens.push(self.whole_string());
                Ok(())
            }
            ['-', _, ..] => self.scan_short_options(tokens),
            _ => {
                let (value, representation) = self.read_string(0)?;
                tokens.push(Token::new(
                    TokenKind::String,
                    self.position,
                    self.index,
                    value,
                    representation,
                ));
                Ok(())
            }
        }
    }

    fn whole_string(&self) -> Token {
        let text: String = self.chars.iter().collect();
        Token::new(TokenKind::String, self.position, self.index, text.clone(), text)
    }

    /// `-1`, `-1.5` and `-.5` are values, not options.
    fn is_negative_number(&self) -> bool {
        match (self.chars.get(1), self.chars.get(2)) {
            (Some(c), _) if c.is_ascii_digit() => true,
            (Some('.'), Some(c)) => c.is_ascii_digit(),
            _ => false,
        }
    }

    fn scan_long_option(&self, tokens: &mut Vec<Token>) -> Result<(), ParseError> {
        let mut cursor = 2;
        while cursor < self.chars.len() && !is_value_separator(self.chars[cursor]) {
            cursor += 1;
        }
        let name: String = self.chars[2..cursor].iter().collect();
        let representation = format!("--{}", name);

        if name.is_empty() {
            let token = Token::new(TokenKind::LongOption, self.position, self.index, "", "--");
            return Err(self.error(ParseErrorKind::LongOptionNameIsMissing, token));
        }

        let option = Token::new(
            TokenKind::LongOption,
            self.position,
            self.index,
            name.as_str(),
            representation.as_str(),
        );

        if let Some(first) = name.chars().next() {
            if first.is_ascii_digit() {
                return Err(self.error(
                    ParseErrorKind::LongOptionNameStartsWithDigit { name: name.clone() },
                    option,
                ));
            }
        }

        for (offset, symbol) in name.chars().enumerate() {
            if !(symbol.is_alphanumeric() || symbol == '-' || symbol == '_') {
                let token = Token::new(
                    TokenKind::LongOption,
                    self.position + 2 + offset,
                    self.index,
                    symbol.to_string(),
                    symbol.to_string(),
                );
                return Err(self.error(
                    ParseErrorKind::LongOptionNameContainsSymbol {
                        name: name.clone(),
                        symbol,
                    },
                    token,
                ));
            }
        }

        if name.chars().count() == 1 {
            return Err(self.error(
                ParseErrorKind::LongOptionNameIsOneCharacter { name: name.clone() },
                option,
            ));
        }

        tokens.push(option);
        self.scan_assigned_value(cursor, tokens)
    }

    fn scan_short_options(&self, tokens: &mut Vec<Token>) -> Result<(), ParseError> {
        let mut cursor = 1;
        let mut group: Vec<Token> = Vec::new();

        while cursor < self.chars.len() {
            let current = self.chars[cursor];
            if is_value_separator(current) {
                break;
            }
            if !current.is_alphabetic() {
                let token = Token::new(
                    TokenKind::ShortOption,
                    self.position + cursor,
                    self.index,
                    current.to_string(),
                    current.to_string(),
                );
                return Err(self.error(ParseErrorKind::InvalidShortOptionName { name: current }, token));
            }
            let representation = if group.is_empty() {
                format!("-{}", current)
            } else {
                current.to_string()
            };
            group.push(Token::new(
                TokenKind::ShortOption,
                self.position,
                self.index,
                current.to_string(),
                representation,
            ));
            cursor += 1;
        }

        if group.is_empty() {
            let token = Token::new(TokenKind::ShortOption, self.position, self.index, "", "-");
            return Err(self.error(ParseErrorKind::ShortOptionNameIsMissing, token));
        }

        if group.len() > 1 {
            for token in &mut group {
                token.is_grouped = true;
            }
        }
        tokens.extend(group);
        self.scan_assigned_value(cursor, tokens)
    }

    /// `--name=value` / `-n:value`: emit the value as its own assigned token.
    fn scan_assigned_value(&self, cursor: usize, tokens: &mut Vec<Token>) -> Result<(), ParseError> {
        let Some(&separator) = self.chars.get(cursor) else {
            return Ok(());
        };
        let (value, raw) = self.read_string(cursor + 1)?;
        let token = Token::new(
            TokenKind::String,
            self.position + cursor + 1,
            self.index,
            value,
            format!("{}{}", separator, raw),
        );
        tokens.push(token.assigned());
        Ok(())
    }

    /// Read from `start` to the end of the argument, unquoting if it starts with `"`.
    fn read_string(&self, start: usize) -> Result<(String, String), ParseError> {
        let rest = &self.chars[start.min(self.chars.len())..];
        let raw: String = rest.iter().collect();

        if rest.first() != Some(&'"') {
            return Ok((raw.clone(), raw));
        }

        let mut value = String::new();
        let mut cursor = 1;
        let mut closed = false;
        while cursor < rest.len() {
            match rest[cursor] {
                '\\' if rest.get(cursor + 1) == Some(&'"') => {
                    value.push('"');
                    cursor += 2;
                }
                '"' => {
                    closed = true;
                    cursor += 1;
                    break;
                }
                c => {
                    value.push(c);
                    cursor += 1;
                }
            }
        }

        if !closed {
            let token = Token::new(
                TokenKind::String,
                self.position + start,
                self.index,
                value.clone(),
                raw,
            );
            return Err(self.error(ParseErrorKind::UnterminatedQuote { value }, token));
        }

        value.extend(&rest[cursor..]);
        Ok((value, raw))
    }

    fn error(&self, kind: ParseErrorKind, token: Token) -> ParseError {
        ParseError::new(kind, self.line, Some(token))
    }
}

fn is_value_separator(c: char) -> bool {
    c == '=' || c == ':'
}

/// Split a complete command line into arguments, honoring quotes.
///
/// Used when a host receives the command line as one string. Single and
/// double quotes group whitespace; a backslash escapes the next character
/// inside double quotes.
pub fn split_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<(char, usize)> = None;
    let mut chars = input.chars().enumerate();

    while let Some((offset, c)) = chars.next() {
        match quote {
            Some((q, _)) if c == q => quote = None,
            Some(('"', _)) if c == '\\' => {
                if let Some((_, next)) = chars.next() {
                    current.push(next);
                }
            }
            Some(_) => current.push(c),
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None if c == '"' || c == '\'' => {
                quote = Some((c, offset));
                in_arg = true;
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if let Some((_, offset)) = quote {
        let line = CommandLine::new(vec![input.to_string()]);
        let rest: String = input.chars().skip(offset).collect();
        let token = Token::new(TokenKind::String, offset, 0, current.clone(), rest);
        return Err(ParseError::new(
            ParseErrorKind::UnterminatedQuote { value: current },
            &line,
            Some(token),
        ));
    }

    if in_arg {
        args.push(current);
    }
    Ok(args)
}
