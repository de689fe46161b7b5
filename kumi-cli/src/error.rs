//! Error types for the grammar engine.
//!
//! Three families are kept apart:
//!
//! - [`ConfigError`]: schema mistakes detected while the command tree is
//!   registered. They are programming errors and are never swallowed.
//! - [`ParseError`]: bad user input found by the tokenizer or the resolver.
//!   Every parse error keeps the command line and the offending token so a
//!   caret [`Diagnostic`] can be rendered.
//! - [`BindError`]: a resolved value could not be turned into the declared type.

use thiserror::Error;

use crate::diagnostic::Diagnostic;
use crate::token::{CommandLine, Token};

// ============================================================================
// Configuration errors
// ============================================================================

/// Reason an option or argument template was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateErrorKind {
    #[error("template is empty")]
    Empty,

    #[error("options without a name are not allowed")]
    OptionHasNoName,

    #[error("option value has no name")]
    ValueHasNoName,

    #[error("multiple option values are not supported")]
    MultipleValuesNotSupported,

    #[error("the option value must be the last part of the template")]
    ValueMustBeLast,

    #[error("short option '{0}' must be exactly one character")]
    ShortNameTooLong(String),

    #[error("short option '{0}' must be a letter")]
    InvalidShortName(String),

    #[error("long option '{0}' must consist of more than one character")]
    LongNameTooShort(String),

    #[error("long option '{0}' cannot start with a digit")]
    LongNameStartsWithDigit(String),

    #[error("long option '{name}' contains invalid character '{symbol}'")]
    InvalidLongName { name: String, symbol: char },

    #[error("unexpected '{0}'; values must be enclosed in <> or []")]
    UnexpectedPart(String),

    #[error("arguments must be declared as <NAME> or [NAME]")]
    InvalidArgument,
}

/// An invalid option or argument template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid template '{template}': {kind}")]
pub struct TemplateError {
    pub template: String,
    pub kind: TemplateErrorKind,
}

impl TemplateError {
    pub(crate) fn new(template: &str, kind: TemplateErrorKind) -> Self {
        Self {
            template: template.to_string(),
            kind,
        }
    }
}

/// Configuration-time error in the command tree or a settings schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("No commands have been configured.")]
    NoCommandsConfigured,

    #[error("Invalid command name '{0}'.")]
    InvalidCommandName(String),

    #[error("The name '{name}' is used by more than one command under '{parent}'.")]
    DuplicateCommand { parent: String, name: String },

    #[error("The branch '{0}' does not define any commands.")]
    BranchWithoutChildren(String),

    #[error("The branch '{0}' declares arguments; branches may only declare options.")]
    BranchWithArguments(String),

    #[error("More than one default command has been set under '{0}'.")]
    MultipleDefaultCommands(String),

    #[error("Cannot add '{name}' under the command '{parent}'; only the root and branches have children.")]
    ParentIsNotBranch { parent: String, name: String },

    #[error("Parameter '{parameter}' of '{command}': {source}")]
    Template {
        command: String,
        parameter: String,
        #[source]
        source: TemplateError,
    },

    #[error("The option '{option}' is declared more than once in '{command}'.")]
    DuplicateOption { command: String, option: String },

    #[error("The field '{field}' is declared more than once in '{command}'.")]
    DuplicateField { command: String, field: String },

    #[error("The command '{0}' declares more than one vector argument.")]
    MultipleVectorArguments(String),

    #[error("The vector argument '{argument}' of '{command}' must be the last argument.")]
    VectorArgumentNotLast { command: String, argument: String },

    #[error("Two arguments of '{command}' share position {position}.")]
    DuplicateArgumentPosition { command: String, position: usize },

    #[error("The required argument '{argument}' of '{command}' cannot have a default value.")]
    RequiredArgumentWithDefault { command: String, argument: String },

    #[error("The argument '{argument}' of '{command}' has unsupported type {type_name}.")]
    UnsupportedArgumentType {
        command: String,
        argument: String,
        type_name: &'static str,
    },

    #[error("The option '{option}' of '{command}' has an optional value but {type_name} is not a FlagValue.")]
    OptionalValueRequiresFlagValue {
        command: String,
        option: String,
        type_name: &'static str,
    },

    #[error("The option '{option}' of '{command}' has no value, so it must be a flag, not {type_name}.")]
    FlagMustBeBoolean {
        command: String,
        option: String,
        type_name: &'static str,
    },

    #[error("The option '{option}' of '{command}' is pair-deconstructed and cannot also use a type converter.")]
    PairOptionWithConverter { command: String, option: String },

    #[error("The option '{option}' of '{command}' has a pair deconstructor but is not a dictionary or lookup.")]
    DeconstructorWithoutPairs { command: String, option: String },
}

// ============================================================================
// Parse errors
// ============================================================================

/// What went wrong while tokenizing or resolving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    LongOptionNameIsMissing,
    LongOptionNameIsOneCharacter { name: String },
    LongOptionNameStartsWithDigit { name: String },
    LongOptionNameContainsSymbol { name: String, symbol: char },
    ShortOptionNameIsMissing,
    InvalidShortOptionName { name: char },
    UnterminatedQuote { value: String },
    UnknownCommand { name: String, suggestion: Option<String> },
    MissingCommand { parent: Option<String> },
    CouldNotMatchArgument { value: String },
    UnknownOption { name: String, suggestion: Option<String> },
    OptionHasNoValue { option: String },
    CannotAssignValueToFlag { option: String },
    MissingRequiredArgument { command: String, argument: String },
    MissingRequiredOption { command: String, option: String },
}

impl ParseErrorKind {
    /// One-line headline.
    pub fn message(&self) -> String {
        match self {
            ParseErrorKind::LongOptionNameIsMissing
            | ParseErrorKind::LongOptionNameIsOneCharacter { .. }
            | ParseErrorKind::LongOptionNameStartsWithDigit { .. }
            | ParseErrorKind::LongOptionNameContainsSymbol { .. } => {
                "Invalid long option name.".to_string()
            }
            ParseErrorKind::ShortOptionNameIsMissing
            | ParseErrorKind::InvalidShortOptionName { .. } => {
                "Invalid short option name.".to_string()
            }
            ParseErrorKind::UnterminatedQuote { value } => {
                format!("Encountered unterminated quoted string '{}'.", value)
            }
            ParseErrorKind::UnknownCommand { name, .. } => format!("Unknown command '{}'.", name),
            ParseErrorKind::MissingCommand { parent: Some(parent) } => {
                format!("No command was specified for '{}'.", parent)
            }
            ParseErrorKind::MissingCommand { parent: None } => "No command was specified.".to_string(),
            ParseErrorKind::CouldNotMatchArgument { value } => {
                format!("Could not match '{}' with an argument.", value)
            }
            ParseErrorKind::UnknownOption { name, .. } => format!("Unknown option '{}'.", name),
            ParseErrorKind::OptionHasNoValue { option } => {
                format!("Option '{}' is defined but no value has been provided.", option)
            }
            ParseErrorKind::CannotAssignValueToFlag { option } => {
                format!("Flags cannot be assigned a value ('{}').", option)
            }
            ParseErrorKind::MissingRequiredArgument { command, argument } => format!(
                "Command '{}' is missing required argument '{}'.",
                command, argument
            ),
            ParseErrorKind::MissingRequiredOption { command, option } => format!(
                "Command '{}' is missing required option '{}'.",
                command, option
            ),
        }
    }

    /// Short text printed next to the caret.
    pub fn hint(&self) -> String {
        match self {
            ParseErrorKind::LongOptionNameIsMissing | ParseErrorKind::ShortOptionNameIsMissing => {
                "Did you forget the option name?".to_string()
            }
            ParseErrorKind::LongOptionNameIsOneCharacter { name } => {
                format!("Did you mean -{}?", name)
            }
            ParseErrorKind::LongOptionNameStartsWithDigit { .. } => {
                "Option names cannot start with a digit.".to_string()
            }
            ParseErrorKind::LongOptionNameContainsSymbol { .. } => "Invalid character.".to_string(),
            ParseErrorKind::InvalidShortOptionName { .. } => {
                "Short option names must be letters.".to_string()
            }
            ParseErrorKind::UnterminatedQuote { .. } => {
                "Did you forget the closing quotation mark?".to_string()
            }
            ParseErrorKind::UnknownCommand { suggestion, .. }
            | ParseErrorKind::UnknownOption { suggestion, .. } => match suggestion {
                Some(s) => format!("Did you mean '{}'?", s),
                None if matches!(self, ParseErrorKind::UnknownCommand { .. }) => {
                    "No such command.".to_string()
                }
                None => "Unknown option.".to_string(),
            },
            ParseErrorKind::MissingCommand { .. } => "Expected a command.".to_string(),
            ParseErrorKind::CouldNotMatchArgument { .. } => {
                "Could not match to argument.".to_string()
            }
            ParseErrorKind::OptionHasNoValue { .. } => "No value provided.".to_string(),
            ParseErrorKind::CannotAssignValueToFlag { .. } => "Can't assign value.".to_string(),
            ParseErrorKind::MissingRequiredArgument { argument, .. } => {
                format!("Missing {}.", argument)
            }
            ParseErrorKind::MissingRequiredOption { option, .. } => format!("Missing {}.", option),
        }
    }
}

/// A tokenizer or resolver failure with enough context for a caret diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .kind.message())]
pub struct ParseError {
    kind: ParseErrorKind,
    command_line: CommandLine,
    token: Option<Token>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, command_line: &CommandLine, token: Option<Token>) -> Self {
        Self {
            kind,
            command_line: command_line.clone(),
            token,
        }
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// The token the error points at, if any.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn command_line(&self) -> &CommandLine {
        &self.command_line
    }

    /// Caret diagnostic pointing at the offending token.
    ///
    /// Errors without a token (missing arguments) point just past the end of the line.
    pub fn diagnostic(&self) -> Diagnostic {
        let line = self.command_line.text();
        let (position, length) = match &self.token {
            Some(token) => {
                // Assigned values start after their `=`/`:` separator.
                let separator = usize::from(token.is_assigned);
                let length = token.representation.chars().count().saturating_sub(separator);
                (token.position, length.max(1))
            }
            None => {
                let end = self.command_line.char_len();
                (if end == 0 { 0 } else { end + 1 }, 1)
            }
        };
        Diagnostic::new(self.kind.message(), line, position, length, Some(self.kind.hint()))
    }
}

// ============================================================================
// Binding errors
// ============================================================================

/// A settings value rejected by its own validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn valid_values_suffix(domain: &Option<Vec<String>>) -> String {
    match domain {
        Some(values) if !values.is_empty() => format!(" Valid values are: {}.", values.join(", ")),
        _ => String::new(),
    }
}

/// Runtime failure turning resolved strings into typed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("Failed to convert '{value}' to {type_name} for {parameter}: {reason}.{}", valid_values_suffix(.domain))]
    Conversion {
        parameter: String,
        value: String,
        type_name: &'static str,
        reason: String,
        domain: Option<Vec<String>>,
    },

    #[error("No converter found for type {type_name}.")]
    NoConverter { type_name: &'static str },

    #[error("The value '{value}' for {parameter} is not in a correct format.")]
    PairFormat { parameter: String, value: String },

    #[error("No value was provided for {parameter}.")]
    MissingValue { parameter: String },

    #[error("The settings type {settings} has no parameter named '{field}'.")]
    UnknownField {
        settings: &'static str,
        field: String,
    },

    #[error("The converter for {parameter} does not produce {expected}.")]
    ConverterTypeMismatch {
        parameter: String,
        expected: &'static str,
    },

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn line(args: &[&str]) -> CommandLine {
        CommandLine::new(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_unknown_command_hint_with_suggestion() {
        let kind = ParseErrorKind::UnknownCommand {
            name: "bat".to_string(),
            suggestion: Some("cat".to_string()),
        };
        assert_eq!(kind.message(), "Unknown command 'bat'.");
        assert_eq!(kind.hint(), "Did you mean 'cat'?");
    }

    #[test]
    fn test_unknown_command_hint_without_suggestion() {
        let kind = ParseErrorKind::UnknownCommand {
            name: "xyz".to_string(),
            suggestion: None,
        };
        assert_eq!(kind.hint(), "No such command.");
    }

    #[test]
    fn test_parse_error_display_uses_message() {
        let err = ParseError::new(
            ParseErrorKind::OptionHasNoValue {
                option: "--name".to_string(),
            },
            &line(&["--name"]),
            Some(Token::new(TokenKind::LongOption, 0, 0, "name", "--name")),
        );
        assert_eq!(
            err.to_string(),
            "Option '--name' is defined but no value has been provided."
        );
    }

    #[test]
    fn test_diagnostic_without_token_points_past_end() {
        let err = ParseError::new(
            ParseErrorKind::MissingRequiredArgument {
                command: "add".to_string(),
                argument: "<NAME>".to_string(),
            },
            &line(&["add"]),
            None,
        );
        let diagnostic = err.diagnostic();
        assert_eq!(diagnostic.caret, 4..5);
    }

    #[test]
    fn test_conversion_error_lists_domain() {
        let err = BindError::Conversion {
            parameter: "--color".to_string(),
            value: "pink".to_string(),
            type_name: "Color",
            reason: "unknown variant".to_string(),
            domain: Some(vec!["red".to_string(), "blue".to_string()]),
        };
        assert_eq!(
            err.to_string(),
            "Failed to convert 'pink' to Color for --color: unknown variant. Valid values are: red, blue."
        );
    }
}
