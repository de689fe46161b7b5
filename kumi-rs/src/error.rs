//! Top-level error type for command-line applications.

use kumi_cli::{BindError, ConfigError, ParseError, ValidationError};
use kumi_console::ConsoleError;
use thiserror::Error;

/// CLI result type.
///
/// Command bodies return `CliResult<i32>`, the `i32` being the exit code.
pub type CliResult<T> = Result<T, CliError>;

/// Everything that can stop an invocation.
///
/// Configuration errors are programming mistakes and always reach the caller.
/// The other variants are user-facing and are reported through the console
/// unless the application propagates errors. [`CliError::Cancelled`] is not a
/// failure: it maps to the cancellation exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command tree or a settings schema is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The command line could not be tokenized or resolved.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A resolved value could not be converted.
    #[error(transparent)]
    Binding(#[from] BindError),

    /// Settings or command validation rejected the input.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The command itself failed.
    #[error(transparent)]
    Command(#[from] anyhow::Error),

    /// Execution observed a cancellation request.
    #[error("The operation was cancelled.")]
    Cancelled,
}

impl CliError {
    /// Convenience constructor for command failures.
    pub fn message(message: impl std::fmt::Display) -> Self {
        CliError::Command(anyhow::anyhow!("{}", message))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, CliError::Configuration(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CliError::Cancelled)
    }

    /// The caret diagnostic, for parse errors.
    pub fn diagnostic(&self) -> Option<kumi_cli::Diagnostic> {
        match self {
            CliError::Parse(err) => Some(err.diagnostic()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Command(e.into())
    }
}

impl From<ConsoleError> for CliError {
    fn from(e: ConsoleError) -> Self {
        CliError::Command(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructor() {
        let err = CliError::message("disk full");
        assert!(matches!(err, CliError::Command(_)));
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn test_io_error_becomes_command_error() {
        let err: CliError = std::io::Error::other("boom").into();
        assert!(matches!(err, CliError::Command(_)));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_configuration_error_is_flagged() {
        let err: CliError = ConfigError::NoCommandsConfigured.into();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "No commands have been configured.");
        assert!(err.diagnostic().is_none());
    }

    #[test]
    fn test_cancelled() {
        assert!(CliError::Cancelled.is_cancelled());
    }
}
