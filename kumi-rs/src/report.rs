//! Pretty-printing of runtime errors.

use kumi_cli::Diagnostic;
use kumi_console::{AnsiColor, Console, Overflow, Style, Text};

use crate::error::CliError;

const INDENT: &str = "       ";

fn error_style() -> Style {
    Style::new().fg(AnsiColor::Red).bold()
}

/// The `Error: message` headline.
pub fn headline(message: &str) -> Text {
    let mut text = Text::new("");
    text.append("Error:", Some(error_style()));
    text.append(" ", None);
    text.append(message, None);
    text
}

/// The command line with a caret row under the offending token.
///
/// Never wraps, so the caret stays under its token.
pub fn caret_block(diagnostic: &Diagnostic) -> Text {
    let mut text = Text::new("\n")
        .with_no_wrap(true)
        .with_overflow(Overflow::Crop);
    text.append(INDENT, None);
    text.append(&diagnostic.line, None);
    text.append("\n", None);
    text.append(INDENT, None);
    text.append(&" ".repeat(diagnostic.caret.start), None);
    text.append(
        &"^".repeat(diagnostic.caret.end - diagnostic.caret.start),
        Some(Style::new().fg(AnsiColor::Red)),
    );
    if let Some(hint) = &diagnostic.hint {
        text.append(" ", None);
        text.append(hint, None);
    }
    text
}

/// Print `error` to `console`, with a caret diagnostic for parse errors.
pub fn report(console: &Console, error: &CliError) -> std::io::Result<()> {
    match error.diagnostic() {
        Some(diagnostic) => {
            console.print(&headline(&diagnostic.message))?;
            console.print(&caret_block(&diagnostic))
        }
        None => console.print(&headline(&error.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kumi_cli::{
        CommandModelBuilder, CommandSettings, CommandTreeResolver, EmptySettings, NodeId,
        ParsingOptions,
    };
    use kumi_console::TestConsole;

    fn parse_error(args: &[&str]) -> CliError {
        let mut builder = CommandModelBuilder::new(ParsingOptions::default());
        builder
            .add_command(NodeId::ROOT, "dog", EmptySettings::schema())
            .unwrap();
        builder
            .add_command(NodeId::ROOT, "cat", EmptySettings::schema())
            .unwrap();
        let model = builder.build().unwrap();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        CommandTreeResolver::new(&model)
            .resolve_args(&args)
            .unwrap_err()
            .into()
    }

    #[test]
    fn test_report_matches_plain_diagnostic() {
        let error = parse_error(&["bat", "14"]);
        let sink = TestConsole::new();
        let console = Console::testing(sink.clone());
        report(&console, &error).unwrap();

        let plain = error.diagnostic().unwrap().render_plain();
        let expected: Vec<String> = plain.lines().map(|l| l.trim_end().to_string()).collect();
        assert_eq!(sink.lines(), expected);
        assert_eq!(sink.lines()[3], "       ^^^ Did you mean 'cat'?");
    }

    #[test]
    fn test_report_other_errors_as_headline() {
        let sink = TestConsole::new();
        let console = Console::testing(sink.clone());
        report(&console, &CliError::message("disk full")).unwrap();
        assert_eq!(sink.lines(), vec!["Error: disk full"]);
    }
}
