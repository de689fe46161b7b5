//! Running applications against a captured console.

use kumi_console::{Console, TestConsole, DEFAULT_WIDTH};
use tokio_util::sync::CancellationToken;

use crate::app::CommandApp;
use crate::error::CliError;

/// Exit code and console output of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAppResult {
    pub exit_code: i32,
    pub output: String,
}

impl CommandAppResult {
    /// Output lines with trailing whitespace removed.
    pub fn lines(&self) -> Vec<&str> {
        self.output.lines().map(str::trim_end).collect()
    }
}

/// Runs a [`CommandApp`] with its output captured in a [`TestConsole`].
///
/// Every run starts from an empty buffer.
#[derive(Debug)]
pub struct CommandAppTester {
    app: CommandApp,
    console: TestConsole,
}

impl CommandAppTester {
    pub fn new(app: CommandApp) -> Self {
        Self::with_width(app, DEFAULT_WIDTH)
    }

    pub fn with_width(mut app: CommandApp, width: usize) -> Self {
        let console = TestConsole::new();
        app.set_console(Console::testing(console.clone()).with_width(width));
        Self { app, console }
    }

    pub fn app(&self) -> &CommandApp {
        &self.app
    }

    /// Blocking run. Do not call from inside a tokio runtime.
    pub fn run<I, T>(&self, args: I) -> Result<CommandAppResult, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.console.clear();
        let exit_code = self.app.run(args)?;
        Ok(self.result(exit_code))
    }

    pub async fn run_async<I, T>(&self, args: I) -> Result<CommandAppResult, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.run_with_cancellation(args, CancellationToken::new())
            .await
    }

    pub async fn run_with_cancellation<I, T>(
        &self,
        args: I,
        cancellation: CancellationToken,
    ) -> Result<CommandAppResult, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.console.clear();
        let exit_code = self.app.run_with_cancellation(args, cancellation).await?;
        Ok(self.result(exit_code))
    }

    fn result(&self, exit_code: i32) -> CommandAppResult {
        CommandAppResult {
            exit_code,
            output: self.console.output(),
        }
    }
}
