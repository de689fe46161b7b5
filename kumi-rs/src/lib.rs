//! # kumi
//!
//! Typed command-line applications with composable console output.
//!
//! - **Typed settings**: each command declares a settings type, written by
//!   hand or with `#[derive(CommandSettings)]`, bound from the command line
//!   without reflection.
//! - **Command trees**: commands, branches, aliases and default commands,
//!   with "Did you mean" suggestions and caret diagnostics on bad input.
//! - **Async execution**: commands are `async` and receive a cancellation
//!   token; cancellation maps to its own exit code.
//! - **Console layout**: markup, tables, panels and rules rendered to any
//!   segment sink, including an in-memory one for tests.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kumi::prelude::*;
//!
//! #[derive(CommandSettings)]
//! struct AddSettings {
//!     #[kumi(argument = "<NAME>", description = "Package to add")]
//!     name: String,
//!     #[kumi(option = "--pin <VERSION>")]
//!     pin: Option<String>,
//! }
//!
//! struct Add;
//!
//! #[async_trait]
//! impl Command for Add {
//!     type Settings = AddSettings;
//!
//!     async fn execute(
//!         &self,
//!         ctx: &CommandContext,
//!         settings: AddSettings,
//!         _cancellation: CancellationToken,
//!     ) -> CliResult<i32> {
//!         let mut table = Table::new();
//!         table.add_column(Column::new("Package")).add_column(Column::new("Version"));
//!         table.add_row([settings.name, settings.pin.unwrap_or_else(|| "*".into())]);
//!         ctx.console().print(&table)?;
//!         Ok(0)
//!     }
//! }
//!
//! fn main() {
//!     kumi::init_subscriber();
//!
//!     let mut app = CommandApp::new();
//!     app.configure(|c| {
//!         c.application_name("pkg").application_version("0.1.0");
//!         c.add_command("add", Add)?.with_alias("a")?;
//!         Ok(())
//!     });
//!
//!     let code = app
//!         .run(std::env::args().skip(1))
//!         .unwrap_or_else(|err| {
//!             eprintln!("{}", err);
//!             -1
//!         });
//!     std::process::exit(code);
//! }
//! ```

extern crate self as kumi;

mod app;
mod command;
mod context;
mod error;
mod report;
mod settings;

pub mod testing;
pub mod tracing_support;

pub use app::{BranchConfigurator, CommandApp, CommandConfigurator, Configurator, ErrorHandler};
pub use command::{Command, CommandInterceptor, DelegateCommand};
pub use context::{CommandContext, State};
pub use error::{CliError, CliResult};
pub use report::{caret_block, headline, report};
pub use settings::{AppSettings, DEFAULT_ERROR_EXIT_CODE};

// Both engines, for anything the facade does not re-export by name
pub use kumi_cli as cli;
pub use kumi_console as console;

pub use kumi_cli::{
    BindError, BoundValues, CaseSensitivity, CommandSettings, ConfigError, EmptySettings,
    FlagValue, Lookup, ParseError, ParsingOptions, Remaining, SettingsSchema, ValidationError,
    ValueEnum,
};
pub use kumi_console::{Console, TestConsole};

// Same name as the trait: the derive lives in the macro namespace
pub use kumi_macros::CommandSettings;

pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

pub use tracing_support::{
    debug, error, info, init_subscriber, init_subscriber_with_config, instrument, trace, warn,
    TracingConfig, TracingFormat,
};

/// Everything a typical application needs.
pub mod prelude {
    pub use crate::testing::{CommandAppResult, CommandAppTester};
    pub use crate::{
        async_trait, AppSettings, CancellationToken, CliError, CliResult, Command, CommandApp,
        CommandContext, CommandInterceptor, CommandSettings, EmptySettings, FlagValue, Lookup,
        State, ValidationError,
    };
    pub use kumi_console::{
        Column, Console, Grid, Justify, Markup, Panel, Rule, Style, Table, Text,
    };
}
