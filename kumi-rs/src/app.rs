//! Command registration and the execution pipeline.
//!
//! An invocation runs tokenize → resolve → bind → validate → intercept →
//! execute. Each run builds fresh parser state from the registered tree; only
//! the frozen [`CommandModel`] crosses from parsing into execution.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use kumi_cli::{
    Binder, CaseSensitivity, CommandModel, CommandModelBuilder, CommandSettings,
    CommandTreeResolver, ConfigError, ConverterRegistry, NodeId, ParsingOptions,
    ResolvedCommandTree, Scalar, ValueEnum,
};
use kumi_console::Console;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{
    branch_binder, BranchBinder, Command, CommandExecutor, CommandInterceptor, DelegateCommand,
    Executor,
};
use crate::context::{CommandContext, SharedAny};
use crate::error::{CliError, CliResult};
use crate::report::report;
use crate::settings::AppSettings;

/// Custom handler for runtime errors; returns the exit code.
///
/// The resolved tree is `None` when the failure happened before resolution
/// completed.
pub type ErrorHandler = Arc<dyn Fn(&CliError, Option<&ResolvedCommandTree>) -> i32 + Send + Sync>;

// ============================================================================
// Registry shared by the configurators
// ============================================================================

struct Registry {
    builder: CommandModelBuilder,
    /// Indexed by `ExecutorId`.
    executors: Vec<Arc<dyn Executor>>,
    data: HashMap<NodeId, SharedAny>,
    branches: HashMap<NodeId, BranchBinder>,
}

impl Registry {
    fn new() -> Self {
        Self {
            builder: CommandModelBuilder::new(ParsingOptions::default()),
            executors: Vec::new(),
            data: HashMap::new(),
            branches: HashMap::new(),
        }
    }

    fn add_command<C: Command>(
        &mut self,
        parent: NodeId,
        name: &str,
        command: C,
    ) -> Result<NodeId, ConfigError> {
        let (id, executor) = self
            .builder
            .add_command(parent, name, C::Settings::schema())?;
        debug_assert_eq!(executor.index(), self.executors.len());
        self.executors.push(Arc::new(CommandExecutor(command)));
        Ok(id)
    }

    fn add_default_command<C: Command>(
        &mut self,
        parent: NodeId,
        command: C,
    ) -> Result<NodeId, ConfigError> {
        let (id, executor) = self
            .builder
            .add_default_command(parent, C::Settings::schema())?;
        debug_assert_eq!(executor.index(), self.executors.len());
        self.executors.push(Arc::new(CommandExecutor(command)));
        Ok(id)
    }

    fn add_branch<S: CommandSettings>(
        &mut self,
        parent: NodeId,
        name: &str,
    ) -> Result<NodeId, ConfigError> {
        let id = self.builder.add_branch(parent, name, S::schema())?;
        self.branches.insert(id, branch_binder::<S>());
        Ok(id)
    }
}

// ============================================================================
// Configurators
// ============================================================================

/// Handle on a freshly registered command or branch.
pub struct CommandConfigurator<'a> {
    registry: &'a mut Registry,
    id: NodeId,
}

impl CommandConfigurator<'_> {
    pub fn with_alias(self, alias: &str) -> Result<Self, ConfigError> {
        self.registry.builder.add_alias(self.id, alias)?;
        Ok(self)
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.registry.builder.set_description(self.id, description);
        self
    }

    pub fn hidden(self) -> Self {
        self.registry.builder.set_hidden(self.id, true);
        self
    }

    /// Attach data the command reads back through [`CommandContext::data`].
    pub fn with_data<T: Send + Sync + 'static>(self, data: T) -> Self {
        self.registry.data.insert(self.id, Arc::new(data));
        self
    }

    /// Make this command run when its parent is invoked alone.
    pub fn is_default(self) -> Self {
        self.registry.builder.set_default(self.id);
        self
    }
}

/// Registers the commands of one branch.
pub struct BranchConfigurator<'a> {
    registry: &'a mut Registry,
    id: NodeId,
}

impl BranchConfigurator<'_> {
    pub fn add_command<C: Command>(
        &mut self,
        name: &str,
        command: C,
    ) -> Result<CommandConfigurator<'_>, ConfigError> {
        let id = self.registry.add_command(self.id, name, command)?;
        Ok(CommandConfigurator {
            registry: self.registry,
            id,
        })
    }

    pub fn add_delegate<S, F>(
        &mut self,
        name: &str,
        delegate: F,
    ) -> Result<CommandConfigurator<'_>, ConfigError>
    where
        S: CommandSettings,
        F: Fn(&CommandContext, S) -> CliResult<i32> + Send + Sync + 'static,
    {
        self.add_command(name, DelegateCommand::new(delegate))
    }

    pub fn add_branch<S, F>(
        &mut self,
        name: &str,
        configure: F,
    ) -> Result<CommandConfigurator<'_>, ConfigError>
    where
        S: CommandSettings,
        F: FnOnce(&mut BranchConfigurator<'_>) -> Result<(), ConfigError>,
    {
        let id = self.registry.add_branch::<S>(self.id, name)?;
        configure(&mut BranchConfigurator {
            registry: self.registry,
            id,
        })?;
        Ok(CommandConfigurator {
            registry: self.registry,
            id,
        })
    }

    /// The command run when the branch is invoked without a sub-command.
    pub fn set_default_command<C: Command>(
        &mut self,
        command: C,
    ) -> Result<CommandConfigurator<'_>, ConfigError> {
        let id = self.registry.add_default_command(self.id, command)?;
        Ok(CommandConfigurator {
            registry: self.registry,
            id,
        })
    }

    pub fn with_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.registry.builder.set_description(self.id, description);
        self
    }
}

/// Configures a [`CommandApp`].
pub struct Configurator {
    registry: Registry,
    settings: AppSettings,
    converters: ConverterRegistry,
    error_handler: Option<ErrorHandler>,
    interceptor: Option<Arc<dyn CommandInterceptor>>,
    console: Option<Arc<Console>>,
}

impl Configurator {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            settings: AppSettings::default(),
            converters: ConverterRegistry::default(),
            error_handler: None,
            interceptor: None,
            console: None,
        }
    }

    pub fn add_command<C: Command>(
        &mut self,
        name: &str,
        command: C,
    ) -> Result<CommandConfigurator<'_>, ConfigError> {
        let id = self.registry.add_command(NodeId::ROOT, name, command)?;
        Ok(CommandConfigurator {
            registry: &mut self.registry,
            id,
        })
    }

    /// Register a closure as a command.
    pub fn add_delegate<S, F>(
        &mut self,
        name: &str,
        delegate: F,
    ) -> Result<CommandConfigurator<'_>, ConfigError>
    where
        S: CommandSettings,
        F: Fn(&CommandContext, S) -> CliResult<i32> + Send + Sync + 'static,
    {
        self.add_command(name, DelegateCommand::new(delegate))
    }

    /// Register a branch whose settings `S` may only declare options.
    pub fn add_branch<S, F>(
        &mut self,
        name: &str,
        configure: F,
    ) -> Result<CommandConfigurator<'_>, ConfigError>
    where
        S: CommandSettings,
        F: FnOnce(&mut BranchConfigurator<'_>) -> Result<(), ConfigError>,
    {
        let id = self.registry.add_branch::<S>(NodeId::ROOT, name)?;
        configure(&mut BranchConfigurator {
            registry: &mut self.registry,
            id,
        })?;
        Ok(CommandConfigurator {
            registry: &mut self.registry,
            id,
        })
    }

    /// The command run when the application is invoked without a command.
    pub fn set_default_command<C: Command>(
        &mut self,
        command: C,
    ) -> Result<CommandConfigurator<'_>, ConfigError> {
        let id = self.registry.add_default_command(NodeId::ROOT, command)?;
        Ok(CommandConfigurator {
            registry: &mut self.registry,
            id,
        })
    }

    pub fn settings(&mut self, configure: impl FnOnce(&mut AppSettings)) -> &mut Self {
        configure(&mut self.settings);
        self
    }

    pub fn application_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.settings.application_name = Some(name.into());
        self
    }

    pub fn application_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.settings.application_version = Some(version.into());
        self
    }

    /// Unknown options and unmatched arguments become parse errors.
    pub fn strict_parsing(&mut self, strict: bool) -> &mut Self {
        self.settings.parsing.strict = strict;
        self
    }

    pub fn case_sensitivity(&mut self, sensitivity: CaseSensitivity) -> &mut Self {
        self.settings.parsing.case_sensitivity = sensitivity;
        self
    }

    pub fn convert_flags_to_remaining(&mut self, convert: bool) -> &mut Self {
        self.settings.parsing.convert_flags_to_remaining = convert;
        self
    }

    pub fn suggestion_distance(&mut self, distance: usize) -> &mut Self {
        self.settings.parsing.suggestion_distance = distance;
        self
    }

    /// Return runtime errors from `run` instead of reporting them.
    pub fn propagate_errors(&mut self, propagate: bool) -> &mut Self {
        self.settings.propagate_errors = propagate;
        self
    }

    pub fn cancellation_exit_code(&mut self, code: i32) -> &mut Self {
        self.settings.cancellation_exit_code = code;
        self
    }

    pub fn error_exit_code(&mut self, code: i32) -> &mut Self {
        self.settings.error_exit_code = code;
        self
    }

    pub fn set_error_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&CliError, Option<&ResolvedCommandTree>) -> i32 + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn set_interceptor(&mut self, interceptor: impl CommandInterceptor + 'static) -> &mut Self {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn register_converter<T, F>(&mut self, convert: F) -> &mut Self
    where
        T: Scalar,
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        self.converters.register::<T, F>(convert);
        self
    }

    pub fn register_enum<T: Scalar + ValueEnum>(&mut self) -> &mut Self {
        self.converters.register_enum::<T>();
        self
    }

    /// Render output and errors to `console` instead of standard output.
    pub fn console(&mut self, console: Console) -> &mut Self {
        self.console = Some(Arc::new(console));
        self
    }

    pub fn app_settings(&self) -> &AppSettings {
        &self.settings
    }
}

// ============================================================================
// CommandApp
// ============================================================================

/// A command-line application.
///
/// ```
/// use kumi::prelude::*;
///
/// #[derive(CommandSettings)]
/// struct Greet {
///     #[kumi(argument = "<NAME>")]
///     name: String,
///     #[kumi(option = "-l|--loud")]
///     loud: bool,
/// }
///
/// let mut app = CommandApp::new();
/// app.configure(|c| {
///     c.add_delegate("greet", |ctx: &CommandContext, s: Greet| {
///         let greeting = format!("Hello, {}", s.name);
///         ctx.console().line(&if s.loud { greeting.to_uppercase() } else { greeting })?;
///         Ok(0)
///     })?;
///     Ok(())
/// });
///
/// let tester = CommandAppTester::new(app);
/// let result = tester.run(["greet", "kumi", "--loud"]).unwrap();
/// assert_eq!(result.exit_code, 0);
/// assert_eq!(result.output.trim(), "HELLO, KUMI");
/// ```
pub struct CommandApp {
    config: Configurator,
    pending_error: Option<ConfigError>,
}

impl Default for CommandApp {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandApp")
            .field("settings", &self.config.settings)
            .field("commands", &self.config.registry.executors.len())
            .field("pending_error", &self.pending_error)
            .finish_non_exhaustive()
    }
}

impl CommandApp {
    pub fn new() -> Self {
        Self {
            config: Configurator::new(),
            pending_error: None,
        }
    }

    /// An application that runs `command` when invoked without a command name.
    pub fn with_default_command<C: Command>(command: C) -> Self {
        let mut app = Self::new();
        app.configure(|c| c.set_default_command(command).map(|_| ()));
        app
    }

    /// Register commands and settings.
    ///
    /// The first configuration error is kept and returned by every run.
    pub fn configure<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Configurator) -> Result<(), ConfigError>,
    {
        if self.pending_error.is_none() {
            if let Err(err) = configure(&mut self.config) {
                warn!(error = %err, "configuration failed");
                self.pending_error = Some(err);
            }
        }
        self
    }

    pub fn settings(&self) -> &AppSettings {
        &self.config.settings
    }

    pub(crate) fn set_console(&mut self, console: Console) {
        self.config.console = Some(Arc::new(console));
    }

    /// Run to completion on a fresh current-thread runtime.
    ///
    /// Ctrl-C cancels the running command cooperatively.
    pub fn run<I, T>(&self, args: I) -> Result<i32, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        runtime.block_on(async {
            let cancellation = CancellationToken::new();
            let watcher = tokio::spawn({
                let cancellation = cancellation.clone();
                async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        info!("interrupt received, cancelling");
                        cancellation.cancel();
                    }
                }
            });
            let result = self.run_with_cancellation(args, cancellation).await;
            watcher.abort();
            result
        })
    }

    pub async fn run_async<I, T>(&self, args: I) -> Result<i32, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.run_with_cancellation(args, CancellationToken::new())
            .await
    }

    /// Run with a caller-owned cancellation token.
    ///
    /// Configuration errors are always returned as `Err`. Runtime errors are
    /// returned only when errors propagate; otherwise they go to the error
    /// handler or are reported and mapped to the error exit code.
    pub async fn run_with_cancellation<I, T>(
        &self,
        args: I,
        cancellation: CancellationToken,
    ) -> Result<i32, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if let Some(err) = &self.pending_error {
            return Err(CliError::Configuration(err.clone()));
        }
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let settings = &self.config.settings;

        let mut builder = self.config.registry.builder.clone();
        *builder.options_mut() = settings.parsing.clone();
        let model = builder.build()?;
        let console = self.console();

        if let (Some(version), [flag]) = (&settings.application_version, args.as_slice()) {
            if flag == "--version" || flag == "-v" {
                console.line(version)?;
                return Ok(0);
            }
        }

        let mut resolved = None;
        let outcome = self
            .execute(&model, &args, &console, &mut resolved, cancellation)
            .await;

        match outcome {
            Ok(code) => Ok(code),
            Err(CliError::Cancelled) => {
                info!(code = settings.cancellation_exit_code, "cancelled");
                Ok(settings.cancellation_exit_code)
            }
            Err(err) if err.is_configuration() || settings.propagate_errors => Err(err),
            Err(err) => {
                debug!(error = %err, "command failed");
                match &self.config.error_handler {
                    Some(handler) => Ok(handler(&err, resolved.as_ref())),
                    None => {
                        report(&console, &err)?;
                        Ok(settings.error_exit_code)
                    }
                }
            }
        }
    }

    fn console(&self) -> Arc<Console> {
        match &self.config.console {
            Some(console) => Arc::clone(console),
            None => Arc::new(Console::stdout().with_width(self.config.settings.console_width)),
        }
    }

    async fn execute(
        &self,
        model: &CommandModel,
        args: &[String],
        console: &Arc<Console>,
        resolved: &mut Option<ResolvedCommandTree>,
        cancellation: CancellationToken,
    ) -> CliResult<i32> {
        let tree = CommandTreeResolver::new(model).resolve_args(args)?;
        let tree = resolved.insert(tree);
        let binder = Binder::new(model, &self.config.converters);

        let mut branches = Vec::new();
        for node in &tree.path {
            if let Some(bind) = self.config.registry.branches.get(&node.id) {
                let mut values = binder.bind_values(node)?;
                branches.push(bind(&mut values)?);
            }
        }

        let leaf = tree
            .leaf()
            .ok_or_else(|| CliError::message("No command was resolved."))?;
        let executor = model
            .node(leaf.id)
            .executor()
            .and_then(|id| self.config.registry.executors.get(id.index()))
            .ok_or_else(|| CliError::message("The resolved command has no executor."))?;
        let values = binder.bind_values(leaf)?;

        let ctx = CommandContext {
            name: model.display_name(leaf.id),
            path: model.path_names(leaf.id),
            arguments: args.to_vec(),
            remaining: tree.remaining.clone(),
            data: self.config.registry.data.get(&leaf.id).cloned(),
            branches,
            console: Arc::clone(console),
        };
        debug!(command = %ctx.name, path = ?ctx.path, "executing");

        executor
            .execute(&ctx, values, self.config.interceptor.as_deref(), cancellation)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kumi_cli::EmptySettings;
    use kumi_console::TestConsole;

    fn testing_app() -> (CommandApp, TestConsole) {
        let sink = TestConsole::new();
        let mut app = CommandApp::new();
        app.set_console(Console::testing(sink.clone()));
        (app, sink)
    }

    #[tokio::test]
    async fn test_pending_configuration_error_is_returned() {
        let (mut app, _) = testing_app();
        app.configure(|c| {
            c.add_delegate("bad name", |_: &CommandContext, _: EmptySettings| Ok(0))?;
            Ok(())
        });
        let err = app.run_async(["x"]).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Configuration(ConfigError::InvalidCommandName(_))
        ));
    }

    #[tokio::test]
    async fn test_no_commands_is_configuration_error() {
        let (app, _) = testing_app();
        let err = app.run_async(Vec::<String>::new()).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_version_flag() {
        let (mut app, sink) = testing_app();
        app.configure(|c| {
            c.application_version("1.2.3");
            c.add_delegate("run", |_: &CommandContext, _: EmptySettings| Ok(0))?;
            Ok(())
        });
        assert_eq!(app.run_async(["--version"]).await.unwrap(), 0);
        assert_eq!(app.run_async(["-v"]).await.unwrap(), 0);
        assert_eq!(sink.lines(), vec!["1.2.3", "1.2.3"]);
    }

    #[tokio::test]
    async fn test_default_command_runs_without_args() {
        struct Hello;

        #[async_trait::async_trait]
        impl Command for Hello {
            type Settings = EmptySettings;

            async fn execute(
                &self,
                ctx: &CommandContext,
                _settings: EmptySettings,
                _cancellation: CancellationToken,
            ) -> CliResult<i32> {
                ctx.console().line("hello")?;
                Ok(3)
            }
        }

        let sink = TestConsole::new();
        let mut app = CommandApp::with_default_command(Hello);
        app.set_console(Console::testing(sink.clone()));
        assert_eq!(app.run_async(Vec::<String>::new()).await.unwrap(), 3);
        assert_eq!(sink.lines(), vec!["hello"]);
    }
}
