//! Commands and the type-erased executors the app dispatches to.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use kumi_cli::{BoundValues, CommandSettings, ValidationError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::context::CommandContext;
use crate::error::{CliError, CliResult};

/// A command bound to a settings type.
///
/// ```
/// use kumi::{async_trait, CancellationToken, CliResult, Command, CommandContext, EmptySettings};
///
/// struct Status;
///
/// #[async_trait]
/// impl Command for Status {
///     type Settings = EmptySettings;
///
///     async fn execute(
///         &self,
///         ctx: &CommandContext,
///         _settings: EmptySettings,
///         _cancellation: CancellationToken,
///     ) -> CliResult<i32> {
///         ctx.console().line("ok")?;
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync + 'static {
    type Settings: CommandSettings;

    /// Runs after the settings validated themselves and before execution.
    fn validate(
        &self,
        _ctx: &CommandContext,
        _settings: &Self::Settings,
    ) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Run the command and return its exit code.
    ///
    /// Cancellation is cooperative: long-running commands should watch
    /// `cancellation` and return [`CliError::Cancelled`] when it fires.
    async fn execute(
        &self,
        ctx: &CommandContext,
        settings: Self::Settings,
        cancellation: CancellationToken,
    ) -> CliResult<i32>;
}

/// Hooks around every command execution.
pub trait CommandInterceptor: Send + Sync {
    /// Called with the bound and validated settings, before execution.
    fn intercept(&self, _ctx: &CommandContext, _settings: &dyn Any) {}

    /// Called with the exit code of a successful execution; may rewrite it.
    fn intercept_result(&self, _ctx: &CommandContext, _result: &mut i32) {}
}

/// A command backed by a closure.
pub struct DelegateCommand<S, F> {
    delegate: F,
    _settings: PhantomData<fn() -> S>,
}

impl<S, F> DelegateCommand<S, F>
where
    S: CommandSettings,
    F: Fn(&CommandContext, S) -> CliResult<i32> + Send + Sync + 'static,
{
    pub fn new(delegate: F) -> Self {
        Self {
            delegate,
            _settings: PhantomData,
        }
    }
}

#[async_trait]
impl<S, F> Command for DelegateCommand<S, F>
where
    S: CommandSettings,
    F: Fn(&CommandContext, S) -> CliResult<i32> + Send + Sync + 'static,
{
    type Settings = S;

    async fn execute(
        &self,
        ctx: &CommandContext,
        settings: S,
        _cancellation: CancellationToken,
    ) -> CliResult<i32> {
        (self.delegate)(ctx, settings)
    }
}

// ============================================================================
// Type-erased execution
// ============================================================================

#[async_trait]
pub(crate) trait Executor: Send + Sync {
    async fn execute(
        &self,
        ctx: &CommandContext,
        values: BoundValues,
        interceptor: Option<&dyn CommandInterceptor>,
        cancellation: CancellationToken,
    ) -> CliResult<i32>;
}

pub(crate) struct CommandExecutor<C>(pub(crate) C);

#[async_trait]
impl<C: Command> Executor for CommandExecutor<C> {
    async fn execute(
        &self,
        ctx: &CommandContext,
        mut values: BoundValues,
        interceptor: Option<&dyn CommandInterceptor>,
        cancellation: CancellationToken,
    ) -> CliResult<i32> {
        let settings = C::Settings::bind(&mut values)?;
        settings.validate()?;
        self.0.validate(ctx, &settings)?;

        if let Some(interceptor) = interceptor {
            interceptor.intercept(ctx, &settings);
        }
        if cancellation.is_cancelled() {
            debug!(command = %ctx.name(), "cancelled before execution");
            return Err(CliError::Cancelled);
        }

        let mut code = self.0.execute(ctx, settings, cancellation.clone()).await?;
        if cancellation.is_cancelled() {
            debug!(command = %ctx.name(), code, "cancelled during execution");
            return Err(CliError::Cancelled);
        }
        if let Some(interceptor) = interceptor {
            interceptor.intercept_result(ctx, &mut code);
        }
        Ok(code)
    }
}

/// Binds the settings of a branch on the resolved path.
pub(crate) type BranchBinder =
    Arc<dyn Fn(&mut BoundValues) -> CliResult<Arc<dyn Any + Send + Sync>> + Send + Sync>;

pub(crate) fn branch_binder<S: CommandSettings>() -> BranchBinder {
    Arc::new(|values: &mut BoundValues| {
        let settings = S::bind(values)?;
        settings.validate()?;
        Ok(Arc::new(settings) as Arc<dyn Any + Send + Sync>)
    })
}
