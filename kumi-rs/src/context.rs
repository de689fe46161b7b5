//! What a running command can see besides its own settings.

use std::any::Any;
use std::sync::Arc;

use kumi_cli::Remaining;
use kumi_console::Console;

pub(crate) type SharedAny = Arc<dyn Any + Send + Sync>;

/// Shared application state wrapper.
///
/// Wraps a value in an `Arc` for cheap cloning across commands.
///
/// # Example
///
/// ```
/// use kumi::State;
///
/// struct Database {
///     url: String,
/// }
///
/// let state = State::new(Database {
///     url: "sqlite::memory:".to_string(),
/// });
/// assert_eq!(state.get().url, "sqlite::memory:");
/// ```
pub struct State<T>(Arc<T>);

impl<T> State<T> {
    pub fn new(inner: T) -> Self {
        Self(Arc::new(inner))
    }

    pub fn get(&self) -> &T {
        &self.0
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> std::ops::Deref for State<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Context handed to a command, its validation and the interceptor.
pub struct CommandContext {
    pub(crate) name: String,
    pub(crate) path: Vec<String>,
    pub(crate) arguments: Vec<String>,
    pub(crate) remaining: Remaining,
    pub(crate) data: Option<SharedAny>,
    pub(crate) branches: Vec<SharedAny>,
    pub(crate) console: Arc<Console>,
}

impl std::fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandContext")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("arguments", &self.arguments)
            .field("remaining", &self.remaining)
            .field("has_data", &self.data.is_some())
            .field("branches", &self.branches.len())
            .finish_non_exhaustive()
    }
}

impl CommandContext {
    /// Name of the executing command.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command names from the root to the executing command.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The raw argument vector of this invocation.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Input the command tree did not consume.
    pub fn remaining(&self) -> &Remaining {
        &self.remaining
    }

    /// Data attached with `with_data`, if it has type `T`.
    pub fn data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|data| data.downcast_ref::<T>())
    }

    /// Like [`CommandContext::data`], as an owned [`State`] handle.
    pub fn state<T: Any + Send + Sync>(&self) -> Option<State<T>> {
        let data = Arc::clone(self.data.as_ref()?);
        data.downcast::<T>().ok().map(State)
    }

    /// Settings bound for an enclosing branch of type `S`.
    ///
    /// The innermost branch wins when several share a settings type.
    pub fn branch<S: Any + Send + Sync>(&self) -> Option<&S> {
        self.branches
            .iter()
            .rev()
            .find_map(|settings| settings.downcast_ref::<S>())
    }

    pub fn console(&self) -> &Console {
        &self.console
    }
}
