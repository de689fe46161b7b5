//! Tracing and logging support.
//!
//! The engines log through `tracing` unconditionally; this module only sets
//! up a subscriber for applications that do not install their own.

pub use tracing::{self, debug, error, info, instrument, trace, warn};

#[cfg(feature = "subscriber")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Human-readable format with colors.
    #[default]
    Pretty,

    /// Compact format without colors.
    Compact,

    /// JSON format.
    Json,
}

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter.
    ///
    /// If None, uses RUST_LOG environment variable or defaults to "info".
    pub level: Option<tracing::Level>,

    pub format: TracingFormat,

    /// Include timestamps in output.
    pub timestamps: bool,

    /// Include target module names in output.
    pub target: bool,

    pub thread_ids: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: TracingFormat::Pretty,
            timestamps: true,
            target: true,
            thread_ids: false,
        }
    }
}

/// Initialize tracing subscriber with default settings.
///
/// # Environment Variables
///
/// - `RUST_LOG=debug` - Enable debug logs
/// - `RUST_LOG=kumi_cli=trace` - Trace the parser only
/// - `RUST_LOG=myapp=debug,kumi=info` - Per-module filtering
#[cfg(feature = "subscriber")]
pub fn init_subscriber() {
    init_subscriber_with_config(TracingConfig {
        format: TracingFormat::Compact,
        ..TracingConfig::default()
    });
}

/// Initialize tracing subscriber with custom configuration.
///
/// Does nothing if a global subscriber is already installed.
///
/// # Example
///
/// ```ignore
/// use kumi::tracing_support::{init_subscriber_with_config, TracingConfig, TracingFormat};
///
/// fn main() {
///     init_subscriber_with_config(TracingConfig {
///         format: TracingFormat::Json,
///         ..Default::default()
///     });
/// }
/// ```
#[cfg(feature = "subscriber")]
pub fn init_subscriber_with_config(config: TracingConfig) {
    let filter = match config.level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let registry = tracing_subscriber::registry().with(filter);

    let result = match (config.format, config.timestamps) {
        (TracingFormat::Pretty, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(config.target)
                    .with_thread_ids(config.thread_ids),
            )
            .try_init(),
        (TracingFormat::Pretty, false) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .without_time()
                    .with_target(config.target)
                    .with_thread_ids(config.thread_ids),
            )
            .try_init(),
        (TracingFormat::Compact, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(config.target)
                    .with_thread_ids(config.thread_ids),
            )
            .try_init(),
        (TracingFormat::Compact, false) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .without_time()
                    .with_target(config.target)
                    .with_thread_ids(config.thread_ids),
            )
            .try_init(),
        (TracingFormat::Json, true) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.target)
                    .with_thread_ids(config.thread_ids),
            )
            .try_init(),
        (TracingFormat::Json, false) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .without_time()
                    .with_target(config.target)
                    .with_thread_ids(config.thread_ids),
            )
            .try_init(),
    };

    if let Err(err) = result {
        debug!(error = %err, "tracing subscriber already installed");
    }
}

// Fallbacks when the subscriber feature is disabled
#[cfg(not(feature = "subscriber"))]
pub fn init_subscriber() {}

#[cfg(not(feature = "subscriber"))]
pub fn init_subscriber_with_config(_config: TracingConfig) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.format, TracingFormat::Pretty);
        assert!(config.timestamps);
        assert!(config.target);
        assert!(!config.thread_ids);
        assert!(config.level.is_none());
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_subscriber_with_config(TracingConfig {
            level: Some(tracing::Level::WARN),
            format: TracingFormat::Json,
            timestamps: false,
            ..TracingConfig::default()
        });
        init_subscriber();
    }
}
