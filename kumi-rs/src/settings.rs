//! Application settings.

use kumi_cli::ParsingOptions;
use kumi_console::DEFAULT_WIDTH;
use serde::{Deserialize, Serialize};

/// Exit code for failures and, unless changed, for cancellation.
pub const DEFAULT_ERROR_EXIT_CODE: i32 = -1;

/// How an application parses, reports and exits.
///
/// Deserializable so hosts can load it from whatever format they use; the
/// parsing options are flattened into the top level.
///
/// ```
/// use kumi::AppSettings;
///
/// let settings: AppSettings =
///     serde_json::from_str(r#"{ "strict": true, "cancellation_exit_code": 130 }"#).unwrap();
/// assert!(settings.parsing.strict);
/// assert_eq!(settings.cancellation_exit_code, 130);
/// assert_eq!(settings.error_exit_code, -1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub application_name: Option<String>,
    /// Printed for a lone `--version` or `-v`.
    pub application_version: Option<String>,
    #[serde(flatten)]
    pub parsing: ParsingOptions,
    /// Return runtime errors to the caller instead of reporting them.
    pub propagate_errors: bool,
    pub cancellation_exit_code: i32,
    pub error_exit_code: i32,
    /// Width of the default console.
    pub console_width: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            application_name: None,
            application_version: None,
            parsing: ParsingOptions::default(),
            propagate_errors: false,
            cancellation_exit_code: DEFAULT_ERROR_EXIT_CODE,
            error_exit_code: DEFAULT_ERROR_EXIT_CODE,
            console_width: DEFAULT_WIDTH,
        }
    }
}
