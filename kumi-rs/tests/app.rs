use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kumi::prelude::*;
use kumi::{CaseSensitivity, ConfigError};

// ============================================================================
// Settings and commands shared by the tests
// ============================================================================

#[derive(CommandSettings)]
#[kumi(validate = check_serve)]
struct ServeSettings {
    #[kumi(argument = "[ROOT]", default = ".")]
    root: String,

    #[kumi(option = "-p|--port <PORT>", default = "8080")]
    port: u16,

    #[kumi(option = "--open", description = "Open a browser")]
    open: bool,

    started: Option<u64>,
}

fn check_serve(settings: &ServeSettings) -> Result<(), ValidationError> {
    if settings.port == 0 {
        return Err(ValidationError::new("Port must be positive."));
    }
    Ok(())
}

struct Serve;

#[async_trait]
impl Command for Serve {
    type Settings = ServeSettings;

    async fn execute(
        &self,
        ctx: &CommandContext,
        settings: ServeSettings,
        _cancellation: CancellationToken,
    ) -> CliResult<i32> {
        assert!(settings.started.is_none());
        ctx.console().line(&format!(
            "{} on {} open={}",
            settings.root, settings.port, settings.open
        ))?;
        Ok(0)
    }
}

#[derive(CommandSettings)]
struct Empty;

struct Fails;

#[async_trait]
impl Command for Fails {
    type Settings = Empty;

    async fn execute(
        &self,
        _ctx: &CommandContext,
        _settings: Empty,
        _cancellation: CancellationToken,
    ) -> CliResult<i32> {
        Err(CliError::message("disk full"))
    }
}

fn serve_app() -> CommandApp {
    let mut app = CommandApp::new();
    app.configure(|c| {
        c.add_command("serve", Serve)?
            .with_alias("s")?
            .with_description("Serve files");
        c.add_command("fail", Fails)?;
        Ok(())
    });
    app
}

// ============================================================================
// Binding through the derive
// ============================================================================

#[tokio::test]
async fn test_derived_settings_use_defaults() {
    let tester = CommandAppTester::new(serve_app());
    let result = tester.run_async(["serve"]).await.unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.lines(), vec![". on 8080 open=false"]);
}

#[tokio::test]
async fn test_derived_settings_bind_input_and_alias() {
    let tester = CommandAppTester::new(serve_app());
    let result = tester
        .run_async(["s", "public", "--port=9000", "--open"])
        .await
        .unwrap();
    assert_eq!(result.lines(), vec!["public on 9000 open=true"]);
}

#[tokio::test]
async fn test_settings_validation_is_reported() {
    let tester = CommandAppTester::new(serve_app());
    let result = tester.run_async(["serve", "-p", "0"]).await.unwrap();
    assert_eq!(result.exit_code, -1);
    assert_eq!(result.lines(), vec!["Error: Port must be positive."]);
}

#[tokio::test]
async fn test_conversion_failure_is_reported() {
    let tester = CommandAppTester::new(serve_app());
    let result = tester.run_async(["serve", "-p", "abc"]).await.unwrap();
    assert_eq!(result.exit_code, -1);
    assert!(result.output.starts_with("Error: Failed to convert 'abc'"));
}

// ============================================================================
// Error routing
// ============================================================================

#[tokio::test]
async fn test_unknown_command_prints_caret_diagnostic() {
    let tester = CommandAppTester::new(serve_app());
    let result = tester.run_async(["serv", "--open"]).await.unwrap();
    assert_eq!(result.exit_code, -1);
    assert_eq!(
        result.lines(),
        vec![
            "Error: Unknown command 'serv'.",
            "",
            "       serv --open",
            "       ^^^^ Did you mean 'serve'?",
        ]
    );
}

#[tokio::test]
async fn test_propagated_errors_reach_the_caller() {
    let mut app = serve_app();
    app.configure(|c| {
        c.propagate_errors(true);
        Ok(())
    });
    let tester = CommandAppTester::new(app);

    let err = tester.run_async(["serv"]).await.unwrap_err();
    assert!(matches!(err, CliError::Parse(_)));
    let err = tester.run_async(["fail"]).await.unwrap_err();
    assert_eq!(err.to_string(), "disk full");
}

#[tokio::test]
async fn test_error_handler_sees_resolved_tree_only_after_resolution() {
    let seen: Arc<Mutex<Vec<(String, bool)>>> = Arc::default();
    let mut app = serve_app();
    app.configure({
        let seen = Arc::clone(&seen);
        move |c| {
            c.set_error_handler(move |err, tree| {
                seen.lock()
                    .unwrap()
                    .push((err.to_string(), tree.is_some()));
                42
            });
            Ok(())
        }
    });
    let tester = CommandAppTester::new(app);

    assert_eq!(tester.run_async(["nope"]).await.unwrap().exit_code, 42);
    assert_eq!(tester.run_async(["fail"]).await.unwrap().exit_code, 42);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], ("Unknown command 'nope'.".to_string(), false));
    assert_eq!(seen[1], ("disk full".to_string(), true));
}

#[tokio::test]
async fn test_configuration_errors_are_never_swallowed() {
    let mut app = CommandApp::new();
    app.configure(|c| {
        c.set_error_handler(|_, _| 0);
        c.add_command("serve", Serve)?;
        c.add_command("serve", Serve)?;
        Ok(())
    });
    let err = app.run_async(["serve"]).await.unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_two_vector_arguments_fail_at_registration() {
    #[derive(CommandSettings)]
    struct CopySettings {
        #[kumi(argument = "<SOURCES>")]
        sources: Vec<String>,
        #[kumi(argument = "<TARGETS>")]
        targets: Vec<String>,
    }

    let mut app = CommandApp::new();
    app.configure(|c| {
        c.add_delegate("copy", |_: &CommandContext, _: CopySettings| Ok(0))?;
        Ok(())
    });
    let err = app.run_async(["copy", "a"]).await.unwrap_err();
    assert!(matches!(
        err,
        CliError::Configuration(ConfigError::MultipleVectorArguments(_))
    ));
}

// ============================================================================
// Cancellation
// ============================================================================

struct Wait {
    executed: Arc<AtomicUsize>,
}

#[async_trait]
impl Command for Wait {
    type Settings = Empty;

    async fn execute(
        &self,
        _ctx: &CommandContext,
        _settings: Empty,
        cancellation: CancellationToken,
    ) -> CliResult<i32> {
        self.executed.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            _ = cancellation.cancelled() => Ok(0),
            _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(1),
        }
    }
}

fn wait_app(executed: &Arc<AtomicUsize>) -> CommandApp {
    let mut app = CommandApp::new();
    app.configure(|c| {
        c.cancellation_exit_code(130);
        c.add_command(
            "wait",
            Wait {
                executed: Arc::clone(executed),
            },
        )?;
        Ok(())
    });
    app
}

#[tokio::test]
async fn test_cancelled_before_execution_skips_command() {
    let executed = Arc::new(AtomicUsize::new(0));
    let tester = CommandAppTester::new(wait_app(&executed));
    let token = CancellationToken::new();
    token.cancel();

    let result = tester.run_with_cancellation(["wait"], token).await.unwrap();
    assert_eq!(result.exit_code, 130);
    assert_eq!(executed.load(Ordering::SeqCst), 0);
    assert!(result.output.is_empty());
}

#[tokio::test]
async fn test_cancellation_during_execution_maps_to_exit_code() {
    let executed = Arc::new(AtomicUsize::new(0));
    let tester = CommandAppTester::new(wait_app(&executed));
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = tester.run_with_cancellation(["wait"], token).await.unwrap();
    assert_eq!(result.exit_code, 130);
    assert_eq!(executed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_error_uses_cancellation_code_even_when_propagating() {
    let mut app = CommandApp::new();
    app.configure(|c| {
        c.propagate_errors(true).cancellation_exit_code(2);
        c.add_delegate("stop", |_: &CommandContext, _: Empty| Err(CliError::Cancelled))?;
        Ok(())
    });
    let tester = CommandAppTester::new(app);
    assert_eq!(tester.run_async(["stop"]).await.unwrap().exit_code, 2);
}

// ============================================================================
// Branches, data, interceptors
// ============================================================================

#[derive(CommandSettings)]
struct RemoteSettings {
    #[kumi(option = "--verbose")]
    verbose: bool,
}

#[derive(CommandSettings)]
struct RemoteAddSettings {
    #[kumi(argument = "<NAME>")]
    name: String,
}

#[tokio::test]
async fn test_branch_settings_and_command_data() {
    let mut app = CommandApp::new();
    app.configure(|c| {
        c.add_branch::<RemoteSettings, _>("remote", |b| {
            b.add_delegate("add", |ctx: &CommandContext, s: RemoteAddSettings| {
                let verbose = ctx.branch::<RemoteSettings>().map(|r| r.verbose);
                let prefix = ctx.data::<String>().cloned().unwrap_or_default();
                ctx.console()
                    .line(&format!("{}{} {:?} {:?}", prefix, s.name, verbose, ctx.path()))?;
                Ok(0)
            })?
            .with_data("+".to_string());
            Ok(())
        })?;
        Ok(())
    });
    let tester = CommandAppTester::new(app);

    let result = tester
        .run_async(["remote", "--verbose", "add", "origin"])
        .await
        .unwrap();
    assert_eq!(
        result.lines(),
        vec![r#"+origin Some(true) ["remote", "add"]"#]
    );
}

#[tokio::test]
async fn test_branch_without_subcommand_reports_missing_command() {
    let mut app = CommandApp::new();
    app.configure(|c| {
        c.add_branch::<RemoteSettings, _>("remote", |b| {
            b.add_delegate("add", |_: &CommandContext, _: RemoteAddSettings| Ok(0))?;
            Ok(())
        })?;
        Ok(())
    });
    let tester = CommandAppTester::new(app);
    let result = tester.run_async(["remote"]).await.unwrap();
    assert_eq!(result.exit_code, -1);
    assert_eq!(
        result.lines()[0],
        "Error: No command was specified for 'remote'."
    );
}

struct Counting(Arc<AtomicUsize>);

impl CommandInterceptor for Counting {
    fn intercept(&self, _ctx: &CommandContext, settings: &dyn std::any::Any) {
        if settings.downcast_ref::<ServeSettings>().is_some() {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn intercept_result(&self, _ctx: &CommandContext, result: &mut i32) {
        *result += 10;
    }
}

#[tokio::test]
async fn test_interceptor_sees_settings_and_rewrites_result() {
    let seen = Arc::new(AtomicUsize::new(0));
    let mut app = serve_app();
    app.configure({
        let seen = Arc::clone(&seen);
        move |c| {
            c.set_interceptor(Counting(seen));
            Ok(())
        }
    });
    let tester = CommandAppTester::new(app);

    assert_eq!(tester.run_async(["serve"]).await.unwrap().exit_code, 10);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    // Failures skip the result hook.
    assert_eq!(tester.run_async(["fail"]).await.unwrap().exit_code, -1);
}

// ============================================================================
// Parsing options and converters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Low,
    High,
}

kumi::cli::scalar!(Level);

impl kumi::ValueEnum for Level {
    fn variants() -> &'static [Self] {
        &[Level::Low, Level::High]
    }

    fn name(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Percent(f64);

kumi::cli::scalar!(Percent);

#[derive(CommandSettings)]
struct TuneSettings {
    #[kumi(option = "--level <LEVEL>", default = "low")]
    level: Level,
    #[kumi(option = "--mix <PERCENT>")]
    mix: Option<Percent>,
}

fn tune_app() -> CommandApp {
    let mut app = CommandApp::new();
    app.configure(|c| {
        c.register_enum::<Level>()
            .register_converter::<Percent, _>(|raw| {
                raw.trim_end_matches('%')
                    .parse::<f64>()
                    .map(|v| Percent(v / 100.0))
                    .map_err(|e| e.to_string())
            })
            .case_sensitivity(CaseSensitivity::none());
        c.add_delegate("tune", |ctx: &CommandContext, s: TuneSettings| {
            ctx.console()
                .line(&format!("{:?} {:?}", s.level, s.mix))?;
            Ok(0)
        })?;
        Ok(())
    });
    app
}

#[tokio::test]
async fn test_registered_converters_and_case_insensitive_names() {
    let tester = CommandAppTester::new(tune_app());
    let result = tester
        .run_async(["TUNE", "--LEVEL", "HIGH", "--mix", "25%"])
        .await
        .unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.lines(), vec!["High Some(Percent(0.25))"]);

    let result = tester.run_async(["tune"]).await.unwrap();
    assert_eq!(result.lines(), vec!["Low None"]);
}

#[tokio::test]
async fn test_enum_domain_is_listed_on_failure() {
    let tester = CommandAppTester::new(tune_app());
    let result = tester.run_async(["tune", "--level", "mid"]).await.unwrap();
    assert_eq!(result.exit_code, -1);
    assert!(result.output.contains("Valid values are: low, high."));
}

#[tokio::test]
async fn test_relaxed_parsing_keeps_remaining_and_strict_rejects() {
    let mut app = CommandApp::new();
    app.configure(|c| {
        c.add_delegate("run", |ctx: &CommandContext, _: Empty| {
            let remaining = ctx.remaining();
            ctx.console().line(&format!(
                "{} {:?}",
                remaining.contains("--foo"),
                &remaining.raw[remaining.raw.len() - 2..]
            ))?;
            Ok(0)
        })?;
        Ok(())
    });
    let tester = CommandAppTester::new(app);
    let result = tester
        .run_async(["run", "--foo", "--", "x", "y"])
        .await
        .unwrap();
    assert_eq!(result.lines(), vec![r#"true ["x", "y"]"#]);

    let mut strict = CommandApp::new();
    strict.configure(|c| {
        c.strict_parsing(true);
        c.add_delegate("run", |_: &CommandContext, _: Empty| Ok(0))?;
        Ok(())
    });
    let tester = CommandAppTester::new(strict);
    let result = tester.run_async(["run", "extra"]).await.unwrap();
    assert_eq!(result.exit_code, -1);
    assert_eq!(
        result.lines()[0],
        "Error: Could not match 'extra' with an argument."
    );
}

#[test]
fn test_blocking_run_outside_runtime() {
    let tester = CommandAppTester::new(serve_app());
    let result = tester.run(["serve", "--port", "1"]).unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.lines(), vec![". on 1 open=false"]);
}
