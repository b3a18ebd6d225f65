//! CLI for the functional runner demo.
//!
//! `functional-demo` runs a built-in test class through the functional
//! runner, optionally injecting a fault at one lifecycle phase, so the hook
//! ordering, artifact capture and class-failure reporting can be observed.
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! `execute` returns `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod demo;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::config::RunnerConfig;
use crate::filter::NameFilter;
use crate::notification::{ConsoleListener, JsonLinesListener, RunNotifier};
use crate::runner::{Functional, Suite};
use demo::{FailAt, Injection};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run the demo test class through the functional runner
#[derive(Parser, Debug)]
#[command(name = "functional-demo")]
#[command(version = VERSION)]
#[command(about = "Run the demo test class through the functional runner", long_about = None)]
pub struct Cli {
    /// Inject a fault at this lifecycle phase
    #[arg(long = "fail-at", value_enum, value_name = "PHASE")]
    pub fail_at: Option<FailAt>,

    /// Inject an assumption violation instead of an error
    #[arg(long, requires = "fail_at")]
    pub assume: bool,

    /// Only run tests whose name contains EXPR
    #[arg(short = 'k', value_name = "EXPR")]
    pub filter: Option<String>,

    /// Emit JSON lines on stdout instead of console output
    #[arg(long)]
    pub json: bool,

    /// Directory failure artifacts are written to
    #[arg(long = "artifact-dir", value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,

    /// Leave the process sampler off
    #[arg(long = "no-sampling")]
    pub no_sampling: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> RunnerConfig {
        let config = RunnerConfig::new().with_sampling(!self.no_sampling);
        match &self.artifact_dir {
            Some(dir) => config.with_artifact_dir(dir.clone()),
            None => config,
        }
    }

    pub fn injection(&self) -> Option<Injection> {
        self.fail_at.map(|phase| Injection::new(phase, self.assume))
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the demo run and return the exit code.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.config();
    tracing::debug!(?config, injection = ?cli.injection(), "starting demo run");

    let runner = Functional::with_config(demo::demo_class(cli.injection()), &config)
        .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    let mut suite = Suite::new("functional-demo").add(runner);
    if let Some(expr) = &cli.filter {
        suite
            .filter(&NameFilter::new(expr.as_str()))
            .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    }

    let mut notifier = RunNotifier::new();
    if cli.json {
        notifier.add_listener(JsonLinesListener::new(io::stdout()));
    } else {
        notifier.add_listener(ConsoleListener::stderr(cli.verbose));
    }

    let summary = suite.run(&mut notifier);
    if summary.was_successful() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// Tests
// ============================================================================
