//! CLI module for the acceptance runner
//!
//! ## Commands
//!
//! - `run` - Run the whole suite (upgrade, python tests, report parsing)
//! - `upgrade` - Upgrade the package only
//! - `execute` - Run the python test cases only
//! - `parse [path]` - Re-surface outcomes from existing xunit reports
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::AcceptanceConfig;
use crate::suite::Selection;
use crate::version::RUNNER_VERSION;
use commands::ReportOptions;

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
    /// Create a new CLI error with a message and exit code.
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

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Upgrade an RPM, run its python suite and re-surface the xunit reports
#[derive(Parser, Debug)]
#[command(name = "rpm-acceptance")]
#[command(version = RUNNER_VERSION)]
#[command(about = "Upgrade an RPM, run its python suite and re-surface the xunit reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Product number used as the test case id prefix
    #[arg(long, global = true, value_name = "ID")]
    pub product: Option<String>,

    /// Component whose package is upgraded (package = prefix + component)
    #[arg(long, global = true, value_name = "NAME")]
    pub component: Option<String>,

    /// Package name prefix
    #[arg(long, global = true, value_name = "PREFIX")]
    pub package_prefix: Option<String>,

    /// Directory the xunit reports are written to and read from
    #[arg(long, global = true, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Directory holding the python test scripts
    #[arg(long, global = true, value_name = "DIR")]
    pub suite_dir: Option<PathBuf>,

    /// Upgrade command argv, ended by `;` or the last argument; `{package}` is replaced with the package name
    #[arg(long, global = true, value_name = "ARG", num_args = 1.., allow_hyphen_values = true, value_terminator = ";")]
    pub upgrade_command: Option<Vec<String>>,

    /// Python suite command argv, ended by `;` or the last argument; `{report_file}` and `{suite_dir}` are replaced
    #[arg(long, global = true, value_name = "ARG", num_args = 1.., allow_hyphen_values = true, value_terminator = ";")]
    pub test_command: Option<Vec<String>>,

    /// Timeout for each collaborator process, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,
}

/// Reporter selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// pytest-style console output
    Console,
    /// One JSON document on stdout
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the acceptance suite
    Run {
        /// Stop on first failure
        #[arg(short = 'x', long = "exitfirst")]
        stop_on_fail: bool,
        /// Only run cases in these groups (e.g. ACCEPTANCE, CDB_REGRESSION)
        #[arg(short = 'g', long = "group", value_name = "GROUP")]
        groups: Vec<String>,
        /// Filter cases by id or title substring
        #[arg(short = 'k', value_name = "EXPR")]
        filter: Option<String>,
    },

    /// Upgrade the package on the MS
    Upgrade,

    /// Run the python test cases
    Execute,

    /// Parse xunit reports and re-surface their outcomes
    Parse {
        /// Report file or directory (default: the report directory)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
}

impl Cli {
    /// Apply command line overrides on top of the defaults.
    pub fn config(&self) -> AcceptanceConfig {
        let mut config = AcceptanceConfig::default();
        if let Some(product) = &self.product {
            config = config.with_product_id(product);
        }
        if let Some(component) = &self.component {
            config = config.with_component(component);
        }
        if let Some(prefix) = &self.package_prefix {
            config = config.with_package_prefix(prefix);
        }
        if let Some(dir) = &self.report_dir {
            config = config.with_report_dir(dir);
        }
        if let Some(dir) = &self.suite_dir {
            config = config.with_suite_dir(dir);
        }
        if let Some(argv) = &self.upgrade_command {
            config = config.with_upgrade_command(argv.clone());
        }
        if let Some(argv) = &self.test_command {
            config = config.with_test_command(argv.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    fn report_options(&self) -> ReportOptions {
        ReportOptions {
            verbose: self.verbose,
            format: self.format,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
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

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.config();
    let options = cli.report_options();
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Command::Run {
            stop_on_fail,
            groups,
            filter,
        } => {
            let selection = Selection {
                groups,
                keyword: filter,
                stop_on_fail,
            };
            commands::run_suite(&config, &selection, options)
        }
        Command::Upgrade => commands::upgrade(&config, options),
        Command::Execute => commands::execute(&config, options),
        Command::Parse { path } => {
            let path = path.unwrap_or_else(|| config.report_dir.clone());
            commands::parse_reports(&config, &path, options)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
