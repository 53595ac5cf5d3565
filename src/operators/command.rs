//! Process-backed collaborators.
//!
//! Commands are argv templates from [`AcceptanceConfig`] with placeholders expanded at run time. The child's
//! stdout and stderr both go to the runner's stderr, so package manager and nose output stay visible in the job
//! log while the runner's own stdout carries only the report.

use std::fs;
use std::io;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{OperatorError, PythonTestRunner, RpmUpgrade};
use crate::config::{self, AcceptanceConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run `argv`, waiting at most `timeout`, and return the exit code.
///
/// A child terminated by a signal reports `-1`. On timeout the child is killed and reaped.
pub fn run_with_timeout(argv: &[String], timeout: Duration) -> Result<i32, OperatorError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(OperatorError::Spawn {
            command: String::new(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
        });
    };
    let shown = argv.join(" ");

    tracing::info!(command = %shown, "starting");
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(io::stderr()))
        .spawn()
        .map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                OperatorError::MissingFile(program.into())
            } else {
                OperatorError::Spawn {
                    command: shown.clone(),
                    source,
                }
            }
        })?;

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            let code = status.code().unwrap_or(-1);
            tracing::info!(command = %shown, code, elapsed_ms = started.elapsed().as_millis() as u64, "finished");
            return Ok(code);
        }
        if started.elapsed() >= timeout {
            tracing::warn!(command = %shown, "timed out, killing");
            let _ = child.kill();
            let _ = child.wait();
            return Err(OperatorError::Timeout {
                command: shown,
                after: timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Upgrades `<prefix><component>` with the configured package manager command.
#[derive(Debug, Clone)]
pub struct CommandRpmUpgrade {
    config: AcceptanceConfig,
    package: Option<String>,
}

impl CommandRpmUpgrade {
    pub fn new(config: AcceptanceConfig) -> Self {
        Self { config, package: None }
    }

    /// Package selected by the last `initialise`.
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }
}

impl RpmUpgrade for CommandRpmUpgrade {
    fn initialise(&mut self, component: &str) -> Result<(), OperatorError> {
        let valid = !component.is_empty()
            && component
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
        if !valid {
            return Err(OperatorError::InvalidComponent(component.to_string()));
        }
        let package = format!("{}{}", self.config.package_prefix, component);
        tracing::debug!(%package, "upgrade initialised");
        self.package = Some(package);
        Ok(())
    }

    fn upgrade_rpm(&mut self) -> Result<i32, OperatorError> {
        let package = self.package.as_deref().ok_or(OperatorError::NotInitialised("upgrade"))?;
        let argv = config::expand_argv(&self.config.upgrade_command, &[(config::PACKAGE_PLACEHOLDER, package)]);
        run_with_timeout(&argv, self.config.timeout)
    }
}

/// Runs the python suite, writing an xunit report into the report directory.
#[derive(Debug, Clone)]
pub struct CommandTestRunner {
    config: AcceptanceConfig,
    initialised: bool,
}

impl CommandTestRunner {
    pub fn new(config: AcceptanceConfig) -> Self {
        Self {
            config,
            initialised: false,
        }
    }
}

impl PythonTestRunner for CommandTestRunner {
    fn initialise(&mut self) -> Result<(), OperatorError> {
        if !self.config.suite_dir.exists() {
            return Err(OperatorError::MissingFile(self.config.suite_dir.clone()));
        }
        fs::create_dir_all(&self.config.report_dir)?;
        tracing::debug!(report_dir = %self.config.report_dir.display(), "test runner initialised");
        self.initialised = true;
        Ok(())
    }

    fn execute(&mut self) -> Result<i32, OperatorError> {
        if !self.initialised {
            return Err(OperatorError::NotInitialised("test runner"));
        }
        let report_file = self.config.report_file().to_string_lossy().to_string();
        let suite_dir = self.config.suite_dir.to_string_lossy().to_string();
        let argv = config::expand_argv(
            &self.config.test_command,
            &[
                (config::REPORT_FILE_PLACEHOLDER, report_file.as_str()),
                (config::SUITE_DIR_PLACEHOLDER, suite_dir.as_str()),
            ],
        );
        run_with_timeout(&argv, self.config.timeout)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_codes_are_returned() {
        assert_eq!(run_with_timeout(&argv(&["true"]), Duration::from_secs(10)).unwrap(), 0);
        assert_eq!(
            run_with_timeout(&argv(&["sh", "-c", "exit 3"]), Duration::from_secs(10)).unwrap(),
            3
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let err = run_with_timeout(&argv(&["sleep", "5"]), Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, OperatorError::Timeout { .. }));
    }

    #[test]
    fn test_missing_program() {
        let err = run_with_timeout(&argv(&["definitely-not-a-real-program-xyz"]), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, OperatorError::MissingFile(_)));
    }

    #[test]
    fn test_empty_command() {
        let err = run_with_timeout(&[], Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, OperatorError::Spawn { .. }));
    }

    #[test]
    fn test_upgrade_requires_initialise() {
        let mut upgrade = CommandRpmUpgrade::new(AcceptanceConfig::default());
        let err = upgrade.upgrade_rpm().unwrap_err();
        assert!(matches!(err, OperatorError::NotInitialised(_)));
    }

    #[test]
    fn test_upgrade_initialise_selects_package() {
        let mut upgrade = CommandRpmUpgrade::new(AcceptanceConfig::default());
        upgrade.initialise("cli").unwrap();
        assert_eq!(upgrade.package(), Some("ERIClitpcli"));
        assert!(matches!(
            upgrade.initialise("cli; rm -rf /"),
            Err(OperatorError::InvalidComponent(_))
        ));
        assert!(matches!(upgrade.initialise(""), Err(OperatorError::InvalidComponent(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_upgrade_expands_package() {
        let config = AcceptanceConfig::default().with_upgrade_command(argv(&["sh", "-c", "test \"$0\" = ERIClitpcli", "{package}"]));
        let mut upgrade = CommandRpmUpgrade::new(config);
        upgrade.initialise("cli").unwrap();
        assert_eq!(upgrade.upgrade_rpm().unwrap(), 0);
    }

    #[test]
    fn test_runner_missing_suite_dir() {
        let config = AcceptanceConfig::default().with_suite_dir("no/such/suite/dir");
        let mut runner = CommandTestRunner::new(config);
        assert!(matches!(runner.initialise(), Err(OperatorError::MissingFile(_))));
        assert!(matches!(runner.execute(), Err(OperatorError::NotInitialised(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_runner_creates_report_dir_and_runs() {
        let base = std::env::temp_dir().join(format!("rpm_acceptance_runner_{}", std::process::id()));
        let suite = base.join("suite");
        let reports = base.join("reports");
        fs::create_dir_all(&suite).unwrap();

        let config = AcceptanceConfig::default()
            .with_suite_dir(&suite)
            .with_report_dir(&reports)
            .with_test_command(argv(&["sh", "-c", "touch \"$0\"", "{report_file}"]));
        let mut runner = CommandTestRunner::new(config.clone());
        runner.initialise().unwrap();
        assert!(reports.is_dir());
        assert_eq!(runner.execute().unwrap(), 0);
        assert!(config.report_file().is_file());

        let _ = fs::remove_dir_all(&base);
    }
}
