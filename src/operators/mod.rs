//! Collaborator interfaces for the upgrade and python test run.
//!
//! The suite only talks to these traits. [`command`] provides process-backed implementations; tests swap in
//! scripted ones.
//!
//! Both collaborators follow the same contract: `initialise` prepares, the action returns the exit code of
//! the underlying run, and `0` is success. Anything that prevents getting an exit code at all (timeout,
//! missing program or directory) is an [`OperatorError`].

pub mod command;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub use command::{CommandRpmUpgrade, CommandTestRunner};

/// Errors raised by collaborators before an exit code is available
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("`{command}` timed out after {}s", .after.as_secs())]
    Timeout { command: String, after: Duration },

    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} used before initialise")]
    NotInitialised(&'static str),

    #[error("invalid component name '{0}'")]
    InvalidComponent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OperatorError {
    /// Short category name, reported as the error type of an erred case.
    pub fn kind(&self) -> &'static str {
        match self {
            OperatorError::Timeout { .. } => "Timeout",
            OperatorError::MissingFile(_) => "MissingFile",
            OperatorError::Spawn { .. } => "Spawn",
            OperatorError::NotInitialised(_) => "NotInitialised",
            OperatorError::InvalidComponent(_) => "InvalidComponent",
            OperatorError::Io(_) => "Io",
        }
    }
}

/// Upgrades a package on the target system.
pub trait RpmUpgrade {
    /// Select the component whose package is upgraded.
    fn initialise(&mut self, component: &str) -> Result<(), OperatorError>;

    /// Run the upgrade and return its exit code.
    fn upgrade_rpm(&mut self) -> Result<i32, OperatorError>;
}

/// Runs the external python test suite.
pub trait PythonTestRunner {
    /// Prepare the environment (report directory, suite location).
    fn initialise(&mut self) -> Result<(), OperatorError>;

    /// Run the suite and return its exit code.
    fn execute(&mut self) -> Result<i32, OperatorError>;
}
