//! Report records and outcome semantics shared by the acceptance runner.
//!
//! This crate holds the one piece of the runner with decision logic: turning a parsed xunit test case into
//! exactly one reported [`Outcome`].
//!
//! ## Notes
//!
//! - This is a pure crate: **no IO**, no global state. Records come in already parsed; harness calls go out
//!   through the [`translate::Harness`] trait.
//! - Evaluation order is fixed: failures, then errors, then skips.

pub mod translate;

use serde::Serialize;

pub use translate::{Harness, Interrupt, Recorder, Translation, translate, translate_record};

/// One failure or error captured from the external test run.
///
/// Failure and error entries share a shape; the list an entry sits in decides how it is treated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConditionEntry {
    /// Exception or assertion class, e.g. `AssertionError`.
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    /// Free text body, usually a traceback.
    pub text: String,
}

impl ConditionEntry {
    pub fn new(kind: impl Into<String>, message: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            text: text.into(),
        }
    }

    /// `type + message + text`, with no separators.
    pub fn summary(&self) -> String {
        format!("{}{}{}", self.kind, self.message, self.text)
    }
}

pub type FailureEntry = ConditionEntry;
pub type ErrorEntry = ConditionEntry;

/// A skip marker; only positive counts signal a skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipEntry {
    #[serde(rename = "type")]
    pub count: i64,
}

impl SkipEntry {
    pub fn new(count: i64) -> Self {
        Self { count }
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

/// One `<testcase>` from a report file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub class_name: String,
    pub name: String,
    pub failures: Vec<FailureEntry>,
    pub errors: Vec<ErrorEntry>,
    pub skipped: Vec<SkipEntry>,
}

impl ReportRecord {
    pub fn new(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_failure(mut self, entry: FailureEntry) -> Self {
        self.failures.push(entry);
        self
    }

    pub fn with_error(mut self, entry: ErrorEntry) -> Self {
        self.errors.push(entry);
        self
    }

    pub fn with_skip(mut self, entry: SkipEntry) -> Self {
        self.skipped.push(entry);
        self
    }

    /// Test case identity registered with the harness: `classname:name`.
    pub fn identity(&self) -> String {
        format!("{}:{}", self.class_name, self.name)
    }
}

/// The single reported result of a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Failed {
        reasons: Vec<String>,
    },
    Erred {
        #[serde(rename = "type")]
        kind: String,
        message: String,
        text: String,
    },
    Skipped {
        count: i64,
    },
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASSED",
            Outcome::Failed { .. } => "FAILED",
            Outcome::Erred { .. } => "ERROR",
            Outcome::Skipped { .. } => "SKIPPED",
        }
    }

    /// Failed and erred outcomes break the run.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. } | Outcome::Erred { .. })
    }

    pub fn erred(entry: &ErrorEntry) -> Self {
        Outcome::Erred {
            kind: entry.kind.clone(),
            message: entry.message.clone(),
            text: entry.text.clone(),
        }
    }
}
