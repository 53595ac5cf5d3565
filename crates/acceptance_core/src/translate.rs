//! Report outcome translation.
//!
//! [`translate`] drives a [`Harness`] the way a data-driven test method does: register the test case,
//! report every failure, then raise the first error or the first active skip. Raising is modelled as an
//! [`Interrupt`] returned through `Err`, so anything after it in the record is never looked at.
//!
//! [`translate_record`] runs the same walk against a [`Recorder`] and folds the result into one
//! [`Outcome`].

use std::fmt;

use crate::{ErrorEntry, Outcome, ReportRecord};

/// Bookkeeping calls a test harness exposes to a running test case.
pub trait Harness {
    /// Register the current test case identity.
    fn set_testcase(&mut self, identity: &str, extra: &str);

    /// Register the display name of the current test case.
    fn set_test_info(&mut self, name: &str);

    /// Record a non-terminating assertion failure.
    fn fail(&mut self, message: &str);
}

/// A terminating signal raised while translating a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interrupt {
    /// Runtime error from the external run; carries `(type, message, text)`.
    Error(ErrorEntry),
    /// The case was skipped; carries the skip count.
    Skip(i64),
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interrupt::Error(entry) => write!(f, "{}: {}", entry.kind, entry.message),
            Interrupt::Skip(count) => write!(f, "Number of tests to be skipped is: {}", count),
        }
    }
}

impl std::error::Error for Interrupt {}

/// Translate one record against `harness`.
///
/// All failures are reported. The first error, or else the first skip with a positive count, is returned as
/// an [`Interrupt`] and stops evaluation of the record.
pub fn translate<H: Harness + ?Sized>(record: &ReportRecord, harness: &mut H) -> Result<(), Interrupt> {
    tracing::debug!("TestCase:");
    tracing::debug!("    classname:{}", record.class_name);
    tracing::debug!("    name:{}", record.name);

    harness.set_testcase(&record.identity(), "");
    harness.set_test_info(&record.name);

    for failure in &record.failures {
        harness.fail(&failure.summary());
    }

    if let Some(error) = record.errors.first() {
        return Err(Interrupt::Error(error.clone()));
    }

    for skip in &record.skipped {
        if skip.is_active() {
            return Err(Interrupt::Skip(skip.count));
        }
    }

    Ok(())
}

/// In-memory [`Harness`] capturing everything a translation reports.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub identity: Option<String>,
    pub extra: Option<String>,
    pub display_name: Option<String>,
    pub failures: Vec<String>,
    /// Number of `set_testcase` calls seen.
    pub registrations: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Harness for Recorder {
    fn set_testcase(&mut self, identity: &str, extra: &str) {
        self.identity = Some(identity.to_string());
        self.extra = Some(extra.to_string());
        self.registrations += 1;
    }

    fn set_test_info(&mut self, name: &str) {
        self.display_name = Some(name.to_string());
    }

    fn fail(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }
}

/// Everything reported for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub identity: String,
    pub display_name: String,
    /// Failure messages in report order, kept even when an error wins.
    pub failures: Vec<String>,
    pub outcome: Outcome,
}

/// Translate a record and resolve the single outcome.
///
/// Resolution: an error wins, then reported failures, then a skip, else pass.
pub fn translate_record(record: &ReportRecord) -> Translation {
    let mut recorder = Recorder::new();
    let interrupt = translate(record, &mut recorder).err();

    let outcome = match interrupt {
        Some(Interrupt::Error(entry)) => Outcome::erred(&entry),
        _ if !recorder.failures.is_empty() => Outcome::Failed {
            reasons: recorder.failures.clone(),
        },
        Some(Interrupt::Skip(count)) => Outcome::Skipped { count },
        None => Outcome::Pass,
    };

    Translation {
        identity: recorder.identity.unwrap_or_else(|| record.identity()),
        display_name: recorder.display_name.unwrap_or_else(|| record.name.clone()),
        failures: recorder.failures,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConditionEntry, SkipEntry};

    #[test]
    fn test_empty_record_passes() {
        let record = ReportRecord::new("T", "a");
        let translation = translate_record(&record);
        assert_eq!(translation.outcome, Outcome::Pass);
        assert_eq!(translation.identity, "T:a");
        assert_eq!(translation.display_name, "a");
    }

    #[test]
    fn test_single_failure_concatenates() {
        let record = ReportRecord::new("T", "b").with_failure(ConditionEntry::new("Assert", "x", "y"));
        let translation = translate_record(&record);
        assert_eq!(
            translation.outcome,
            Outcome::Failed {
                reasons: vec!["Assertxy".to_string()]
            }
        );
    }

    #[test]
    fn test_error_is_raised() {
        let record = ReportRecord::new("T", "c").with_error(ConditionEntry::new("RuntimeError", "boom", "trace"));
        let mut recorder = Recorder::new();
        let result = translate(&record, &mut recorder);
        assert_eq!(
            result,
            Err(Interrupt::Error(ConditionEntry::new("RuntimeError", "boom", "trace")))
        );
    }

    #[test]
    fn test_skip_carries_count() {
        let record = ReportRecord::new("T", "d").with_skip(SkipEntry::new(3));
        let translation = translate_record(&record);
        assert_eq!(translation.outcome, Outcome::Skipped { count: 3 });
    }

    #[test]
    fn test_zero_skip_is_ignored() {
        let record = ReportRecord::new("T", "e")
            .with_skip(SkipEntry::new(0))
            .with_skip(SkipEntry::new(2));
        let mut recorder = Recorder::new();
        assert_eq!(translate(&record, &mut recorder), Err(Interrupt::Skip(2)));
    }

    #[test]
    fn test_failures_reported_before_error() {
        let record = ReportRecord::new("T", "f")
            .with_failure(ConditionEntry::new("A", "1", ""))
            .with_failure(ConditionEntry::new("A", "2", ""))
            .with_error(ConditionEntry::new("E", "first", ""))
            .with_error(ConditionEntry::new("E", "second", ""))
            .with_skip(SkipEntry::new(1));
        let translation = translate_record(&record);
        assert_eq!(translation.failures, vec!["A1".to_string(), "A2".to_string()]);
        assert_eq!(
            translation.outcome,
            Outcome::Erred {
                kind: "E".to_string(),
                message: "first".to_string(),
                text: String::new(),
            }
        );
    }

    #[test]
    fn test_failures_win_over_skip() {
        let record = ReportRecord::new("T", "g")
            .with_failure(ConditionEntry::new("A", "", ""))
            .with_skip(SkipEntry::new(1));
        let translation = translate_record(&record);
        assert!(matches!(translation.outcome, Outcome::Failed { .. }));
    }

    #[test]
    fn test_registers_once_with_empty_extra() {
        let record = ReportRecord::new("T", "h").with_error(ConditionEntry::default());
        let mut recorder = Recorder::new();
        let _ = translate(&record, &mut recorder);
        assert_eq!(recorder.registrations, 1);
        assert_eq!(recorder.extra.as_deref(), Some(""));
    }

    #[test]
    fn test_skip_message() {
        assert_eq!(Interrupt::Skip(4).to_string(), "Number of tests to be skipped is: 4");
    }
}
