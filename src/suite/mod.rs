//! Acceptance suite
//!
//! Three cases run in a fixed order, because each one depends on the previous having run:
//!
//! 1. upgrade the package on the MS,
//! 2. run the python test cases for the package,
//! 3. parse the xunit reports those tests wrote, producing one case report per `<testcase>`.
//!
//! The suite owns no I/O; collaborators are borrowed for the length of a run and results flow out through a
//! [`SuiteReporter`].

pub mod reporter;

use std::time::{Duration, Instant};

use acceptance_core::{Outcome, translate_record};
use serde::Serialize;

use crate::config::AcceptanceConfig;
use crate::operators::{OperatorError, PythonTestRunner, RpmUpgrade};
use crate::reports::ReportSource;

pub use reporter::{ConsoleReporter, JsonReporter, SuiteReporter};

pub const ACCEPTANCE: &str = "ACCEPTANCE";
pub const CDB_REGRESSION: &str = "CDB_REGRESSION";

/// What a case does when run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Upgrade,
    RunTests,
    ParseReports,
}

/// A test case definition
#[derive(Debug, Clone)]
pub struct CaseSpec {
    pub id: String,
    pub title: String,
    pub groups: &'static [&'static str],
    pub kind: CaseKind,
}

/// Result of one case, or of one report record for the parse case
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub title: String,
    /// `classname:name` for report records, the case title otherwise
    pub identity: String,
    pub failures: Vec<String>,
    pub outcome: Outcome,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Summary of a suite run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub erred: usize,
    pub skipped: usize,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl SuiteSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Erred { .. } => self.erred += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.erred == 0
    }
}

/// Which cases to run
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Case must belong to one of these groups (case-insensitive); empty selects all
    pub groups: Vec<String>,
    /// Substring of the case id or title
    pub keyword: Option<String>,
    /// Stop after the first failed or erred report
    pub stop_on_fail: bool,
}

impl Selection {
    pub fn matches(&self, case: &CaseSpec) -> bool {
        let in_group = self.groups.is_empty()
            || self
                .groups
                .iter()
                .any(|wanted| case.groups.iter().any(|g| g.eq_ignore_ascii_case(wanted)));
        let keyword = self
            .keyword
            .as_deref()
            .is_none_or(|k| case.id.contains(k) || case.title.contains(k));
        in_group && keyword
    }
}

/// The acceptance suite, wired to its collaborators
pub struct AcceptanceSuite<'a> {
    config: &'a AcceptanceConfig,
    upgrade: &'a mut dyn RpmUpgrade,
    runner: &'a mut dyn PythonTestRunner,
    reports: &'a dyn ReportSource,
}

impl<'a> AcceptanceSuite<'a> {
    pub fn new(
        config: &'a AcceptanceConfig,
        upgrade: &'a mut dyn RpmUpgrade,
        runner: &'a mut dyn PythonTestRunner,
        reports: &'a dyn ReportSource,
    ) -> Self {
        Self {
            config,
            upgrade,
            runner,
            reports,
        }
    }

    /// Case definitions in run order.
    pub fn cases(&self) -> Vec<CaseSpec> {
        let package = self.config.package_name();
        vec![
            CaseSpec {
                id: self.config.case_id(1),
                title: format!("Upgrade {} rpm on the MS", package),
                groups: &[ACCEPTANCE],
                kind: CaseKind::Upgrade,
            },
            CaseSpec {
                id: self.config.case_id(2),
                title: format!("Run python test cases for {} package", package),
                groups: &[ACCEPTANCE, CDB_REGRESSION],
                kind: CaseKind::RunTests,
            },
            CaseSpec {
                id: self.config.case_id(3),
                title: "Parse xml outputs from python tests".to_string(),
                groups: &[ACCEPTANCE],
                kind: CaseKind::ParseReports,
            },
        ]
    }

    /// Run the selected cases, streaming every report to `reporter`.
    pub fn run(&mut self, selection: &Selection, reporter: &mut dyn SuiteReporter) -> SuiteSummary {
        let start_time = Instant::now();
        let selected: Vec<CaseSpec> = self.cases().into_iter().filter(|c| selection.matches(c)).collect();
        reporter.on_collection_complete(selected.len());

        let mut summary = SuiteSummary::default();
        'cases: for case in &selected {
            reporter.on_case_start(case);
            let reports = self.run_case(case);
            for report in reports {
                summary.record(&report.outcome);
                reporter.on_case_complete(&report);
                if selection.stop_on_fail && report.outcome.is_failure() {
                    tracing::info!(id = %report.id, "stopping on first failure");
                    break 'cases;
                }
            }
        }

        summary.duration = start_time.elapsed();
        reporter.on_run_complete(&summary);
        summary
    }

    /// Run one case; the parse case yields one report per record.
    pub fn run_case(&mut self, case: &CaseSpec) -> Vec<CaseReport> {
        tracing::debug!(id = %case.id, title = %case.title, "running case");
        match case.kind {
            CaseKind::Upgrade => vec![self.upgrade_case(case)],
            CaseKind::RunTests => vec![self.run_tests_case(case)],
            CaseKind::ParseReports => self.parse_reports_case(case),
        }
    }

    fn upgrade_case(&mut self, case: &CaseSpec) -> CaseReport {
        let start = Instant::now();
        let component = self.config.component.clone();
        let upgrade = &mut *self.upgrade;
        let result = upgrade.initialise(&component).and_then(|()| upgrade.upgrade_rpm());
        exit_code_report(case, result, start.elapsed())
    }

    fn run_tests_case(&mut self, case: &CaseSpec) -> CaseReport {
        let start = Instant::now();
        let runner = &mut *self.runner;
        let result = runner.initialise().and_then(|()| runner.execute());
        exit_code_report(case, result, start.elapsed())
    }

    fn parse_reports_case(&self, case: &CaseSpec) -> Vec<CaseReport> {
        let start = Instant::now();
        let records = match self.reports.records() {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(id = %case.id, error = %e, "cannot load reports");
                return vec![CaseReport {
                    id: case.id.clone(),
                    title: case.title.clone(),
                    identity: case.title.clone(),
                    failures: Vec::new(),
                    outcome: Outcome::Erred {
                        kind: "ReportError".to_string(),
                        message: e.to_string(),
                        text: String::new(),
                    },
                    duration: start.elapsed(),
                }];
            }
        };

        records
            .iter()
            .map(|record| {
                let start = Instant::now();
                let translation = translate_record(record);
                CaseReport {
                    id: case.id.clone(),
                    title: translation.display_name,
                    identity: translation.identity,
                    failures: translation.failures,
                    outcome: translation.outcome,
                    duration: start.elapsed(),
                }
            })
            .collect()
    }
}

/// Map a collaborator result to a report: exit code 0 passes, any other code fails.
fn exit_code_report(case: &CaseSpec, result: Result<i32, OperatorError>, duration: Duration) -> CaseReport {
    let (failures, outcome) = match result {
        Ok(0) => (Vec::new(), Outcome::Pass),
        Ok(code) => {
            let reason = format!("expected exit code 0 but was {}", code);
            (vec![reason.clone()], Outcome::Failed { reasons: vec![reason] })
        }
        Err(e) => {
            tracing::error!(id = %case.id, error = %e, "collaborator error");
            (
                Vec::new(),
                Outcome::Erred {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                    text: String::new(),
                },
            )
        }
    };

    CaseReport {
        id: case.id.clone(),
        title: case.title.clone(),
        identity: case.title.clone(),
        failures,
        outcome,
        duration,
    }
}
