//! Suite reporters
//!
//! ## SuiteReporter Trait
//!
//! The suite uses a `SuiteReporter` trait to separate reporting from execution. Two implementations ship:
//! a pytest-style console reporter and a JSON document writer for CI consumption.

use std::io::{self, Write};

use acceptance_core::Outcome;
use serde::Serialize;

use super::{CaseReport, CaseSpec, SuiteSummary};
use crate::version::RUNNER_VERSION;

/// Trait for reporting suite execution results.
pub trait SuiteReporter {
    /// Called once selection is done
    fn on_collection_complete(&mut self, case_count: usize);

    /// Called when a case begins
    fn on_case_start(&mut self, _case: &CaseSpec) {}

    /// Called for every report a case produces
    fn on_case_complete(&mut self, report: &CaseReport);

    /// Called when all cases have completed
    fn on_run_complete(&mut self, summary: &SuiteSummary);
}

/// Default console reporter (pytest-style)
pub struct ConsoleReporter<W: Write> {
    out: W,
    pub verbose: bool,
    pub color: bool,
    failures: Vec<CaseReport>,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(io::stdout(), verbose, true)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool, color: bool) -> Self {
        Self {
            out,
            verbose,
            color,
            failures: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn status(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Pass => self.paint("32", outcome.as_str()),
            Outcome::Failed { .. } | Outcome::Erred { .. } => self.paint("31", outcome.as_str()),
            Outcome::Skipped { count } => format!("{} ({})", self.paint("33", outcome.as_str()), count),
        }
    }

    // Reporter output is best effort; a closed stdout must not abort the run.
    fn emit(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
    }
}

impl<W: Write> SuiteReporter for ConsoleReporter<W> {
    fn on_collection_complete(&mut self, case_count: usize) {
        if case_count == 0 {
            self.emit("No cases selected");
            return;
        }
        let header = self.paint("1", "=================== acceptance session starts ===================");
        self.emit(&header);
        self.emit(&format!("collected {} case(s)", case_count));
        self.emit("");
    }

    fn on_case_start(&mut self, case: &CaseSpec) {
        if self.verbose {
            let line = format!("{} {} [{}]", case.id, case.title, case.groups.join(", "));
            self.emit(&line);
        }
    }

    fn on_case_complete(&mut self, report: &CaseReport) {
        let mut line = format!("{} {} {}", report.id, report.identity, self.status(&report.outcome));
        if self.verbose {
            line.push_str(&format!(" ({}ms)", report.duration.as_millis()));
        }
        self.emit(&line);
        if report.outcome.is_failure() {
            self.failures.push(report.clone());
        }
    }

    fn on_run_complete(&mut self, summary: &SuiteSummary) {
        if !self.failures.is_empty() {
            self.emit("");
            let banner = self.paint("1;31", "=================== FAILURES ===================");
            self.emit(&banner);
            for report in std::mem::take(&mut self.failures) {
                self.emit("");
                self.emit(&format!("___________ {} {} ___________", report.id, report.identity));
                for reason in &report.failures {
                    self.emit(&format!("    {}", reason));
                }
                if let Outcome::Erred { kind, message, text } = &report.outcome {
                    self.emit(&format!("    {}: {}", kind, message));
                    for line in text.lines() {
                        self.emit(&format!("    {}", line));
                    }
                }
            }
        }

        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("{} passed", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed));
        }
        if summary.erred > 0 {
            parts.push(format!("{} error", summary.erred));
        }
        if summary.skipped > 0 {
            parts.push(format!("{} skipped", summary.skipped));
        }
        if parts.is_empty() {
            parts.push("no cases ran".to_string());
        }

        let line = format!(
            "=================== {} in {:.2}s ===================",
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
        let line = if summary.is_success() {
            self.paint("1;32", &line)
        } else {
            self.paint("1;31", &line)
        };
        self.emit("");
        self.emit(&line);
        let _ = self.out.flush();
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    runner_version: &'static str,
    summary: &'a SuiteSummary,
    cases: &'a [CaseReport],
}

/// Collects reports and writes one JSON document when the run completes
pub struct JsonReporter<W: Write> {
    out: W,
    cases: Vec<CaseReport>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, cases: Vec::new() }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SuiteReporter for JsonReporter<W> {
    fn on_collection_complete(&mut self, _case_count: usize) {}

    fn on_case_complete(&mut self, report: &CaseReport) {
        self.cases.push(report.clone());
    }

    fn on_run_complete(&mut self, summary: &SuiteSummary) {
        let document = JsonDocument {
            runner_version: RUNNER_VERSION,
            summary,
            cases: &self.cases,
        };
        if let Err(e) = serde_json::to_writer_pretty(&mut self.out, &document) {
            tracing::error!(error = %e, "failed to write JSON report");
            return;
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}
