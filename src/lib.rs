#![forbid(unsafe_code)]
//! RPM acceptance runner
//!
//! Upgrades a package on the management server, runs the package's python test cases, and re-surfaces the
//! xunit reports those tests write as individual pass/fail/error/skip results.
//!
//! The outcome rules live in the `acceptance_core` crate; this crate wires them to real collaborators
//! (package manager and test runner processes, report files) and to the command line.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod operators;
pub mod reports;
pub mod suite;
pub mod version;

pub use acceptance_core::{ConditionEntry, Outcome, ReportRecord, SkipEntry};
pub use config::AcceptanceConfig;
pub use operators::{OperatorError, PythonTestRunner, RpmUpgrade};
pub use reports::{DirectoryReportSource, ReportError, ReportSource};
pub use suite::{AcceptanceSuite, CaseReport, Selection, SuiteSummary};
