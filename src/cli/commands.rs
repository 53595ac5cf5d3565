//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io;
use std::path::Path;

use crate::config::AcceptanceConfig;
use crate::operators::{CommandRpmUpgrade, CommandTestRunner};
use crate::reports::{DirectoryReportSource, ReportSource};
use crate::suite::{AcceptanceSuite, ConsoleReporter, JsonReporter, Selection, SuiteSummary};

use super::{CliError, CliResult, ExitCode, OutputFormat};

/// Reporting options shared by every command that runs cases.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub verbose: bool,
    pub format: OutputFormat,
}

/// Run the selected cases against the process-backed collaborators.
pub fn run_suite(config: &AcceptanceConfig, selection: &Selection, options: ReportOptions) -> CliResult<ExitCode> {
    let reports = DirectoryReportSource::new(&config.report_dir);
    run_with_source(config, selection, options, &reports)
}

/// Run only the upgrade case.
pub fn upgrade(config: &AcceptanceConfig, options: ReportOptions) -> CliResult<ExitCode> {
    run_suite(config, &single_case(config, 1), options)
}

/// Run only the python test case.
pub fn execute(config: &AcceptanceConfig, options: ReportOptions) -> CliResult<ExitCode> {
    run_suite(config, &single_case(config, 2), options)
}

/// Parse reports at `path` and re-surface their outcomes.
///
/// Unlike the parse case inside `run`, a malformed report is rendered as a full diagnostic here.
pub fn parse_reports(config: &AcceptanceConfig, path: &Path, options: ReportOptions) -> CliResult<ExitCode> {
    let records = DirectoryReportSource::new(path)
        .records()
        .map_err(|e| CliError::failure(format!("{:?}", miette::Report::new(e))))?;
    tracing::info!(path = %path.display(), records = records.len(), "reports loaded");

    run_with_source(config, &single_case(config, 3), options, &records)
}

fn single_case(config: &AcceptanceConfig, number: u32) -> Selection {
    Selection {
        keyword: Some(config.case_id(number)),
        ..Selection::default()
    }
}

fn run_with_source(
    config: &AcceptanceConfig,
    selection: &Selection,
    options: ReportOptions,
    reports: &dyn ReportSource,
) -> CliResult<ExitCode> {
    let mut upgrade = CommandRpmUpgrade::new(config.clone());
    let mut runner = CommandTestRunner::new(config.clone());
    let mut suite = AcceptanceSuite::new(config, &mut upgrade, &mut runner, reports);

    let summary = match options.format {
        OutputFormat::Console => {
            let mut reporter = ConsoleReporter::stdout(options.verbose);
            suite.run(selection, &mut reporter)
        }
        OutputFormat::Json => {
            let mut reporter = JsonReporter::new(io::stdout());
            suite.run(selection, &mut reporter)
        }
    };

    exit_code_for(&summary)
}

fn exit_code_for(summary: &SuiteSummary) -> CliResult<ExitCode> {
    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Summary already printed by the reporter
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_single_case_selects_by_id() {
        let config = AcceptanceConfig::default();
        assert_eq!(single_case(&config, 2).keyword.as_deref(), Some("CXP9031109-2"));
    }

    #[test]
    fn test_exit_code_for_summary() {
        let ok = SuiteSummary {
            total: 1,
            passed: 1,
            ..SuiteSummary::default()
        };
        assert_eq!(exit_code_for(&ok).unwrap(), ExitCode::SUCCESS);

        let failed = SuiteSummary {
            total: 1,
            erred: 1,
            ..SuiteSummary::default()
        };
        assert_eq!(exit_code_for(&failed).unwrap_err().exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_parse_reports_renders_diagnostic() {
        let dir = std::env::temp_dir().join(format!("rpm_acceptance_cli_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("broken.xml");
        std::fs::write(&file, "<testsuite><testcase classname=\"T\"/></testsuite>").unwrap();

        let options = ReportOptions {
            verbose: false,
            format: OutputFormat::Json,
        };
        let err = parse_reports(&AcceptanceConfig::default(), &file, options).unwrap_err();
        assert!(err.message.contains("malformed xunit report"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
