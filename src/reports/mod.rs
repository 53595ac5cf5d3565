//! Report ingestion
//!
//! A [`ReportSource`] yields the records that drive the data-driven parse case. The default source reads
//! every xunit file in the report directory; [`xunit`] does the parsing.

pub mod xunit;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use acceptance_core::ReportRecord;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors raised while loading report records
#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("cannot read report '{}': {source}", .path.display())]
    #[diagnostic(code(reports::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed xunit report: {message}")]
    #[diagnostic(
        code(reports::parse),
        help("reports are expected in xunit format, as written by `nosetests --with-xunit`")
    )]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        at: SourceSpan,
    },

    #[error("no xunit reports found in '{}'", .0.display())]
    #[diagnostic(code(reports::empty), help("run the python test cases first"))]
    NoReports(PathBuf),
}

/// Supplies report records, one per data-driven invocation.
pub trait ReportSource {
    fn records(&self) -> Result<Vec<ReportRecord>, ReportError>;
}

impl ReportSource for Vec<ReportRecord> {
    fn records(&self) -> Result<Vec<ReportRecord>, ReportError> {
        Ok(self.clone())
    }
}

/// Reads every `*.xml` report under a path.
#[derive(Debug, Clone)]
pub struct DirectoryReportSource {
    path: PathBuf,
}

impl DirectoryReportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSource for DirectoryReportSource {
    fn records(&self) -> Result<Vec<ReportRecord>, ReportError> {
        let files = discover_report_files(&self.path);
        if files.is_empty() {
            return Err(ReportError::NoReports(self.path.clone()));
        }

        let mut records = Vec::new();
        for file in &files {
            let parsed = xunit::read_file(file)?;
            tracing::debug!(file = %file.display(), records = parsed.len(), "report loaded");
            records.extend(parsed);
        }
        Ok(records)
    }
}

/// Discover report files at a path.
///
/// A file is accepted as-is when it has an `.xml` extension; a directory is scanned one level deep. The
/// result is sorted so record order is stable between runs.
pub fn discover_report_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if path.is_file() {
        if is_xml(path) {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                let entry_path = entry.path();
                if entry_path.is_file() && is_xml(&entry_path) {
                    files.push(entry_path);
                }
            }
        }
    }

    files.sort();
    files
}

fn is_xml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}
