//! Runner configuration
//!
//! Defaults target the LITP CLI package on a management server; every field can be overridden from the
//! command line.

use std::path::PathBuf;
use std::time::Duration;

/// Placeholder substituted with the full package name in upgrade commands.
pub const PACKAGE_PLACEHOLDER: &str = "{package}";
/// Placeholder substituted with the xunit report file in test commands.
pub const REPORT_FILE_PLACEHOLDER: &str = "{report_file}";
/// Placeholder substituted with the python suite directory in test commands.
pub const SUITE_DIR_PLACEHOLDER: &str = "{suite_dir}";

/// Acceptance runner configuration
#[derive(Debug, Clone)]
pub struct AcceptanceConfig {
    /// Product number used as the test case id prefix
    pub product_id: String,
    /// Component the upgrade is initialised with, e.g. `cli`
    pub component: String,
    /// Prefix joined with the component to form the package name
    pub package_prefix: String,
    /// Upgrade command, one argv element per entry
    pub upgrade_command: Vec<String>,
    /// Python suite command, one argv element per entry
    pub test_command: Vec<String>,
    /// Directory holding the python test scripts
    pub suite_dir: PathBuf,
    /// Directory the xunit reports are written to and read from
    pub report_dir: PathBuf,
    /// File name of the report the python run produces
    pub report_file_name: String,
    /// Upper bound for each collaborator process
    pub timeout: Duration,
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            product_id: "CXP9031109".to_string(),
            component: "cli".to_string(),
            package_prefix: "ERIClitp".to_string(),
            upgrade_command: ["yum", "upgrade", "-y", PACKAGE_PLACEHOLDER]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            test_command: vec![
                "nosetests".to_string(),
                "--with-xunit".to_string(),
                format!("--xunit-file={REPORT_FILE_PLACEHOLDER}"),
                SUITE_DIR_PLACEHOLDER.to_string(),
            ],
            suite_dir: PathBuf::from("python-testcases/src/main/resources/cli"),
            report_dir: PathBuf::from("target/surefire-reports"),
            report_file_name: "nosetests.xml".to_string(),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl AcceptanceConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Full package name, e.g. `ERIClitpcli`.
    pub fn package_name(&self) -> String {
        format!("{}{}", self.package_prefix, self.component)
    }

    /// Path of the xunit report the python run writes.
    pub fn report_file(&self) -> PathBuf {
        self.report_dir.join(&self.report_file_name)
    }

    /// Test case id for a case number, e.g. `CXP9031109-2`.
    pub fn case_id(&self, number: u32) -> String {
        format!("{}-{}", self.product_id, number)
    }

    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn with_package_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.package_prefix = prefix.into();
        self
    }

    pub fn with_upgrade_command(mut self, argv: Vec<String>) -> Self {
        self.upgrade_command = argv;
        self
    }

    pub fn with_test_command(mut self, argv: Vec<String>) -> Self {
        self.test_command = argv;
        self
    }

    pub fn with_suite_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.suite_dir = dir.into();
        self
    }

    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Replace every placeholder in `argv` with its value.
pub fn expand_argv(argv: &[String], substitutions: &[(&str, &str)]) -> Vec<String> {
    argv.iter()
        .map(|arg| {
            substitutions
                .iter()
                .fold(arg.clone(), |acc, (placeholder, value)| acc.replace(placeholder, value))
        })
        .collect()
}
