//! Harness Configuration
//!
//! Everything the harness needs to know about the target application, the
//! notebook executor and the files it inspects.

use shared::{MarkerPolicy, SharedError, SharedResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Diagnostic notebook executed before the battery
pub const DIAGNOSTIC_NOTEBOOK: &str = "debug";

/// Notebook that instructs the target application to exit
pub const SHUTDOWN_NOTEBOOK: &str = "shutdown";

/// Test notebooks, in execution order
pub const DEFAULT_BATTERY: [&str; 8] = [
    "matplotlib",
    "fit_testing_exponential",
    "fit_testing_gaussian",
    "fit_testing_lorentzian",
    "fit_testing_N14",
    "fit_testing_N15",
    "fit_testing_poissonian",
    "fit_testing_sine",
];

/// How the target application is launched
#[derive(Debug, Clone, PartialEq)]
pub struct TargetConfig {
    /// Interpreter (or any executable) used to start the application
    pub interpreter: String,
    /// Entry script handed to the interpreter
    pub entry: String,
    /// Extra arguments appended after the entry script
    pub args: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
            entry: "start.py".to_string(),
            args: Vec::new(),
        }
    }
}

impl TargetConfig {
    /// Full argument vector passed to the interpreter
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.entry.clone());
        args.extend(self.args.iter().cloned());
        args
    }

    /// Human readable command line, used in logs and errors
    pub fn command_line(&self) -> String {
        std::iter::once(self.interpreter.clone())
            .chain(self.to_args())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub target: TargetConfig,
    /// Directory both the target and the executor run in; relative paths below resolve against it
    pub working_dir: PathBuf,
    pub notebook_dir: PathBuf,
    pub report_dir: PathBuf,
    /// Program invoked as `<executor> nbconvert --execute --to html ...`
    pub executor: String,
    pub diagnostic_notebook: String,
    pub shutdown_notebook: String,
    pub battery: Vec<String>,
    pub app_log: PathBuf,
    pub crash_log: PathBuf,
    pub startup_grace: Duration,
    pub shutdown_grace: Duration,
    pub marker_policy: MarkerPolicy,
    pub summary_json: Option<PathBuf>,
    pub log_level: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            working_dir: PathBuf::from("."),
            notebook_dir: PathBuf::from("notebooks"),
            report_dir: PathBuf::from("."),
            executor: "jupyter".to_string(),
            diagnostic_notebook: DIAGNOSTIC_NOTEBOOK.to_string(),
            shutdown_notebook: SHUTDOWN_NOTEBOOK.to_string(),
            battery: DEFAULT_BATTERY.iter().map(|name| name.to_string()).collect(),
            app_log: PathBuf::from("qudi.log"),
            crash_log: PathBuf::from("crash.log"),
            startup_grace: Duration::from_secs(10),
            shutdown_grace: Duration::from_secs(20),
            marker_policy: MarkerPolicy::default(),
            summary_json: None,
            log_level: "info".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Create a new builder
    pub fn builder() -> crate::config::builder::HarnessConfigBuilder {
        crate::config::builder::HarnessConfigBuilder::new()
    }

    /// Path of the notebook document called `name`
    pub fn notebook_path(&self, name: &str) -> PathBuf {
        self.working_dir.join(&self.notebook_dir).join(format!("{name}.ipynb"))
    }

    pub fn diagnostic_path(&self) -> PathBuf {
        self.notebook_path(&self.diagnostic_notebook)
    }

    pub fn shutdown_path(&self) -> PathBuf {
        self.notebook_path(&self.shutdown_notebook)
    }

    /// Battery notebook paths in execution order
    pub fn battery_paths(&self) -> Vec<PathBuf> {
        self.battery.iter().map(|name| self.notebook_path(name)).collect()
    }

    pub fn report_dir_path(&self) -> PathBuf {
        self.working_dir.join(&self.report_dir)
    }

    /// Rendered report the executor writes for `notebook`
    pub fn report_path(&self, notebook: &Path) -> PathBuf {
        let stem = notebook.file_stem().unwrap_or(notebook.as_os_str());
        let mut file_name = stem.to_os_string();
        file_name.push(".html");
        self.report_dir_path().join(file_name)
    }

    pub fn app_log_path(&self) -> PathBuf {
        self.working_dir.join(&self.app_log)
    }

    pub fn crash_log_path(&self) -> PathBuf {
        self.working_dir.join(&self.crash_log)
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> SharedResult<()> {
        if self.target.interpreter.trim().is_empty() {
            return Err(invalid("interpreter", &self.target.interpreter));
        }
        if self.target.entry.trim().is_empty() {
            return Err(invalid("app_entry", &self.target.entry));
        }
        if self.executor.trim().is_empty() {
            return Err(invalid("executor", &self.executor));
        }
        if self.diagnostic_notebook.trim().is_empty() {
            return Err(invalid("diagnostic_notebook", &self.diagnostic_notebook));
        }
        if self.shutdown_notebook.trim().is_empty() {
            return Err(invalid("shutdown_notebook", &self.shutdown_notebook));
        }
        if let Some(empty) = self.battery.iter().find(|name| name.trim().is_empty()) {
            return Err(invalid("battery", empty));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn invalid(field: &str, value: &str) -> SharedError {
    SharedError::InvalidConfig {
        field: field.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_battery_order() {
        let config = HarnessConfig::default();
        assert_eq!(config.battery.len(), 8);
        assert_eq!(config.battery.first().map(String::as_str), Some("matplotlib"));
        assert_eq!(config.battery.last().map(String::as_str), Some("fit_testing_sine"));
        assert_eq!(config.battery[2], "fit_testing_gaussian");
    }

    #[test]
    fn test_default_paths() {
        let config = HarnessConfig::default();
        assert_eq!(config.diagnostic_path(), PathBuf::from("./notebooks/debug.ipynb"));
        assert_eq!(config.shutdown_path(), PathBuf::from("./notebooks/shutdown.ipynb"));
        assert_eq!(config.app_log_path(), PathBuf::from("./qudi.log"));
        assert_eq!(config.crash_log_path(), PathBuf::from("./crash.log"));
        assert_eq!(config.startup_grace, Duration::from_secs(10));
        assert_eq!(config.shutdown_grace, Duration::from_secs(20));
    }

    #[test]
    fn test_report_path_follows_notebook_stem() {
        let config = HarnessConfig::builder().working_dir("run").report_dir("reports").build();
        assert_eq!(
            config.report_path(&config.notebook_path("fit_testing_N15")),
            PathBuf::from("run/reports/fit_testing_N15.html")
        );
    }

    #[test]
    fn test_target_command_line() {
        let target = TargetConfig {
            interpreter: "python3.6".to_string(),
            entry: "start.py".to_string(),
            args: vec!["--no-gui".to_string()],
        };
        assert_eq!(target.to_args(), vec!["start.py", "--no-gui"]);
        assert_eq!(target.command_line(), "python3.6 start.py --no-gui");
    }

    #[test]
    fn test_validation_rejects_blank_interpreter() {
        let mut config = HarnessConfig::default();
        assert!(config.is_valid());

        config.target.interpreter = "  ".to_string();
        match config.validate() {
            Err(SharedError::InvalidConfig { field, .. }) => assert_eq!(field, "interpreter"),
            other => panic!("unexpected validation result: {other:?}"),
        }
    }

    #[test]
    fn test_validation_rejects_blank_battery_entry() {
        let mut config = HarnessConfig::default();
        config.battery.push(String::new());
        assert!(!config.is_valid());
    }
}
