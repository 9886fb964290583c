//! Test helpers and builder patterns for harness tests
//!
//! `ScenarioBuilder` wires mock launcher, target, executor and file system
//! into a `Harness` so each test only states what differs from a clean run.

use harness::*;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::fixtures::TestFixtures;

pub type MockHarness = Harness<MockProcessLauncher, MockNotebookExecutor, MockFileSystem>;

/// In-memory files shared by the executor and file-system mocks
type FileStore = Arc<Mutex<HashMap<PathBuf, String>>>;

/// Builder for a mocked harness run with sensible defaults
pub struct ScenarioBuilder {
    config: HarnessConfig,
    /// Number of liveness probes answered with `true`; `None` means always alive
    alive_checks: Option<usize>,
    survives_shutdown: bool,
    launch_fails: bool,
    executor_fails_on: Option<String>,
    /// Report overrides by notebook name; `None` means the report was never written
    reports: HashMap<String, Option<String>>,
    /// Reports already on disk before the run starts
    stale_reports: HashMap<String, String>,
    app_log: Option<String>,
    crash_log: Option<String>,
}

impl ScenarioBuilder {
    /// Clean run: target stays up, every report is clean, log has no errors
    pub fn new() -> Self {
        Self {
            config: TestFixtures::config(),
            alive_checks: None,
            survives_shutdown: false,
            launch_fails: false,
            executor_fails_on: None,
            reports: HashMap::new(),
            stale_reports: HashMap::new(),
            app_log: Some(TestFixtures::CLEAN_APP_LOG.to_string()),
            crash_log: None,
        }
    }

    /// Adjust the configuration
    pub fn with_config<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(HarnessConfigBuilder) -> HarnessConfigBuilder,
    {
        self.config = setup(HarnessConfig::builder().no_grace()).build();
        self
    }

    /// Target answers the first `checks` liveness probes, then is dead
    pub fn dies_after_checks(mut self, checks: usize) -> Self {
        self.alive_checks = Some(checks);
        self
    }

    /// Target still accepts SIGTERM after the shutdown notebook
    pub fn survives_shutdown(mut self) -> Self {
        self.survives_shutdown = true;
        self
    }

    pub fn launch_fails(mut self) -> Self {
        self.launch_fails = true;
        self
    }

    /// Executor cannot be run for the named notebook
    pub fn executor_fails_on(mut self, name: &str) -> Self {
        self.executor_fails_on = Some(name.to_string());
        self
    }

    pub fn report(mut self, name: &str, html: &str) -> Self {
        self.reports.insert(name.to_string(), Some(html.to_string()));
        self
    }

    pub fn stderr_report(self, name: &str) -> Self {
        self.report(name, TestFixtures::STDERR_REPORT)
    }

    pub fn missing_report(mut self, name: &str) -> Self {
        self.reports.insert(name.to_string(), None);
        self
    }

    /// Report left behind by an earlier run
    pub fn stale_report(mut self, name: &str, html: &str) -> Self {
        self.stale_reports.insert(name.to_string(), html.to_string());
        self
    }

    pub fn app_log(mut self, content: Option<&str>) -> Self {
        self.app_log = content.map(str::to_string);
        self
    }

    pub fn crash_log(mut self, content: &str) -> Self {
        self.crash_log = Some(content.to_string());
        self
    }

    pub fn build(self) -> Scenario {
        let executed = Arc::new(Mutex::new(Vec::new()));
        let terminate_calls = Arc::new(AtomicUsize::new(0));

        let files = self.file_store();
        let launcher = self.launcher(Arc::clone(&terminate_calls));
        let executor = self.executor(Arc::clone(&executed), Arc::clone(&files));
        let file_system = self.file_system(files);

        let harness = Harness::new(self.config, launcher, executor, file_system).expect("valid test configuration");

        Scenario {
            harness,
            executed,
            terminate_calls,
        }
    }

    fn target(&self, terminate_calls: Arc<AtomicUsize>) -> MockTargetProcess {
        let mut target = MockTargetProcess::new();
        target.expect_pid().return_const(Some(TestFixtures::TARGET_PID));

        let limit = self.alive_checks;
        let mut probes = 0usize;
        target.expect_is_alive().returning(move || {
            probes += 1;
            limit.map_or(true, |n| probes <= n)
        });

        let survives = self.survives_shutdown;
        target.expect_signal_terminate().returning(move || {
            terminate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(survives)
        });
        target.expect_wait().returning(|| Ok(Some(0)));
        target
    }

    fn launcher(&self, terminate_calls: Arc<AtomicUsize>) -> MockProcessLauncher {
        let mut launcher = MockProcessLauncher::new();
        if self.launch_fails {
            launcher.expect_launch().return_once(|| {
                Err(HarnessError::LaunchFailed {
                    command: "python3 start.py".to_string(),
                    source: io::Error::new(io::ErrorKind::NotFound, "python3: not found"),
                })
            });
        } else {
            let target: Box<dyn TargetProcess> = Box::new(self.target(terminate_calls));
            launcher.expect_launch().return_once(move || Ok(target));
        }
        launcher
    }

    /// Executor mock that "renders" each report into the shared file store
    fn executor(&self, executed: Arc<Mutex<Vec<String>>>, files: FileStore) -> MockNotebookExecutor {
        let mut executor = MockNotebookExecutor::new();
        let report_dir = self.config.report_dir_path();
        let fails_on = self.executor_fails_on.clone();
        let reports = self.reports.clone();

        executor.expect_execute().returning(move |notebook: &Path| {
            let name = notebook_name(notebook);
            executed.lock().unwrap().push(name.clone());

            if fails_on.as_deref() == Some(name.as_str()) {
                return Err(HarnessError::ExecutorFailed {
                    notebook: notebook.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::NotFound, "jupyter: not found"),
                });
            }

            let report_path = report_dir.join(format!("{name}.html"));
            let rendered = match reports.get(&name) {
                Some(rendered) => rendered.clone(),
                None => Some(TestFixtures::CLEAN_REPORT.to_string()),
            };
            // No report behaves like nbconvert aborting on a failing cell
            let exit_code = match rendered {
                Some(html) => {
                    files.lock().unwrap().insert(report_path.clone(), html);
                    0
                }
                None => 1,
            };
            Ok(ExecutionReport {
                notebook: notebook.to_path_buf(),
                report_path,
                exit_code: Some(exit_code),
            })
        });
        executor
    }

    /// File store seeded with the logs and any reports left by an earlier run
    fn file_store(&self) -> FileStore {
        let report_dir = self.config.report_dir_path();
        let mut files: HashMap<PathBuf, String> = self
            .stale_reports
            .iter()
            .map(|(name, html)| (report_dir.join(format!("{name}.html")), html.clone()))
            .collect();
        if let Some(log) = &self.app_log {
            files.insert(self.config.app_log_path(), log.clone());
        }
        if let Some(log) = &self.crash_log {
            files.insert(self.config.crash_log_path(), log.clone());
        }
        Arc::new(Mutex::new(files))
    }

    fn file_system(&self, files: FileStore) -> MockFileSystem {
        let mut file_system = MockFileSystem::new();

        let reads = Arc::clone(&files);
        file_system
            .expect_read_optional()
            .returning(move |path: &Path| Ok(reads.lock().unwrap().get(path).cloned()));
        file_system
            .expect_remove_if_exists()
            .returning(move |path: &Path| Ok(files.lock().unwrap().remove(path).is_some()));
        file_system
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built scenario plus the observations the mocks recorded
pub struct Scenario {
    pub harness: MockHarness,
    executed: Arc<Mutex<Vec<String>>>,
    terminate_calls: Arc<AtomicUsize>,
}

impl Scenario {
    pub async fn run(&self) -> RunOutcome {
        self.harness.run().await
    }

    /// Notebook names handed to the executor, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn terminate_calls(&self) -> usize {
        self.terminate_calls.load(Ordering::SeqCst)
    }
}

/// Test assertions shared across suites
pub struct TestHelpers;

impl TestHelpers {
    /// Full expected execution order of a run that reaches the shutdown notebook
    pub fn full_run_order() -> Vec<String> {
        let mut order = vec!["debug".to_string()];
        order.extend(TestFixtures::battery());
        order.push("shutdown".to_string());
        order
    }

    pub fn assert_completed(outcome: &RunOutcome, total: u32, failed: u32) {
        match outcome {
            RunOutcome::Completed(summary) => {
                assert_eq!(summary.counters, RunCounters { total, failed }, "unexpected counters");
                assert_eq!(summary.outcome, "completed");
            }
            RunOutcome::Fatal { reason, .. } => panic!("expected a completed run, got fatal: {reason}"),
        }
    }
}

fn notebook_name(notebook: &Path) -> String {
    notebook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
