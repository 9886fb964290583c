//! Main harness driver
//!
//! Drives the target application through its fixed lifecycle:
//! start → diagnostic notebook → test battery → shutdown notebook →
//! termination check → log audit. Everything runs strictly in sequence;
//! the only other moving part is the target process itself.

use std::path::Path;
use tokio::time::sleep;

use shared::{logging, stage_debug, stage_error, stage_info, stage_warn, Stage, Verdict};

use crate::{
    config::HarnessConfig,
    core::{exit_code_for_failures, FatalReason, LogAuditor, LogDump, MarkerScanner, RunOutcome, FATAL_EXIT_CODE},
    error::HarnessResult,
    state::{NotebookRecord, RunState},
    traits::{ExecutionReport, FileSystem, NotebookExecutor, ProcessLauncher, TargetProcess},
};

pub struct Harness<L, E, F>
where
    L: ProcessLauncher + 'static,
    E: NotebookExecutor + 'static,
    F: FileSystem + 'static,
{
    config: HarnessConfig,

    /// Injected services
    launcher: L,
    executor: E,
    file_system: F,

    scanner: MarkerScanner,
    auditor: LogAuditor,
}

impl<L, E, F> Harness<L, E, F>
where
    L: ProcessLauncher + 'static,
    E: NotebookExecutor + 'static,
    F: FileSystem + 'static,
{
    /// Create a harness with injected dependencies; the configuration is validated here
    pub fn new(config: HarnessConfig, launcher: L, executor: E, file_system: F) -> HarnessResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            launcher,
            executor,
            file_system,
            scanner: MarkerScanner::new()?,
            auditor: LogAuditor::new()?,
        })
    }

    /// Execute one complete run
    pub async fn run(&self) -> RunOutcome {
        let mut state = RunState::new(self.config.marker_policy);

        logging::log_stage_start(
            Stage::Startup,
            &format!("Launching target application: {}", self.config.target.command_line()),
        );
        let mut target = match self.launcher.launch().await {
            Ok(target) => target,
            Err(e) => {
                logging::log_error(Stage::Startup, "Target launch", &e);
                return self.abort(state, e.into()).await;
            }
        };
        state.target_pid = target.pid();

        match self.drive(target.as_mut(), &mut state).await {
            Ok(()) => self.complete(state),
            Err(reason) => {
                if reason.is_infrastructure() {
                    self.release(target.as_mut());
                }
                self.abort(state, reason).await
            }
        }
    }

    async fn drive(&self, target: &mut dyn TargetProcess, state: &mut RunState) -> Result<(), FatalReason> {
        self.await_ready(target).await?;

        let diagnostic = self.config.diagnostic_path();
        self.run_unjudged(Stage::Diagnostic, &diagnostic, state).await?;
        self.ensure_alive(Stage::Diagnostic, target, &diagnostic)?;

        self.run_battery(target, state).await?;

        let shutdown = self.config.shutdown_path();
        self.run_unjudged(Stage::Shutdown, &shutdown, state).await?;
        self.await_shutdown(target, state).await?;

        self.audit_log(state).await?;
        Ok(())
    }

    /// Give the target its startup grace period, then require it to be running
    async fn await_ready(&self, target: &mut dyn TargetProcess) -> Result<(), FatalReason> {
        stage_debug!(Stage::Startup, "⏳ Waiting {:?} for startup", self.config.startup_grace);
        sleep(self.config.startup_grace).await;

        if !target.is_alive() {
            stage_error!(Stage::Startup, "💀 Target application is not running after startup");
            return Err(FatalReason::StartupFailed { pid: target.pid() });
        }
        logging::log_success(Stage::Startup, "Target application is running");
        Ok(())
    }

    /// A dead target is never allowed past a checkpoint
    fn ensure_alive(&self, stage: Stage, target: &mut dyn TargetProcess, notebook: &Path) -> Result<(), FatalReason> {
        if target.is_alive() {
            return Ok(());
        }
        stage_error!(stage, "💀 Target application died while running {}", notebook.display());
        Err(FatalReason::TargetDied {
            notebook: notebook.to_path_buf(),
        })
    }

    /// Fire-and-forget execution: the report is not judged
    async fn run_unjudged(&self, stage: Stage, notebook: &Path, state: &mut RunState) -> HarnessResult<()> {
        stage_info!(stage, "📓 Running {}", notebook.display());
        let report = self.executor.execute(notebook).await?;
        state.record_notebook(record(stage, &report, None, 0));
        Ok(())
    }

    async fn run_battery(&self, target: &mut dyn TargetProcess, state: &mut RunState) -> Result<(), FatalReason> {
        let notebooks = self.config.battery_paths();
        logging::log_stage_start(Stage::Battery, &format!("Running {} test notebooks", notebooks.len()));

        for notebook in &notebooks {
            state.counters.record_attempt();
            stage_info!(Stage::Battery, "📓 Running {}", notebook.display());

            self.clear_stale_report(notebook).await?;
            let report = self.executor.execute(notebook).await?;
            self.ensure_alive(Stage::Battery, target, notebook)?;

            let (verdict, marker_lines) = self.judge(&report).await?;
            state.record_notebook(record(Stage::Battery, &report, Some(verdict), marker_lines));

            match verdict {
                Verdict::Pass => {
                    stage_info!(Stage::Battery, "✅ {} passed", notebook.display());
                }
                Verdict::Fail => {
                    stage_warn!(
                        Stage::Battery,
                        "❌ {} failed. Failed {}/{}",
                        notebook.display(),
                        state.counters.failed,
                        state.counters.total
                    );
                }
            }
        }
        Ok(())
    }

    /// A report left by an earlier run must not be judged as this run's output
    async fn clear_stale_report(&self, notebook: &Path) -> HarnessResult<()> {
        let path = self.config.report_path(notebook);
        if self.file_system.remove_if_exists(&path).await? {
            stage_debug!(Stage::Battery, "🧹 Removed stale report {}", path.display());
        }
        Ok(())
    }

    /// Scan the rendered report for the stderr marker and apply the marker policy
    async fn judge(&self, report: &ExecutionReport) -> HarnessResult<(Verdict, usize)> {
        let Some(html) = self.file_system.read_optional(&report.report_path).await? else {
            stage_warn!(Stage::Battery, "⚠️ Report {} was not produced", report.report_path.display());
            return Ok((Verdict::Fail, 0));
        };

        let scan = self.scanner.scan(&html);
        for line in &scan.lines {
            stage_warn!(Stage::Battery, "stderr output in {}: {}", report.report_path.display(), line);
        }
        Ok((self.config.marker_policy.verdict(scan.found()), scan.lines.len()))
    }

    /// After the grace period the target must already be gone; a deliverable SIGTERM is fatal
    async fn await_shutdown(&self, target: &mut dyn TargetProcess, state: &mut RunState) -> Result<(), FatalReason> {
        stage_debug!(Stage::Shutdown, "⏳ Waiting {:?} for shutdown", self.config.shutdown_grace);
        sleep(self.config.shutdown_grace).await;

        if target.signal_terminate()? {
            stage_error!(
                Stage::Shutdown,
                "💀 Target application was still running after the shutdown notebook"
            );
            return Err(FatalReason::SurvivedShutdown { pid: target.pid() });
        }

        state.target_exit_code = target.wait().await?;
        logging::log_success(
            Stage::Shutdown,
            &format!("Target application exited (code {:?})", state.target_exit_code),
        );
        Ok(())
    }

    async fn audit_log(&self, state: &mut RunState) -> HarnessResult<()> {
        let path = self.config.app_log_path();
        let log = self.file_system.read_optional(&path).await?;
        let audit = self.auditor.audit(log.as_deref());

        if !audit.log_present {
            stage_warn!(Stage::Audit, "⚠️ Application log {} not found", path.display());
        }
        for line in &audit.error_lines {
            stage_warn!(Stage::Audit, "application error: {}", line);
        }
        state.record_audit(audit);
        Ok(())
    }

    fn complete(&self, state: RunState) -> RunOutcome {
        let counters = state.counters;
        let exit_code = exit_code_for_failures(counters.failed);

        if counters.failed == 0 {
            logging::log_success(Stage::Audit, &format!("All {} notebooks passed", counters.total));
        } else {
            stage_warn!(Stage::Audit, "🏁 Failed {}/{}", counters.failed, counters.total);
        }

        RunOutcome::Completed(state.into_summary("completed", None, exit_code))
    }

    async fn abort(&self, state: RunState, reason: FatalReason) -> RunOutcome {
        tracing::error!(reason = %reason, "🛑 Aborting run");
        let logs = self.collect_logs().await;
        let summary = state.into_summary("fatal", Some(reason.to_string()), FATAL_EXIT_CODE);
        RunOutcome::Fatal { reason, logs, summary }
    }

    async fn collect_logs(&self) -> LogDump {
        LogDump {
            app_log: self.read_log(&self.config.app_log_path()).await,
            crash_log: self.read_log(&self.config.crash_log_path()).await,
        }
    }

    async fn read_log(&self, path: &Path) -> Option<String> {
        match self.file_system.read_optional(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("⚠️ Could not read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Do not leave a live target behind when the harness itself gave up
    fn release(&self, target: &mut dyn TargetProcess) {
        if !target.is_alive() {
            return;
        }
        tracing::warn!(pid = ?target.pid(), "🔨 Terminating target application after harness failure");
        if let Err(e) = target.signal_terminate() {
            tracing::warn!("⚠️ Failed to terminate target application: {}", e);
        }
    }
}

fn record(stage: Stage, report: &ExecutionReport, verdict: Option<Verdict>, marker_lines: usize) -> NotebookRecord {
    NotebookRecord {
        notebook: report.notebook.clone(),
        stage,
        report_path: report.report_path.clone(),
        executor_exit_code: report.exit_code,
        verdict,
        marker_lines,
    }
}
