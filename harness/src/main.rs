//! Main entry point for the harness binary
//!
//! Wires the real services into the harness, runs it once and turns the
//! outcome into the process exit status.

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use harness::{
    core::FATAL_EXIT_CODE, Harness, HarnessConfig, RealFileSystem, RealNotebookExecutor, RealProcessLauncher,
    RunOutcome, TargetConfig,
};
use shared::MarkerPolicy;

/// Smoke-test notebooks against a running application
#[derive(Parser, Debug)]
#[command(name = "harness")]
#[command(about = "Runs the notebook battery against a live target application and verifies its lifecycle")]
pub struct Args {
    /// Interpreter used to start the target application
    #[arg(long, env = "HARNESS_INTERPRETER", default_value = "python3")]
    pub interpreter: String,

    /// Entry script of the target application
    #[arg(long, env = "HARNESS_APP_ENTRY", default_value = "start.py")]
    pub app_entry: String,

    /// Extra argument for the target application (repeatable)
    #[arg(long = "app-arg", allow_hyphen_values = true)]
    pub app_args: Vec<String>,

    /// Directory the target and the executor run in
    #[arg(long, env = "HARNESS_WORKING_DIR", default_value = ".")]
    pub working_dir: PathBuf,

    /// Directory holding the notebooks
    #[arg(long, default_value = "notebooks")]
    pub notebook_dir: PathBuf,

    /// Directory the rendered reports are written to
    #[arg(long, default_value = ".")]
    pub report_dir: PathBuf,

    /// Notebook executor program (invoked as `<executor> nbconvert ...`)
    #[arg(long, env = "HARNESS_EXECUTOR", default_value = "jupyter")]
    pub executor: String,

    /// Application log audited after the run and dumped on failure
    #[arg(long, default_value = "qudi.log")]
    pub app_log: PathBuf,

    /// Crash log dumped on failure when present
    #[arg(long, default_value = "crash.log")]
    pub crash_log: PathBuf,

    /// Seconds to wait after launch before the first liveness check
    #[arg(long, default_value = "10")]
    pub startup_grace_secs: u64,

    /// Seconds to wait after the shutdown notebook before verifying termination
    #[arg(long, default_value = "20")]
    pub shutdown_grace_secs: u64,

    /// How a stderr marker in a report maps to pass/fail (strict, legacy)
    #[arg(long, env = "HARNESS_MARKER_POLICY", default_value = "strict")]
    pub marker_policy: MarkerPolicy,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn into_config(self) -> HarnessConfig {
        let mut config = HarnessConfig::builder()
            .target(TargetConfig {
                interpreter: self.interpreter,
                entry: self.app_entry,
                args: self.app_args,
            })
            .working_dir(self.working_dir)
            .notebook_dir(self.notebook_dir)
            .report_dir(self.report_dir)
            .executor(self.executor)
            .app_log(self.app_log)
            .crash_log(self.crash_log)
            .startup_grace(Duration::from_secs(self.startup_grace_secs))
            .shutdown_grace(Duration::from_secs(self.shutdown_grace_secs))
            .marker_policy(self.marker_policy)
            .log_level(self.log_level)
            .build();
        config.summary_json = self.summary_json;
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Values from .env only fill in variables that are not already set
    let _ = dotenv::dotenv();
    let args = Args::parse();

    shared::logging::init_tracing_with_level(Some(&args.log_level));

    let code = match run(args.into_config(), &mut std::io::stderr()).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("❌ {:#}", e);
            FATAL_EXIT_CODE
        }
    };
    std::process::exit(code);
}

/// Run once; on a fatal outcome both logs are dumped to `log_out`
async fn run<W: Write>(config: HarnessConfig, log_out: &mut W) -> anyhow::Result<i32> {
    let harness = Harness::new(
        config.clone(),
        RealProcessLauncher::new(config.target.clone(), config.working_dir.clone()),
        RealNotebookExecutor::new(config.executor.clone(), config.report_dir_path(), config.working_dir.clone()),
        RealFileSystem::new(),
    )
    .context("invalid harness configuration")?;

    let outcome = harness.run().await;

    if let RunOutcome::Fatal { logs, .. } = &outcome {
        logs.write_to(log_out)
            .context("failed to dump application logs")?;
    }

    if let Some(path) = &config.summary_json {
        if let Err(e) = outcome.summary().write_json(path).await {
            tracing::warn!("⚠️ Could not write run summary: {}", e);
        }
    }

    Ok(outcome.exit_code())
}
