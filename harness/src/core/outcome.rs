//! Run outcomes and exit-code mapping

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use crate::error::HarnessError;
use crate::state::RunSummary;

/// Exit status for every fatal path
pub const FATAL_EXIT_CODE: i32 = 1;

/// Highest exit status a completed run reports
pub const MAX_EXIT_CODE: u32 = 255;

/// Why a run was aborted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FatalReason {
    /// Target not alive after the startup grace period
    StartupFailed { pid: Option<u32> },
    /// Target died while (or after) a notebook was executed
    TargetDied { notebook: PathBuf },
    /// Target still accepted a termination signal after the shutdown grace period
    SurvivedShutdown { pid: Option<u32> },
    /// The harness itself could not carry on (spawn or I/O failure)
    Infrastructure { message: String },
}

impl FatalReason {
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, FatalReason::Infrastructure { .. })
    }
}

impl From<HarnessError> for FatalReason {
    fn from(error: HarnessError) -> Self {
        FatalReason::Infrastructure {
            message: error.to_string(),
        }
    }
}

impl fmt::Display for FatalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalReason::StartupFailed { pid } => {
                write!(f, "target application (pid {}) is not running after startup", display_pid(*pid))
            }
            FatalReason::TargetDied { notebook } => {
                write!(f, "target application died while running {}", notebook.display())
            }
            FatalReason::SurvivedShutdown { pid } => write!(
                f,
                "target application (pid {}) was still running after the shutdown notebook",
                display_pid(*pid)
            ),
            FatalReason::Infrastructure { message } => write!(f, "harness failure: {message}"),
        }
    }
}

fn display_pid(pid: Option<u32>) -> String {
    pid.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string())
}

/// Log contents collected on a fatal path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogDump {
    pub app_log: Option<String>,
    pub crash_log: Option<String>,
}

impl LogDump {
    /// Write both logs verbatim; a missing crash log is skipped silently
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        match &self.app_log {
            Some(content) => {
                out.write_all(content.as_bytes())?;
                // Keep the crash log's first line off the app log's last line
                if self.crash_log.is_some() && !content.is_empty() && !content.ends_with('\n') {
                    writeln!(out)?;
                }
            }
            None => writeln!(out, "(application log not found)")?,
        }
        if let Some(content) = &self.crash_log {
            out.write_all(content.as_bytes())?;
        }
        out.flush()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunSummary),
    Fatal {
        reason: FatalReason,
        logs: LogDump,
        summary: RunSummary,
    },
}

impl RunOutcome {
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunOutcome::Completed(summary) => summary,
            RunOutcome::Fatal { summary, .. } => summary,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RunOutcome::Fatal { .. })
    }

    /// Process exit status: the soft failure count, or 1 on any fatal path
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed(summary) => exit_code_for_failures(summary.counters.failed),
            RunOutcome::Fatal { .. } => FATAL_EXIT_CODE,
        }
    }
}

/// Saturates so that a positive count never wraps to success
pub fn exit_code_for_failures(failed: u32) -> i32 {
    failed.min(MAX_EXIT_CODE) as i32
}
