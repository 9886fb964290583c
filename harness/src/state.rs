//! Run state owned by the harness driver
//!
//! Counters and per-notebook records live here instead of in ambient globals;
//! only the sequential driver mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{MarkerPolicy, Stage, Verdict};
use std::path::{Path, PathBuf};

use crate::core::AuditResult;
use crate::error::{HarnessError, HarnessResult};

/// Pass/fail accounting
///
/// `failed <= total` does not hold in general: the log audit may add one
/// failure on top of the notebook verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub total: u32,
    pub failed: u32,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&mut self) {
        self.total += 1;
    }

    pub fn record_verdict(&mut self, verdict: Verdict) {
        if verdict.is_failure() {
            self.failed += 1;
        }
    }

    pub fn record_audit(&mut self, audit: &AuditResult) {
        self.failed += audit.failure_increment();
    }
}

/// What happened to one notebook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookRecord {
    pub notebook: PathBuf,
    pub stage: Stage,
    pub report_path: PathBuf,
    pub executor_exit_code: Option<i32>,
    /// Only judged (battery) notebooks get a verdict
    pub verdict: Option<Verdict>,
    pub marker_lines: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    pub started_at: DateTime<Utc>,
    pub marker_policy: MarkerPolicy,
    pub counters: RunCounters,
    pub notebooks: Vec<NotebookRecord>,
    pub audit: Option<AuditResult>,
    pub target_pid: Option<u32>,
    pub target_exit_code: Option<i32>,
}

impl RunState {
    pub fn new(marker_policy: MarkerPolicy) -> Self {
        Self {
            started_at: Utc::now(),
            marker_policy,
            counters: RunCounters::new(),
            notebooks: Vec::new(),
            audit: None,
            target_pid: None,
            target_exit_code: None,
        }
    }

    pub fn record_notebook(&mut self, record: NotebookRecord) {
        if let Some(verdict) = record.verdict {
            self.counters.record_verdict(verdict);
        }
        self.notebooks.push(record);
    }

    pub fn record_audit(&mut self, audit: AuditResult) {
        self.counters.record_audit(&audit);
        self.audit = Some(audit);
    }

    pub fn into_summary(self, outcome: &str, fatal_reason: Option<String>, exit_code: i32) -> RunSummary {
        RunSummary {
            started_at: self.started_at,
            finished_at: Utc::now(),
            marker_policy: self.marker_policy,
            counters: self.counters,
            notebooks: self.notebooks,
            audit: self.audit,
            target_pid: self.target_pid,
            target_exit_code: self.target_exit_code,
            outcome: outcome.to_string(),
            fatal_reason,
            exit_code,
        }
    }
}

/// Machine-readable record of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub marker_policy: MarkerPolicy,
    pub counters: RunCounters,
    pub notebooks: Vec<NotebookRecord>,
    pub audit: Option<AuditResult>,
    pub target_pid: Option<u32>,
    pub target_exit_code: Option<i32>,
    /// `completed` or `fatal`
    pub outcome: String,
    pub fatal_reason: Option<String>,
    pub exit_code: i32,
}

impl RunSummary {
    /// Names of the battery notebooks judged as failing
    pub fn failed_notebooks(&self) -> Vec<&Path> {
        self.notebooks
            .iter()
            .filter(|record| record.verdict == Some(Verdict::Fail))
            .map(|record| record.notebook.as_path())
            .collect()
    }

    pub async fn write_json(&self, path: &Path) -> HarnessResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| HarnessError::FileSystemError {
                operation: "write summary".to_string(),
                path: path.to_path_buf(),
                source,
            })
    }
}
