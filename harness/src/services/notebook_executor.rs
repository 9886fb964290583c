//! Real notebook executor
//!
//! Shells out to `jupyter nbconvert --execute --to html`, which renders the
//! executed notebook next to the other reports as `<stem>.html`.

use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::error::{HarnessError, HarnessResult};
use crate::traits::{ExecutionReport, NotebookExecutor};

pub struct RealNotebookExecutor {
    program: String,
    report_dir: PathBuf,
    working_dir: PathBuf,
}

impl RealNotebookExecutor {
    pub fn new(program: String, report_dir: PathBuf, working_dir: PathBuf) -> Self {
        Self {
            program,
            report_dir,
            working_dir,
        }
    }

    /// Where the rendered report for `notebook` ends up
    pub fn report_path(&self, notebook: &Path) -> PathBuf {
        let stem = notebook
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| OsString::from("notebook"));
        let mut file_name = stem;
        file_name.push(".html");
        self.report_dir.join(file_name)
    }

    /// Arguments handed to the executor program
    ///
    /// The executor runs inside the working directory while the configured
    /// paths are relative to the harness, so both paths are made absolute.
    pub fn to_args(&self, notebook: &Path) -> io::Result<Vec<OsString>> {
        Ok(vec![
            OsString::from("nbconvert"),
            OsString::from("--execute"),
            OsString::from("--to"),
            OsString::from("html"),
            OsString::from("--output-dir"),
            std::path::absolute(&self.report_dir)?.into_os_string(),
            std::path::absolute(notebook)?.into_os_string(),
        ])
    }
}

#[async_trait]
impl NotebookExecutor for RealNotebookExecutor {
    async fn execute(&self, notebook: &Path) -> HarnessResult<ExecutionReport> {
        tracing::debug!(notebook = %notebook.display(), "📓 Executing via {}", self.program);

        let executor_failed = |source| HarnessError::ExecutorFailed {
            notebook: notebook.to_path_buf(),
            source,
        };
        let args = self.to_args(notebook).map_err(executor_failed)?;

        let status = Command::new(&self.program)
            .args(args)
            .current_dir(&self.working_dir)
            .status()
            .await
            .map_err(executor_failed)?;

        if !status.success() {
            tracing::warn!(notebook = %notebook.display(), "⚠️ Executor exited with {}", status);
        }

        Ok(ExecutionReport {
            notebook: notebook.to_path_buf(),
            report_path: self.report_path(notebook),
            exit_code: status.code(),
        })
    }
}
