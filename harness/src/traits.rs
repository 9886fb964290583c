//! Trait definitions with mockall annotations for testing
//!
//! The harness talks to the outside world through these seams: the target
//! application process, the external notebook executor and the file system.
//! Real implementations live in `services`; tests drive the harness with the
//! generated mocks.

use std::path::{Path, PathBuf};

use crate::error::HarnessResult;

/// What the notebook executor left behind for one notebook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Notebook that was executed
    pub notebook: PathBuf,
    /// Rendered report the executor was asked to write
    pub report_path: PathBuf,
    /// Executor exit code, `None` when it was killed by a signal
    pub exit_code: Option<i32>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Handle to the running target application
#[mockall::automock]
#[async_trait::async_trait]
pub trait TargetProcess: Send {
    /// OS process id captured at launch
    fn pid(&self) -> Option<u32>;

    /// Non-destructive liveness probe; never changes the process state
    fn is_alive(&mut self) -> bool;

    /// Send a termination request
    ///
    /// # Returns
    /// `true` if the signal was delivered (the process was still running),
    /// `false` if there was no process left to signal
    fn signal_terminate(&mut self) -> HarnessResult<bool>;

    /// Wait for the process to exit and reap it
    ///
    /// # Returns
    /// The exit code, `None` when the process was terminated by a signal
    async fn wait(&mut self) -> HarnessResult<Option<i32>>;
}

/// Starts the target application
#[mockall::automock]
#[async_trait::async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Launch the target application detached from the harness
    async fn launch(&self) -> HarnessResult<Box<dyn TargetProcess>>;
}

/// External notebook execution tool
#[mockall::automock]
#[async_trait::async_trait]
pub trait NotebookExecutor: Send + Sync {
    /// Execute a notebook and render it to a report
    ///
    /// Blocks until the executor exits; its exit status is reported, not judged.
    async fn execute(&self, notebook: &Path) -> HarnessResult<ExecutionReport>;
}

/// Access to the files the harness inspects
#[mockall::automock]
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync {
    /// Read a text file, `None` if it does not exist
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    async fn read_optional(&self, path: &Path) -> HarnessResult<Option<String>>;

    /// Delete a file if present
    ///
    /// # Returns
    /// `true` if a file was removed
    async fn remove_if_exists(&self, path: &Path) -> HarnessResult<bool>;
}
