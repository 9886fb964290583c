//! Harness-specific error types

use shared::SharedError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Failed to launch target application `{command}`: {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run notebook executor for {}: {source}", .notebook.display())]
    ExecutorFailed {
        notebook: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File system operation failed: {operation} on {}", .path.display())]
    FileSystemError {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Signal delivery to pid {pid} failed: {message}")]
    SignalError { pid: u32, message: String },

    #[error("Target process has no pid (already reaped)")]
    MissingPid,

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
