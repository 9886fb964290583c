//! Notebook smoke-test harness
//!
//! Starts a long-running target application, executes a diagnostic notebook,
//! a fixed battery of test notebooks and a shutdown notebook against it, and
//! checks after every step that the target is still (or, at the end, no
//! longer) running.
//!
//! ## Outcome
//!
//! A completed run exits with the number of soft failures: test notebooks
//! judged failing plus at most one for timestamped `error` lines in the
//! application log. Any fatal condition (target not starting, dying
//! mid-run or surviving shutdown) exits with 1 after dumping the
//! application and crash logs.
//!
//! ```rust,ignore
//! use harness::*;
//!
//! let config = HarnessConfig::builder().interpreter("python3").build();
//! let harness = Harness::new(
//!     config.clone(),
//!     RealProcessLauncher::new(config.target.clone(), config.working_dir.clone()),
//!     RealNotebookExecutor::new(config.executor.clone(), config.report_dir_path(), config.working_dir.clone()),
//!     RealFileSystem::new(),
//! )?;
//! let outcome = harness.run().await;
//! std::process::exit(outcome.exit_code());
//! ```

pub mod config;
pub mod core;
pub mod error;
mod harness;
pub mod services;
pub mod state;
pub mod traits;

// Re-export commonly used types
pub use config::{HarnessConfig, HarnessConfigBuilder, TargetConfig};
pub use crate::core::{AuditResult, FatalReason, LogDump, RunOutcome};
pub use error::{HarnessError, HarnessResult};
pub use harness::Harness;
pub use services::{RealFileSystem, RealNotebookExecutor, RealProcessLauncher};
pub use state::{NotebookRecord, RunCounters, RunSummary};
pub use traits::{ExecutionReport, FileSystem, NotebookExecutor, ProcessLauncher, TargetProcess};

// Mocks are part of the public API so integration tests can inject them
pub use traits::{MockFileSystem, MockNotebookExecutor, MockProcessLauncher, MockTargetProcess};
