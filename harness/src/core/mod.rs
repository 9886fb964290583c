//! Core harness logic
//!
//! Pure judgment rules: report marker scanning, log auditing and outcome mapping.

pub mod log_audit;
pub mod marker;
pub mod outcome;

pub use log_audit::{AuditResult, LogAuditor, LOG_ERROR_PATTERN};
pub use marker::{MarkerScan, MarkerScanner, STDERR_MARKER_PATTERN};
pub use outcome::{exit_code_for_failures, FatalReason, LogDump, RunOutcome, FATAL_EXIT_CODE};
