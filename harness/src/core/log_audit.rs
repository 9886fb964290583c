//! Post-run audit of the application's own log

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::HarnessResult;

/// `YYYY-MM-DD HH:MM:SS error`, case-sensitive
pub const LOG_ERROR_PATTERN: &str = r"\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} error";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    /// False when the log file did not exist
    pub log_present: bool,
    pub error_lines: Vec<String>,
}

impl AuditResult {
    pub fn has_errors(&self) -> bool {
        !self.error_lines.is_empty()
    }

    /// Contribution to the failure count: at most one per run
    pub fn failure_increment(&self) -> u32 {
        u32::from(self.has_errors())
    }
}

#[derive(Debug, Clone)]
pub struct LogAuditor {
    pattern: Regex,
}

impl LogAuditor {
    pub fn new() -> HarnessResult<Self> {
        Ok(Self {
            pattern: Regex::new(LOG_ERROR_PATTERN)?,
        })
    }

    pub fn audit(&self, log: Option<&str>) -> AuditResult {
        match log {
            None => AuditResult::default(),
            Some(content) => AuditResult {
                log_present: true,
                error_lines: content
                    .lines()
                    .filter(|line| self.pattern.is_match(line))
                    .map(str::to_string)
                    .collect(),
            },
        }
    }
}
