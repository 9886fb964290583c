//! Error-marker detection in rendered notebook reports
//!
//! nbconvert renders captured stderr as `<div class="output_subarea output_stream output_stderr ...">`.
//! A report is scanned line by line, like `grep '<div.*output_stderr'` would.

use regex::Regex;

use crate::error::HarnessResult;

/// Pattern marking stderr-class output in an HTML report
pub const STDERR_MARKER_PATTERN: &str = r"<div.*output_stderr";

/// Lines of a report that carry the stderr marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerScan {
    pub lines: Vec<String>,
}

impl MarkerScan {
    pub fn found(&self) -> bool {
        !self.lines.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MarkerScanner {
    pattern: Regex,
}

impl MarkerScanner {
    pub fn new() -> HarnessResult<Self> {
        Self::with_pattern(STDERR_MARKER_PATTERN)
    }

    pub fn with_pattern(pattern: &str) -> HarnessResult<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn scan(&self, report: &str) -> MarkerScan {
        let lines = report
            .lines()
            .filter(|line| self.pattern.is_match(line))
            .map(|line| line.trim().to_string())
            .collect();
        MarkerScan { lines }
    }
}
