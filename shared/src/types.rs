//! Core types shared across the harness

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SharedError;

/// Phase of a harness run, attached to every log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Launching the target and waiting out the startup grace period
    Startup,
    /// Running the fire-and-forget diagnostic notebook
    Diagnostic,
    /// Running the judged test notebooks
    Battery,
    /// Running the shutdown notebook and verifying termination
    Shutdown,
    /// Scanning the application log after a completed run
    Audit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Startup => write!(f, "startup"),
            Stage::Diagnostic => write!(f, "diagnostic"),
            Stage::Battery => write!(f, "battery"),
            Stage::Shutdown => write!(f, "shutdown"),
            Stage::Audit => write!(f, "audit"),
        }
    }
}

/// Outcome of judging a single test notebook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Fail)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// How the presence of the stderr marker in a rendered report maps to a verdict
///
/// `Legacy` reproduces the historical shell harness, whose branch on the
/// marker search was inverted: a report *with* captured stderr passed and a
/// clean report failed. `Strict` is the straightforward reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPolicy {
    /// Marker found ⇒ fail
    #[default]
    Strict,
    /// Marker found ⇒ pass, marker absent ⇒ fail
    Legacy,
}

impl MarkerPolicy {
    /// Decide the verdict for a report that was read successfully
    pub fn verdict(&self, marker_found: bool) -> Verdict {
        match (self, marker_found) {
            (MarkerPolicy::Strict, true) | (MarkerPolicy::Legacy, false) => Verdict::Fail,
            (MarkerPolicy::Strict, false) | (MarkerPolicy::Legacy, true) => Verdict::Pass,
        }
    }
}

impl fmt::Display for MarkerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerPolicy::Strict => write!(f, "strict"),
            MarkerPolicy::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for MarkerPolicy {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(MarkerPolicy::Strict),
            "legacy" => Ok(MarkerPolicy::Legacy),
            _ => Err(SharedError::UnknownMarkerPolicy { input: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_policy_fails_on_marker() {
        assert_eq!(MarkerPolicy::Strict.verdict(true), Verdict::Fail);
        assert_eq!(MarkerPolicy::Strict.verdict(false), Verdict::Pass);
    }

    #[test]
    fn test_legacy_policy_is_inverted() {
        assert_eq!(MarkerPolicy::Legacy.verdict(true), Verdict::Pass);
        assert_eq!(MarkerPolicy::Legacy.verdict(false), Verdict::Fail);
    }

    #[test]
    fn test_marker_policy_parsing() {
        assert_eq!("strict".parse::<MarkerPolicy>().unwrap(), MarkerPolicy::Strict);
        assert_eq!(" Legacy ".parse::<MarkerPolicy>().unwrap(), MarkerPolicy::Legacy);
        assert!(matches!(
            "inverted".parse::<MarkerPolicy>(),
            Err(SharedError::UnknownMarkerPolicy { .. })
        ));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Startup.to_string(), "startup");
        assert_eq!(Stage::Battery.to_string(), "battery");
        assert_eq!(Stage::Audit.to_string(), "audit");
    }
}
