//! Harness Configuration Builder
//!
//! Provides a flexible builder pattern for constructing harness configurations

use super::{HarnessConfig, TargetConfig};
use shared::MarkerPolicy;
use std::path::PathBuf;
use std::time::Duration;

pub struct HarnessConfigBuilder {
    config: HarnessConfig,
}

impl HarnessConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: HarnessConfig::default(),
        }
    }

    /// Set the whole target launch description
    pub fn target(mut self, target: TargetConfig) -> Self {
        self.config.target = target;
        self
    }

    /// Set the interpreter used to start the target application
    pub fn interpreter<S: Into<String>>(mut self, interpreter: S) -> Self {
        self.config.target.interpreter = interpreter.into();
        self
    }

    /// Set the entry script of the target application
    pub fn app_entry<S: Into<String>>(mut self, entry: S) -> Self {
        self.config.target.entry = entry.into();
        self
    }

    /// Append extra arguments for the target application
    pub fn app_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.target.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.working_dir = dir.into();
        self
    }

    pub fn notebook_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.notebook_dir = dir.into();
        self
    }

    pub fn report_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.report_dir = dir.into();
        self
    }

    /// Set the notebook executor program
    pub fn executor<S: Into<String>>(mut self, executor: S) -> Self {
        self.config.executor = executor.into();
        self
    }

    /// Replace the ordered list of test notebooks
    pub fn battery<I, S>(mut self, notebooks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.battery = notebooks.into_iter().map(Into::into).collect();
        self
    }

    pub fn app_log<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.app_log = path.into();
        self
    }

    pub fn crash_log<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.crash_log = path.into();
        self
    }

    /// Set how long to wait after launching before the first liveness probe
    pub fn startup_grace(mut self, grace: Duration) -> Self {
        self.config.startup_grace = grace;
        self
    }

    /// Set how long to wait after the shutdown notebook before verifying termination
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace = grace;
        self
    }

    /// Zero both grace periods (tests)
    pub fn no_grace(self) -> Self {
        self.startup_grace(Duration::ZERO).shutdown_grace(Duration::ZERO)
    }

    pub fn marker_policy(mut self, policy: MarkerPolicy) -> Self {
        self.config.marker_policy = policy;
        self
    }

    pub fn summary_json<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.summary_json = Some(path.into());
        self
    }

    /// Set log level (trace, debug, info, warn, error)
    pub fn log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.config.log_level = level.into();
        self
    }

    pub fn build(self) -> HarnessConfig {
        self.config
    }
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
