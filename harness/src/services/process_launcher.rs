//! Real target process management
//!
//! Launches the target application detached from the harness and exposes
//! signal-based liveness probing and termination on the resulting handle.

use async_trait::async_trait;
use shared::{stage_debug, stage_info, Stage};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

use crate::config::TargetConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::traits::{ProcessLauncher, TargetProcess};

/// Launches `<interpreter> <entry> [args...]`
pub struct RealProcessLauncher {
    target: TargetConfig,
    working_dir: PathBuf,
}

impl RealProcessLauncher {
    pub fn new(target: TargetConfig, working_dir: PathBuf) -> Self {
        Self { target, working_dir }
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.target.interpreter);
        cmd.args(self.target.to_args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(false);

        // Own process group: terminal signals aimed at the harness do not reach the target
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
}

#[async_trait]
impl ProcessLauncher for RealProcessLauncher {
    async fn launch(&self) -> HarnessResult<Box<dyn TargetProcess>> {
        let command_line = self.target.command_line();
        stage_debug!(Stage::Startup, "Launching `{}` in {}", command_line, self.working_dir.display());

        let child = self
            .build_command()
            .spawn()
            .map_err(|source| HarnessError::LaunchFailed {
                command: command_line.clone(),
                source,
            })?;

        let process = RealTargetProcess::new(child);
        stage_info!(
            Stage::Startup,
            "🚀 Target application started: `{}` (pid {:?})",
            command_line,
            process.pid()
        );
        Ok(Box::new(process))
    }
}

/// Handle on a spawned target application
pub struct RealTargetProcess {
    child: Child,
    pid: Option<u32>,
    exit_status: Option<ExitStatus>,
}

impl RealTargetProcess {
    pub fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child,
            pid,
            exit_status: None,
        }
    }

    /// Reap the child if it already exited
    fn poll_exit(&mut self) -> bool {
        if self.exit_status.is_some() {
            return true;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!(pid = ?self.pid, "Target process exited with {}", status);
                self.exit_status = Some(status);
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(pid = ?self.pid, "⚠️ Error checking target process status: {}", e);
                false
            }
        }
    }

    /// Signal-0 probe; a zombie still answers, so `poll_exit` runs first
    #[cfg(unix)]
    fn probe(&self) -> bool {
        use nix::errno::Errno;
        use nix::sys::signal;
        use nix::unistd::Pid;

        let Some(pid) = self.pid else {
            return false;
        };
        match signal::kill(Pid::from_raw(pid as i32), None) {
            Ok(()) => true,
            // Exists but belongs to someone else
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }

    #[cfg(not(unix))]
    fn probe(&self) -> bool {
        self.pid.is_some()
    }

    #[cfg(unix)]
    fn send_terminate(&mut self, pid: u32) -> HarnessResult<bool> {
        use nix::errno::Errno;
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(HarnessError::SignalError {
                pid,
                message: e.to_string(),
            }),
        }
    }

    #[cfg(not(unix))]
    fn send_terminate(&mut self, pid: u32) -> HarnessResult<bool> {
        match self.child.start_kill() {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(false),
            Err(e) => Err(HarnessError::SignalError {
                pid,
                message: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl TargetProcess for RealTargetProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn is_alive(&mut self) -> bool {
        if self.poll_exit() {
            return false;
        }
        self.probe()
    }

    fn signal_terminate(&mut self) -> HarnessResult<bool> {
        if self.poll_exit() {
            return Ok(false);
        }
        let pid = self.pid.ok_or(HarnessError::MissingPid)?;
        self.send_terminate(pid)
    }

    async fn wait(&mut self) -> HarnessResult<Option<i32>> {
        if let Some(status) = self.exit_status {
            return Ok(status.code());
        }
        let status = self.child.wait().await?;
        self.exit_status = Some(status);
        Ok(status.code())
    }
}
