use crate::error::Result;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

/// A launched shortcut command, owned by the dispatcher until it is reaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildHandle {
    pub pid: u32,
    pub command: String,
    pub launched_at: Instant,
}

impl ChildHandle {
    pub fn new(pid: u32, command: impl Into<String>) -> Self {
        Self {
            pid,
            command: command.into(),
            launched_at: Instant::now(),
        }
    }
}

impl fmt::Display for ChildHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.pid, self.command)
    }
}

/// Non-blocking status of a launched child
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildStatus {
    StillRunning,
    Exited(i32),
    Signaled { signal: String, core_dumped: bool },
    Stopped(String),
    Continued,
    /// The OS no longer reports this pid as our child
    Lost,
}

impl ChildStatus {
    /// The child is gone and its handle can be dropped
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChildStatus::Exited(_) | ChildStatus::Signaled { .. } | ChildStatus::Lost
        )
    }
}

/// Trait for launchers that can run shortcut commands in different modes
pub trait CommandLauncher: Send {
    /// Start `command` without waiting for it
    fn launch(&mut self, command: &str) -> Result<ChildHandle>;

    /// Check a launched child without blocking
    fn poll(&mut self, child: &ChildHandle) -> Result<ChildStatus>;
}

/// Factory function to create an appropriate launcher based on the dry_run flag
pub fn create_launcher(shell: PathBuf, dry_run: bool) -> Box<dyn CommandLauncher> {
    if dry_run {
        Box::new(super::dry_run_launcher::DryRunLauncher::new())
    } else {
        Box::new(super::shell_launcher::ShellLauncher::new(shell))
    }
}
