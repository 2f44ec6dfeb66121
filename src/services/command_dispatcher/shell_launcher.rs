use crate::error::{Result, ShortcutError};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

use super::r#trait::{ChildHandle, ChildStatus, CommandLauncher};

/// Запуск команд через `<shell> -c <команда>`
pub struct ShellLauncher {
    shell: PathBuf,
}

impl ShellLauncher {
    pub fn new(shell: PathBuf) -> Self {
        Self { shell }
    }
}

impl CommandLauncher for ShellLauncher {
    fn launch(&mut self, command: &str) -> Result<ChildHandle> {
        debug!("{} -c {:?}", self.shell.display(), command);

        // Отдельная группа процессов: сигналы терминала демона не трогают команду.
        // Child отбрасывается без wait(), статус собирает poll() через waitpid.
        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|source| ShortcutError::Launch {
                command: command.to_string(),
                source,
            })?;

        Ok(ChildHandle::new(child.id(), command))
    }

    fn poll(&mut self, child: &ChildHandle) -> Result<ChildStatus> {
        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;

        let status = match waitpid(Pid::from_raw(child.pid as i32), Some(flags)) {
            Ok(WaitStatus::StillAlive) => ChildStatus::StillRunning,
            Ok(WaitStatus::Exited(_, code)) => ChildStatus::Exited(code),
            Ok(WaitStatus::Signaled(_, signal, core_dumped)) => ChildStatus::Signaled {
                signal: signal.as_str().to_string(),
                core_dumped,
            },
            Ok(WaitStatus::Stopped(_, signal)) => ChildStatus::Stopped(signal.as_str().to_string()),
            Ok(WaitStatus::Continued(_)) => ChildStatus::Continued,
            Ok(other) => {
                debug!("Неожиданный статус waitpid для {}: {:?}", child, other);
                ChildStatus::StillRunning
            }
            Err(Errno::ECHILD) => ChildStatus::Lost,
            Err(Errno::EINTR) => ChildStatus::StillRunning,
            Err(e) => return Err(ShortcutError::Sys(e)),
        };

        Ok(status)
    }
}
