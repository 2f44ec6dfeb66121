//! Переход в фоновый режим.
//!
//! Вызывается до создания tokio runtime и до инициализации логирования:
//! после fork() в процессе не должно быть других потоков.

use crate::error::Result;
use crate::shortcut_error;
use nix::fcntl::{open, OFlag};
use nix::sys::resource::{getrlimit, Resource};
use nix::sys::stat::{umask, Mode};
use nix::unistd::{chdir, close, dup2, fork, setsid, ForkResult};
use std::os::unix::io::RawFd;

/// Верхняя граница перебора при закрытии унаследованных дескрипторов
const MAX_CLOSED_FDS: u64 = 4096;

pub fn daemonize() -> Result<()> {
    // SAFETY: вызывается из main до запуска каких-либо потоков
    match unsafe { fork() } {
        Ok(ForkResult::Parent { .. }) => std::process::exit(0),
        Ok(ForkResult::Child) => {}
        Err(e) => return Err(shortcut_error!(daemonize, "fork: {}", e)),
    }

    setsid().map_err(|e| shortcut_error!(daemonize, "setsid: {}", e))?;
    chdir("/").map_err(|e| shortcut_error!(daemonize, "chdir(\"/\"): {}", e))?;

    close_inherited_descriptors();
    let _ = umask(Mode::empty());
    redirect_std_streams()?;

    Ok(())
}

fn descriptor_limit() -> RawFd {
    let soft = getrlimit(Resource::RLIMIT_NOFILE)
        .map(|(soft, _)| soft)
        .unwrap_or(MAX_CLOSED_FDS);
    soft.min(MAX_CLOSED_FDS) as RawFd
}

fn close_inherited_descriptors() {
    for fd in 0..descriptor_limit() {
        // EBADF для незанятых номеров ожидаем
        let _ = close(fd);
    }
}

/// stdin/stdout/stderr -> /dev/null, их унаследуют и запускаемые команды
fn redirect_std_streams() -> Result<()> {
    let null = open("/dev/null", OFlag::O_RDWR, Mode::empty())
        .map_err(|e| shortcut_error!(daemonize, "open(/dev/null): {}", e))?;

    for target in 0..=2 {
        if null != target {
            dup2(null, target).map_err(|e| shortcut_error!(daemonize, "dup2({}): {}", target, e))?;
        }
    }
    if null > 2 {
        let _ = close(null);
    }

    Ok(())
}
