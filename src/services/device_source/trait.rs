use crate::error::{Result, ShortcutError};
use crate::events::RawInputEvent;
use std::io;
use std::time::Duration;

/// Outcome of a single wait on a device source. Fatal errors are the `Err` arm.
#[derive(Debug)]
pub enum Polled {
    Event(RawInputEvent),
    /// Interrupted or spurious wakeup, just wait again
    Retry,
    /// The optional poll interval elapsed without input
    TimedOut,
    /// A single read failed; the source is still usable
    ReadFailed(io::Error),
    /// No more input will ever arrive (end of a replay file)
    Closed,
}

/// Trait for sources of raw input events
#[async_trait::async_trait]
pub trait DeviceSource: Send {
    /// Wait for the next event without a time limit
    async fn next_event(&mut self) -> Result<Polled>;

    /// Human readable description for logs
    fn describe(&self) -> String;
}

/// Wait for the next event, optionally bounded by `timeout`
pub async fn poll_next_event(
    source: &mut (dyn DeviceSource + '_),
    timeout: Option<Duration>,
) -> Result<Polled> {
    match timeout {
        None => source.next_event().await,
        Some(limit) => match tokio::time::timeout(limit, source.next_event()).await {
            Ok(polled) => polled,
            Err(_) => Ok(Polled::TimedOut),
        },
    }
}

/// Sort a failed read into retry / recoverable / fatal
pub(super) fn classify_read_error(e: io::Error) -> Result<Polled> {
    match e.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(Polled::Retry),
        _ if e.raw_os_error() == Some(nix::libc::ENODEV) => Err(ShortcutError::Poll(format!(
            "устройство отключено: {}",
            e
        ))),
        _ => Ok(Polled::ReadFailed(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_read_is_retried() {
        let polled = classify_read_error(io::Error::from(io::ErrorKind::Interrupted));
        assert!(matches!(polled, Ok(Polled::Retry)));

        let polled = classify_read_error(io::Error::from(io::ErrorKind::WouldBlock));
        assert!(matches!(polled, Ok(Polled::Retry)));
    }

    #[test]
    fn test_vanished_device_is_fatal() {
        let polled = classify_read_error(io::Error::from_raw_os_error(nix::libc::ENODEV));
        assert!(matches!(polled, Err(ShortcutError::Poll(_))));
    }

    #[test]
    fn test_other_read_errors_are_recoverable() {
        let polled = classify_read_error(io::Error::from_raw_os_error(nix::libc::EIO));
        assert!(matches!(polled, Ok(Polled::ReadFailed(_))));
    }
}
