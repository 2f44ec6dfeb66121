use crate::error::{Result, ShortcutError};
use crate::events::RawInputEvent;
use evdev::{Device, EventStream};
use std::path::PathBuf;
use tracing::info;

use super::r#trait::{classify_read_error, DeviceSource, Polled};

/// Чтение событий мыши из /dev/input/eventN через evdev
pub struct EvdevSource {
    path: PathBuf,
    name: String,
    stream: EventStream,
}

impl EvdevSource {
    /// Должен вызываться внутри tokio runtime: поток регистрируется в реакторе
    pub fn new(path: PathBuf, device: Device) -> Result<Self> {
        let name = device.name().unwrap_or("Unknown").to_string();

        info!("Устройство: {} ({})", name, path.display());
        info!("Физический путь: {:?}", device.physical_path());

        let stream = device.into_event_stream().map_err(|e| {
            ShortcutError::Poll(format!(
                "Не удалось подписаться на события {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self { path, name, stream })
    }
}

#[async_trait::async_trait]
impl DeviceSource for EvdevSource {
    async fn next_event(&mut self) -> Result<Polled> {
        match self.stream.next_event().await {
            Ok(event) => Ok(Polled::Event(RawInputEvent::from(&event))),
            Err(e) => classify_read_error(e),
        }
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.name, self.path.display())
    }
}

impl Drop for EvdevSource {
    fn drop(&mut self) {
        info!("Освобождение устройства {}", self.path.display());
    }
}
