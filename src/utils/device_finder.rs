use crate::error::{Result, ShortcutError};
use evdev::{AttributeSetRef, Device, EventType};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const INPUT_DIR: &str = "/dev/input";

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти мышь: указанный путь или автопоиск среди /dev/input/eventN
    pub fn find_mouse_device(device_path: &str) -> Result<(PathBuf, Device)> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            let device = Device::open(&path).map_err(|e| {
                ShortcutError::DeviceNotFound(format!(
                    "Не удалось открыть указанное устройство {:?}: {}",
                    path, e
                ))
            })?;

            if !Self::has_mouse_capabilities(device.supported_events()) {
                warn!(
                    "Устройство {:?} не сообщает одновременно EV_REL и EV_KEY, используем как указано",
                    path
                );
            }
            info!("Используется указанное устройство: {:?}", path);
            return Ok((path, device));
        }

        Self::auto_find_mouse(Path::new(INPUT_DIR))
    }

    fn auto_find_mouse(input_dir: &Path) -> Result<(PathBuf, Device)> {
        info!("Начинаем автопоиск мыши в {:?}...", input_dir);

        for device_path in Self::event_devices(input_dir)? {
            debug!("Проверяем устройство: {:?}", device_path);

            let device = match Device::open(&device_path) {
                Ok(device) => device,
                Err(e) => {
                    warn!("Не удалось открыть {:?}: {}", device_path, e);
                    continue;
                }
            };

            if Self::has_mouse_capabilities(device.supported_events()) {
                info!(
                    "Найдена мышь: {:?} ({})",
                    device_path,
                    device.name().unwrap_or("Unknown")
                );
                return Ok((device_path, device));
            }
        }

        ShortcutError::device_not_found(
            "Не найдено ни одного устройства с поддержкой EV_REL и EV_KEY. \
             Убедитесь, что пользователь добавлен в группу 'input'",
        )
    }

    /// eventN в порядке возрастания номера (event2 раньше event10)
    fn event_devices(input_dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(input_dir).map_err(|e| {
            ShortcutError::Permission(format!("Нет доступа к {:?}: {}", input_dir, e))
        })?;

        let mut event_devices: Vec<(u32, PathBuf)> = Vec::new();

        for entry in entries {
            let path = entry?.path();
            if let Some(index) = Self::event_index(&path) {
                event_devices.push((index, path));
            }
        }

        event_devices.sort_by_key(|(index, _)| *index);

        Ok(event_devices.into_iter().map(|(_, path)| path).collect())
    }

    fn event_index(path: &Path) -> Option<u32> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("event"))
            .and_then(|n| n.parse().ok())
    }

    /// Относительное перемещение и кнопки - типичная сигнатура мыши
    pub fn has_mouse_capabilities(events: &AttributeSetRef<EventType>) -> bool {
        events.contains(EventType::RELATIVE) && events.contains(EventType::KEY)
    }
}
