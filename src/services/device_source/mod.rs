mod evdev_source;
mod record_source;
mod r#trait;

pub use self::evdev_source::EvdevSource;
pub use self::record_source::RecordSource;
pub use self::r#trait::{poll_next_event, DeviceSource, Polled};

use crate::config::InputConfig;
use crate::error::Result;
use crate::utils::{permissions, DeviceFinder};
use std::path::Path;

/// Factory function to create the event source: a replay file if given,
/// otherwise the mouse found by capability probing
pub async fn create_device_source(
    input: &InputConfig,
    replay: Option<&Path>,
) -> Result<Box<dyn DeviceSource>> {
    if let Some(path) = replay {
        return Ok(Box::new(RecordSource::open(path).await?));
    }

    permissions::check_input_devices_access()?;
    let (path, device) = DeviceFinder::find_mouse_device(&input.device_path)?;
    Ok(Box::new(EvdevSource::new(path, device)?))
}
