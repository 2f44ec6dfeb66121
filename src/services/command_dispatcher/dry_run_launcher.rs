use crate::error::Result;
use tracing::info;

use super::r#trait::{ChildHandle, ChildStatus, CommandLauncher};

/// Ничего не запускает, только пишет в лог, что было бы выполнено
pub struct DryRunLauncher {
    next_id: u32,
}

impl DryRunLauncher {
    pub fn new() -> Self {
        info!("Инициализация DryRunLauncher");
        Self { next_id: 1 }
    }
}

impl Default for DryRunLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandLauncher for DryRunLauncher {
    fn launch(&mut self, command: &str) -> Result<ChildHandle> {
        info!("[DRY RUN] Команда: {}", command);

        let handle = ChildHandle::new(self.next_id, command);
        self.next_id = self.next_id.wrapping_add(1);
        Ok(handle)
    }

    fn poll(&mut self, _child: &ChildHandle) -> Result<ChildStatus> {
        Ok(ChildStatus::Exited(0))
    }
}
