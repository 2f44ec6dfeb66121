use crate::error::{Result, ShortcutError};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::info;

/// Проверить доступ к /dev/input перед поиском мыши
pub fn check_input_devices_access() -> Result<()> {
    let input_dir = "/dev/input";

    if !Path::new(input_dir).exists() {
        return Err(ShortcutError::Permission(format!(
            "Директория {} не существует",
            input_dir
        )));
    }

    match fs::read_dir(input_dir) {
        Ok(_) => {
            info!("Доступ к {} подтвержден", input_dir);
            Ok(())
        }
        Err(e) => Err(ShortcutError::Permission(format!(
            "Нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            input_dir, e
        ))),
    }
}

/// Оболочка для команд должна существовать и быть исполняемой
pub fn check_shell(shell: &Path) -> Result<()> {
    let metadata = fs::metadata(shell).map_err(|e| {
        ShortcutError::Permission(format!("Оболочка {} недоступна: {}", shell.display(), e))
    })?;

    if !metadata.is_file() || metadata.permissions().mode() & 0o111 == 0 {
        return Err(ShortcutError::Permission(format!(
            "{} не является исполняемым файлом",
            shell.display()
        )));
    }

    info!("Команды будут запускаться через {}", shell.display());
    Ok(())
}
