use std::process::ExitCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShortcutError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Системный вызов завершился ошибкой: {0}")]
    Sys(#[from] nix::errno::Errno),

    #[error("Ошибка файла ярлыков: {0}")]
    Shortcuts(String),

    #[error("Ошибка перехода в фоновый режим: {0}")]
    Daemonize(String),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Не удалось запустить команду '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Фатальная ошибка ожидания событий: {0}")]
    Poll(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl ShortcutError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(ShortcutError::DeviceNotFound(msg.into()))
    }

    /// Код завершения процесса для стартовых и фатальных ошибок
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    fn exit_status(&self) -> u8 {
        match self {
            ShortcutError::Config(_) => 1,
            ShortcutError::Daemonize(_) => 2,
            ShortcutError::Shortcuts(_) => 3,
            ShortcutError::DeviceNotFound(_) | ShortcutError::Permission(_) => 4,
            ShortcutError::Poll(_) => 5,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShortcutError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! shortcut_error {
    (shortcuts, $($arg:tt)*) => {
        $crate::error::ShortcutError::Shortcuts(format!($($arg)*))
    };
    (daemonize, $($arg:tt)*) => {
        $crate::error::ShortcutError::Daemonize(format!($($arg)*))
    };
    (device_not_found, $($arg:tt)*) => {
        $crate::error::ShortcutError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::ShortcutError::Permission(format!($($arg)*))
    };
    (poll, $($arg:tt)*) => {
        $crate::error::ShortcutError::Poll(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::ShortcutError::Internal(format!($($arg)*))
    };
}
