use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SETTINGS_PATH: &str = "/etc/mouse_shortcuts.toml";
pub const DEFAULT_SHORTCUTS_PATH: &str = "/etc/mouse_shortcuts.conf";
pub const ENV_PREFIX: &str = "MOUSE_SHORTCUTS_";

/// Настройки самого демона. Таблица ярлыков живёт в отдельном файле,
/// см. `mappings::ShortcutTable`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub session: SessionConfig,
    pub shortcuts: ShortcutsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InputConfig {
    pub device_path: String,
    /// Периодическое пробуждение цикла для сбора завершённых команд.
    /// `None` - ждать события устройства без ограничения.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShortcutsConfig {
    pub path: PathBuf,
    pub shell: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            input: InputConfig {
                device_path: "auto".to_string(),
                poll_interval_ms: None,
            },
            session: SessionConfig { timeout_secs: 2 },
            shortcuts: ShortcutsConfig {
                path: PathBuf::from(DEFAULT_SHORTCUTS_PATH),
                shell: PathBuf::from("/bin/sh"),
            },
        }
    }
}

impl Settings {
    /// Загрузка: значения по умолчанию -> TOML (файла может не быть) -> окружение.
    pub fn load<P: AsRef<Path>>(settings_path: P) -> Result<Self> {
        let settings_path = settings_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(settings_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let settings: Settings = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить настройки из {:?}", settings_path))?;

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.input.device_path.is_empty() {
            anyhow::bail!("device_path не может быть пустым (используйте \"auto\")");
        }

        if self.input.poll_interval_ms == Some(0) {
            anyhow::bail!("poll_interval_ms должно быть больше 0");
        }

        if self.session.timeout_secs == 0 {
            anyhow::bail!("timeout_secs должно быть больше 0");
        }

        if self.shortcuts.path.as_os_str().is_empty() {
            anyhow::bail!("Не указан путь к файлу ярлыков");
        }

        if self.shortcuts.shell.as_os_str().is_empty() {
            anyhow::bail!("Не указана оболочка для запуска команд");
        }

        Ok(())
    }

    /// Демон делает chdir("/"), поэтому относительные пути фиксируются заранее.
    pub fn absolutize_paths(&mut self) -> Result<()> {
        let cwd = std::env::current_dir().context("Не удалось определить текущий каталог")?;

        if self.shortcuts.path.is_relative() {
            self.shortcuts.path = cwd.join(&self.shortcuts.path);
        }
        if self.input.device_path != "auto" && Path::new(&self.input.device_path).is_relative() {
            self.input.device_path = cwd.join(&self.input.device_path).display().to_string();
        }

        Ok(())
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session.timeout_secs)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.input.poll_interval_ms.map(Duration::from_millis)
    }
}
