//! Таблица ярлыков: число кликов левой кнопкой -> команда оболочки.
//!
//! Формат файла - по одной записи на строку, `<число>:<команда>`.
//! Пустые строки и строки, начинающиеся с `#`, пропускаются. Разделителем
//! служит первое двоеточие, так что в самой команде двоеточия допустимы.

use crate::error::{Result, ShortcutError};
use smallvec::SmallVec;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Сколько записей учитывается из файла; остальные строки игнорируются
pub const MAX_MOUSE_SHORTCUTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutEntry {
    pub trigger_count: u32,
    pub command: String,
}

impl fmt::Display for ShortcutEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.trigger_count, self.command)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShortcutTable {
    entries: SmallVec<[ShortcutEntry; MAX_MOUSE_SHORTCUTS]>,
}

/// Почему строка не попала в таблицу
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineError {
    MissingSeparator,
    BadCount(String),
    EmptyCommand,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::MissingSeparator => write!(f, "нет разделителя ':'"),
            LineError::BadCount(raw) => write!(f, "'{}' не является неотрицательным числом", raw),
            LineError::EmptyCommand => write!(f, "пустая команда"),
        }
    }
}

impl ShortcutTable {
    /// Загрузить таблицу из файла. Пустая таблица - ошибка запуска.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| {
            ShortcutError::Shortcuts(format!("Не удалось прочитать {:?}: {}", path, e))
        })?;

        let table = Self::parse(&content);
        if table.is_empty() {
            return Err(crate::shortcut_error!(
                shortcuts,
                "В {:?} не найдено ни одной записи вида <число>:<команда>",
                path
            ));
        }

        info!("Загружено {} ярлыков из {:?}", table.len(), path);
        for entry in table.entries() {
            debug!("Ярлык: {}", entry);
        }

        Ok(table)
    }

    /// Разобрать содержимое файла. Некорректные строки пропускаются и не занимают слот.
    pub fn parse(content: &str) -> Self {
        let mut table = Self::default();

        for (index, line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim_end_matches(['\r', '\n']);
            let trimmed = line.trim_start();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let entry = match Self::parse_line(trimmed) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Строка {} пропущена ({}): {:?}", line_no, e, line);
                    continue;
                }
            };

            if table.entries.len() == MAX_MOUSE_SHORTCUTS {
                debug!(
                    "Строка {} проигнорирована: достигнут предел в {} ярлыков",
                    line_no, MAX_MOUSE_SHORTCUTS
                );
                break;
            }

            if let Some(existing) = table.lookup(entry.trigger_count) {
                warn!(
                    "Строка {}: для {} кликов уже задана команда '{}', новая запись не будет использоваться",
                    line_no, entry.trigger_count, existing
                );
            }

            table.entries.push(entry);
        }

        table
    }

    fn parse_line(line: &str) -> std::result::Result<ShortcutEntry, LineError> {
        let (count, command) = line.split_once(':').ok_or(LineError::MissingSeparator)?;

        let count = count.trim();
        let trigger_count = count
            .parse::<u32>()
            .map_err(|_| LineError::BadCount(count.to_string()))?;

        let command = command.trim();
        if command.is_empty() {
            return Err(LineError::EmptyCommand);
        }

        Ok(ShortcutEntry {
            trigger_count,
            command: command.to_string(),
        })
    }

    #[cfg(test)]
    pub fn from_entries(entries: impl IntoIterator<Item = ShortcutEntry>) -> Self {
        Self {
            entries: entries.into_iter().take(MAX_MOUSE_SHORTCUTS).collect(),
        }
    }

    /// Первая запись с точным совпадением числа кликов
    pub fn lookup(&self, count: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.trigger_count == count)
            .map(|entry| entry.command.as_str())
    }

    pub fn entries(&self) -> &[ShortcutEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
