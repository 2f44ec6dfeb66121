use evdev::{EventType, KeyCode};
use std::fmt;
use std::mem::size_of;
use std::os::raw::c_long;
use std::time::UNIX_EPOCH;

const TIMEVAL_FIELD: usize = size_of::<c_long>();

/// Размер `struct input_event`: timeval (два long) + type + code + value.
pub const RECORD_SIZE: usize = 2 * TIMEVAL_FIELD + 2 + 2 + 4;

/// Тип события
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Key,
    Other(u16),
}

impl From<u16> for EventKind {
    fn from(raw: u16) -> Self {
        match EventType(raw) {
            EventType::KEY => EventKind::Key,
            _ => EventKind::Other(raw),
        }
    }
}

/// Кнопка мыши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Middle,
    Other(u16),
}

impl From<u16> for Button {
    fn from(raw: u16) -> Self {
        match KeyCode::new(raw) {
            KeyCode::BTN_LEFT => Button::Left,
            KeyCode::BTN_MIDDLE => Button::Middle,
            _ => Button::Other(raw),
        }
    }
}

/// Значение события клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Released,
    Pressed,
    Repeat,
    Other(i32),
}

impl From<i32> for ButtonState {
    fn from(raw: i32) -> Self {
        match raw {
            0 => ButtonState::Released,
            1 => ButtonState::Pressed,
            2 => ButtonState::Repeat,
            other => ButtonState::Other(other),
        }
    }
}

/// Сырое событие устройства ввода, секундной точности
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInputEvent {
    pub kind: EventKind,
    pub button: Button,
    pub state: ButtonState,
    pub timestamp_secs: i64,
}

impl RawInputEvent {
    pub fn new(kind: u16, code: u16, value: i32, timestamp_secs: i64) -> Self {
        Self {
            kind: EventKind::from(kind),
            button: Button::from(code),
            state: ButtonState::from(value),
            timestamp_secs,
        }
    }

    #[cfg(test)]
    pub fn press(button: Button, timestamp_secs: i64) -> Self {
        Self {
            kind: EventKind::Key,
            button,
            state: ButtonState::Pressed,
            timestamp_secs,
        }
    }

    pub fn is_key_press(&self) -> bool {
        self.kind == EventKind::Key && self.state == ButtonState::Pressed
    }

    /// Разбор одной записи `struct input_event` в порядке байтов хоста
    pub fn decode(record: &[u8; RECORD_SIZE]) -> Self {
        let mut sec = [0u8; TIMEVAL_FIELD];
        sec.copy_from_slice(&record[..TIMEVAL_FIELD]);

        // tv_usec не нужен: таймаут сессии считается в целых секундах
        let rest = &record[2 * TIMEVAL_FIELD..];
        let kind = u16::from_ne_bytes([rest[0], rest[1]]);
        let code = u16::from_ne_bytes([rest[2], rest[3]]);
        let value = i32::from_ne_bytes([rest[4], rest[5], rest[6], rest[7]]);

        Self::new(kind, code, value, c_long::from_ne_bytes(sec) as i64)
    }

    #[cfg(test)]
    pub fn encode(kind: u16, code: u16, value: i32, sec: i64, usec: i64) -> [u8; RECORD_SIZE] {
        let mut record = [0u8; RECORD_SIZE];
        record[..TIMEVAL_FIELD].copy_from_slice(&(sec as c_long).to_ne_bytes());
        record[TIMEVAL_FIELD..2 * TIMEVAL_FIELD].copy_from_slice(&(usec as c_long).to_ne_bytes());
        let rest = &mut record[2 * TIMEVAL_FIELD..];
        rest[0..2].copy_from_slice(&kind.to_ne_bytes());
        rest[2..4].copy_from_slice(&code.to_ne_bytes());
        rest[4..8].copy_from_slice(&value.to_ne_bytes());
        record
    }
}

impl From<&evdev::InputEvent> for RawInputEvent {
    fn from(event: &evdev::InputEvent) -> Self {
        let timestamp_secs = event
            .timestamp()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        Self::new(event.event_type().0, event.code(), event.value(), timestamp_secs)
    }
}

impl fmt::Display for RawInputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?} @{}s", self.kind, self.button, self.state, self.timestamp_secs)
    }
}
