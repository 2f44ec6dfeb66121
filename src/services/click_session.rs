use crate::debug_if_enabled;
use crate::events::{Button, RawInputEvent};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Таймаут между событиями одной сессии по умолчанию
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Счёт не ведётся
    #[default]
    Idle,
    /// Между стартовым и завершающим нажатием средней кнопки
    Counting,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Counting => write!(f, "Counting"),
        }
    }
}

/// Автомат подсчёта кликов.
///
/// Средняя кнопка открывает и закрывает сессию, левая кнопка внутри сессии
/// увеличивает счётчик. Если между двумя учитываемыми нажатиями прошло больше
/// `timeout` (по времени из самого события), накопленное состояние
/// сбрасывается до обработки текущего нажатия.
#[derive(Debug, Clone)]
pub struct ClickSession {
    state: SessionState,
    left_clicks: u32,
    last_event_secs: i64,
    timeout_secs: i64,
}

impl ClickSession {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: SessionState::Idle,
            left_clicks: 0,
            last_event_secs: 0,
            timeout_secs: timeout.as_secs() as i64,
        }
    }

    /// Обработать событие. Возвращает число кликов, если сессия завершилась.
    pub fn process(&mut self, event: &RawInputEvent) -> Option<u32> {
        if !event.is_key_press() {
            return None;
        }

        if !matches!(event.button, Button::Left | Button::Middle) {
            return None;
        }

        if self.is_expired(event.timestamp_secs) {
            debug!(
                "Сессия устарела ({}s с последнего нажатия), сброс {} кликов",
                event.timestamp_secs - self.last_event_secs,
                self.left_clicks
            );
            self.reset();
        }

        match event.button {
            Button::Middle => {
                let fired = match self.state {
                    SessionState::Idle => {
                        debug!("Начало подсчёта кликов");
                        self.state = SessionState::Counting;
                        self.left_clicks = 0;
                        None
                    }
                    SessionState::Counting => {
                        let clicks = self.left_clicks;
                        debug!("Конец подсчёта, кликов левой кнопкой: {}", clicks);
                        self.reset();
                        Some(clicks)
                    }
                };
                self.last_event_secs = event.timestamp_secs;
                fired
            }
            Button::Left if self.state == SessionState::Counting => {
                self.left_clicks += 1;
                self.last_event_secs = event.timestamp_secs;
                debug_if_enabled!("Клик левой кнопкой #{}", self.left_clicks);
                None
            }
            _ => None,
        }
    }

    fn is_expired(&self, now_secs: i64) -> bool {
        self.last_event_secs > 0 && now_secs - self.last_event_secs > self.timeout_secs
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.left_clicks = 0;
        self.last_event_secs = 0;
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn left_clicks(&self) -> u32 {
        self.left_clicks
    }

    #[cfg(test)]
    pub fn last_event_secs(&self) -> i64 {
        self.last_event_secs
    }
}

impl Default for ClickSession {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::{EventType, KeyCode};

    fn middle(t: i64) -> RawInputEvent {
        RawInputEvent::press(Button::Middle, t)
    }

    fn left(t: i64) -> RawInputEvent {
        RawInputEvent::press(Button::Left, t)
    }

    fn replay(session: &mut ClickSession, events: &[RawInputEvent]) -> Vec<u32> {
        events.iter().filter_map(|e| session.process(e)).collect()
    }

    fn assert_idle(session: &ClickSession) {
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.left_clicks(), 0);
    }

    #[test]
    fn test_fresh_session_is_idle() {
        let session = ClickSession::default();
        assert_idle(&session);
        assert_eq!(session.last_event_secs(), 0);
    }

    #[test]
    fn test_middle_middle_fires_zero() {
        let mut session = ClickSession::default();
        assert_eq!(replay(&mut session, &[middle(100), middle(101)]), vec![0]);
        assert_idle(&session);
    }

    #[test]
    fn test_two_left_clicks_fire_two() {
        let mut session = ClickSession::default();
        let fired = replay(&mut session, &[middle(100), left(101), left(102), middle(103)]);
        assert_eq!(fired, vec![2]);
        assert_idle(&session);
    }

    #[test]
    fn test_n_clicks_within_timeout_fire_once_with_n() {
        for n in 0..12u32 {
            let mut session = ClickSession::default();
            let mut events = vec![middle(1_000)];
            // каждый клик в пределах 2 секунд от предыдущего
            events.extend((1..=n as i64).map(|i| left(1_000 + 2 * i)));
            events.push(middle(1_000 + 2 * n as i64 + 2));

            assert_eq!(replay(&mut session, &events), vec![n], "n = {}", n);
            assert_idle(&session);
        }
    }

    #[test]
    fn test_gap_longer_than_timeout_discards_session() {
        let mut session = ClickSession::default();
        let fired = replay(&mut session, &[middle(100), left(101), left(104)]);

        assert!(fired.is_empty());
        // левый клик после сброса не открывает сессию
        assert_idle(&session);

        // новая сессия начинается с нуля
        assert_eq!(replay(&mut session, &[middle(105), middle(106)]), vec![0]);
    }

    #[test]
    fn test_sessions_starting_at_time_zero() {
        let mut session = ClickSession::default();
        assert_eq!(replay(&mut session, &[middle(0), middle(1)]), vec![0]);

        let mut session = ClickSession::default();
        let fired = replay(&mut session, &[middle(0), left(1), left(2), middle(3)]);
        assert_eq!(fired, vec![2]);

        let mut session = ClickSession::default();
        assert!(replay(&mut session, &[middle(0), left(1), left(4)]).is_empty());
        assert_idle(&session);
    }

    #[test]
    fn test_gap_of_exactly_timeout_is_still_valid() {
        let mut session = ClickSession::default();
        let fired = replay(&mut session, &[middle(100), left(102), left(104), middle(106)]);
        assert_eq!(fired, vec![2]);
    }

    #[test]
    fn test_stale_middle_press_starts_new_session() {
        let mut session = ClickSession::default();
        // вторая средняя кнопка пришла слишком поздно: это новый старт, а не конец
        let fired = replay(&mut session, &[middle(100), left(101), middle(110)]);

        assert!(fired.is_empty());
        assert_eq!(session.state(), SessionState::Counting);
        assert_eq!(session.left_clicks(), 0);
        assert_eq!(session.last_event_secs(), 110);

        assert_eq!(replay(&mut session, &[left(111), middle(112)]), vec![1]);
    }

    #[test]
    fn test_left_clicks_while_idle_are_ignored() {
        let mut session = ClickSession::default();
        let fired = replay(&mut session, &[left(100), left(100), left(101)]);

        assert!(fired.is_empty());
        assert_idle(&session);
        assert_eq!(session.last_event_secs(), 0);
    }

    #[test]
    fn test_release_and_repeat_never_change_state() {
        let mut session = ClickSession::default();
        session.process(&middle(100));

        for value in [0, 2] {
            for code in [KeyCode::BTN_LEFT, KeyCode::BTN_MIDDLE, KeyCode::BTN_RIGHT] {
                let event = RawInputEvent::new(EventType::KEY.0, code.code(), value, 100);
                assert_eq!(session.process(&event), None);
            }
        }

        assert_eq!(session.state(), SessionState::Counting);
        assert_eq!(session.left_clicks(), 0);
        assert_eq!(session.process(&middle(101)), Some(0));
    }

    #[test]
    fn test_other_buttons_do_not_touch_session() {
        let mut session = ClickSession::default();
        session.process(&middle(100));
        session.process(&left(101));

        // BTN_RIGHT спустя долгое время: ни сброса, ни обновления времени
        let right = RawInputEvent::new(EventType::KEY.0, KeyCode::BTN_RIGHT.code(), 1, 500);
        assert_eq!(session.process(&right), None);
        assert_eq!(session.state(), SessionState::Counting);
        assert_eq!(session.left_clicks(), 1);
        assert_eq!(session.last_event_secs(), 101);
    }

    #[test]
    fn test_non_key_events_are_ignored() {
        let mut session = ClickSession::default();
        session.process(&middle(100));

        let motion = RawInputEvent::new(EventType::RELATIVE.0, KeyCode::BTN_LEFT.code(), 1, 100);
        assert_eq!(session.process(&motion), None);
        assert_eq!(session.left_clicks(), 0);
    }

    #[test]
    fn test_custom_timeout() {
        let mut session = ClickSession::new(Duration::from_secs(10));
        let fired = replay(&mut session, &[middle(100), left(108), middle(117)]);
        assert_eq!(fired, vec![1]);
    }

    #[test]
    fn test_timestamp_after_fire_is_recorded() {
        let mut session = ClickSession::default();
        replay(&mut session, &[middle(100), middle(101)]);

        assert_idle(&session);
        assert_eq!(session.last_event_secs(), 101);
    }
}
