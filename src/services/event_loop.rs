use crate::error::Result;
use crate::events::RawInputEvent;
use crate::services::click_session::ClickSession;
use crate::services::command_dispatcher::{CommandDispatcher, FireOutcome};
use crate::services::device_source::{poll_next_event, DeviceSource, Polled};
use crate::{debug_if_enabled, trace_if_enabled};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Почему цикл завершился без ошибки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Shutdown,
    SourceClosed,
}

/// Однопоточный цикл: устройство -> автомат сессии -> диспетчер команд
pub struct EventLoop {
    source: Box<dyn DeviceSource>,
    session: ClickSession,
    dispatcher: CommandDispatcher,
    poll_interval: Option<Duration>,
    events_seen: u64,
    sessions_fired: u64,
    launches_failed: u64,
    children_reaped: u64,
}

impl EventLoop {
    pub fn new(
        source: Box<dyn DeviceSource>,
        session: ClickSession,
        dispatcher: CommandDispatcher,
    ) -> Self {
        Self {
            source,
            session,
            dispatcher,
            poll_interval: None,
            events_seen: 0,
            sessions_fired: 0,
            launches_failed: 0,
            children_reaped: 0,
        }
    }

    /// Ограничить ожидание, чтобы собирать завершённые команды и без ввода
    pub fn with_poll_interval(mut self, poll_interval: Option<Duration>) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Работает до сигнала `shutdown`, конца потока событий или фатальной ошибки
    pub async fn run<F>(&mut self, shutdown: F) -> Result<LoopExit>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Слушаем {} ({} ярлыков)",
            self.source.describe(),
            self.dispatcher.table().len()
        );
        tokio::pin!(shutdown);

        let exit = loop {
            let polled = tokio::select! {
                polled = poll_next_event(self.source.as_mut(), self.poll_interval) => polled,
                _ = &mut shutdown => break LoopExit::Shutdown,
            };

            match polled {
                Ok(Polled::Event(event)) => self.handle_event(&event),
                Ok(Polled::Retry) => debug!("Ожидание прервано, повторяем"),
                Ok(Polled::TimedOut) => {}
                Ok(Polled::ReadFailed(e)) => warn!("Ошибка чтения события: {}", e),
                Ok(Polled::Closed) => break LoopExit::SourceClosed,
                Err(e) => {
                    error!("Остановка цикла событий: {}", e);
                    return Err(e);
                }
            }

            self.reap_children();
        };

        info!(
            "Цикл событий завершён ({:?}): событий {}, сработавших сессий {}, \
             ошибок запуска {}, собрано процессов {}, ещё работают {}",
            exit,
            self.events_seen,
            self.sessions_fired,
            self.launches_failed,
            self.children_reaped,
            self.dispatcher.outstanding()
        );
        Ok(exit)
    }

    fn handle_event(&mut self, event: &RawInputEvent) {
        self.events_seen += 1;
        trace_if_enabled!("Событие: {}", event);

        if let Some(left_clicks) = self.session.process(event) {
            self.sessions_fired += 1;
            match self.dispatcher.fire(left_clicks) {
                FireOutcome::Launched(child) => {
                    debug_if_enabled!("Отслеживаем {}", child);
                }
                FireOutcome::Unbound(count) => {
                    trace_if_enabled!("Сессия на {} кликов без команды", count);
                }
                FireOutcome::LaunchFailed => self.launches_failed += 1,
            }
        }
    }

    /// Учитываются только завершившиеся процессы, не остановки и продолжения
    fn reap_children(&mut self) {
        for outcome in self.dispatcher.reap_nonblocking() {
            if outcome.status.is_terminal() {
                self.children_reaped += 1;
                trace_if_enabled!("{} больше не отслеживается", outcome.child);
            }
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &ClickSession {
        &self.session
    }

    #[cfg(test)]
    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }
}
