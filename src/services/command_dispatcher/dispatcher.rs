use crate::mappings::ShortcutTable;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::r#trait::{ChildHandle, ChildStatus, CommandLauncher};

/// Результат завершения сессии
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireOutcome {
    /// Для этого числа кликов команда не задана
    Unbound(u32),
    Launched(ChildHandle),
    LaunchFailed,
}

/// Изменение состояния дочернего процесса, найденное при опросе
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReapOutcome {
    pub child: ChildHandle,
    pub status: ChildStatus,
}

/// Запускает команды ярлыков и собирает статусы завершившихся процессов
pub struct CommandDispatcher {
    table: Arc<ShortcutTable>,
    launcher: Box<dyn CommandLauncher>,
    children: Vec<ChildHandle>,
}

impl CommandDispatcher {
    pub fn new(table: Arc<ShortcutTable>, launcher: Box<dyn CommandLauncher>) -> Self {
        info!("Инициализация CommandDispatcher ({} ярлыков)", table.len());
        Self {
            table,
            launcher,
            children: Vec::new(),
        }
    }

    /// Запустить команду, привязанную к `left_clicks`. Не ждёт её завершения.
    pub fn fire(&mut self, left_clicks: u32) -> FireOutcome {
        let Some(command) = self.table.lookup(left_clicks) else {
            info!("Для {} кликов команда не настроена", left_clicks);
            return FireOutcome::Unbound(left_clicks);
        };

        match self.launcher.launch(command) {
            Ok(child) => {
                info!("Ярлык {} запущен: {}", left_clicks, child);
                self.children.push(child.clone());
                FireOutcome::Launched(child)
            }
            Err(e) => {
                error!("Ярлык {}: {}", left_clicks, e);
                FireOutcome::LaunchFailed
            }
        }
    }

    /// Неблокирующий опрос всех запущенных команд.
    /// Завершившиеся процессы забываются, остановленные и продолженные остаются.
    pub fn reap_nonblocking(&mut self) -> Vec<ReapOutcome> {
        if self.children.is_empty() {
            return Vec::new();
        }

        let mut outcomes = Vec::new();
        let launcher = &mut self.launcher;

        self.children.retain(|child| {
            let status = match launcher.poll(child) {
                Ok(status) => status,
                Err(e) => {
                    warn!("Не удалось опросить {}: {}", child, e);
                    return true;
                }
            };

            if status == ChildStatus::StillRunning {
                return true;
            }

            Self::log_status(child, &status);
            let keep = !status.is_terminal();
            outcomes.push(ReapOutcome {
                child: child.clone(),
                status,
            });
            keep
        });

        outcomes
    }

    fn log_status(child: &ChildHandle, status: &ChildStatus) {
        let elapsed = child.launched_at.elapsed();
        match status {
            ChildStatus::Exited(0) => {
                info!("{} завершилась успешно за {:.1?}", child, elapsed)
            }
            ChildStatus::Exited(code) => {
                warn!("{} завершилась с кодом {} за {:.1?}", child, code, elapsed)
            }
            ChildStatus::Signaled { signal, core_dumped } => warn!(
                "{} убита сигналом {}{}",
                child,
                signal,
                if *core_dumped { " (core dumped)" } else { "" }
            ),
            ChildStatus::Stopped(signal) => info!("{} остановлена сигналом {}", child, signal),
            ChildStatus::Continued => info!("{} продолжила выполнение", child),
            ChildStatus::Lost => warn!("{} больше не является дочерним процессом", child),
            ChildStatus::StillRunning => {}
        }
    }

    /// Сколько запущенных команд ещё не собрано
    pub fn outstanding(&self) -> usize {
        self.children.len()
    }

    pub fn table(&self) -> &ShortcutTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::command_dispatcher::testing::RecordingLauncher;
    use crate::services::command_dispatcher::ShellLauncher;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn scenario_table() -> Arc<ShortcutTable> {
        Arc::new(ShortcutTable::parse(
            "0:notify-send zero\n2:lock-screen\n5:shutdown-now\n",
        ))
    }

    #[test]
    fn test_fire_launches_bound_command() {
        let launcher = RecordingLauncher::default();
        let mut dispatcher = CommandDispatcher::new(scenario_table(), Box::new(launcher.clone()));

        match dispatcher.fire(2) {
            FireOutcome::Launched(child) => assert_eq!(child.command, "lock-screen"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(launcher.launched(), vec!["lock-screen".to_string()]);
        assert_eq!(dispatcher.outstanding(), 1);
    }

    #[test]
    fn test_unbound_count_launches_nothing() {
        let launcher = RecordingLauncher::default();
        let mut dispatcher = CommandDispatcher::new(scenario_table(), Box::new(launcher.clone()));

        assert_eq!(dispatcher.fire(7), FireOutcome::Unbound(7));
        assert!(launcher.launched().is_empty());
        assert_eq!(dispatcher.outstanding(), 0);
    }

    #[test]
    fn test_launch_failure_is_not_tracked() {
        let launcher = RecordingLauncher::failing();
        let mut dispatcher = CommandDispatcher::new(scenario_table(), Box::new(launcher));

        assert_eq!(dispatcher.fire(0), FireOutcome::LaunchFailed);
        assert_eq!(dispatcher.outstanding(), 0);
    }

    #[test]
    fn test_reap_without_children_is_a_no_op() {
        let mut dispatcher =
            CommandDispatcher::new(scenario_table(), Box::new(RecordingLauncher::default()));
        assert!(dispatcher.reap_nonblocking().is_empty());
    }

    #[test]
    fn test_reap_keeps_stopped_and_drops_exited() {
        let launcher = RecordingLauncher::default();
        let mut dispatcher = CommandDispatcher::new(scenario_table(), Box::new(launcher.clone()));
        dispatcher.fire(0);
        dispatcher.fire(5);

        launcher.set_status("notify-send zero", ChildStatus::Stopped("SIGSTOP".to_string()));
        launcher.set_status("shutdown-now", ChildStatus::Exited(1));

        let outcomes = dispatcher.reap_nonblocking();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(dispatcher.outstanding(), 1);

        launcher.set_status("notify-send zero", ChildStatus::Continued);
        assert_eq!(dispatcher.reap_nonblocking()[0].status, ChildStatus::Continued);
        assert_eq!(dispatcher.outstanding(), 1);

        launcher.set_status("notify-send zero", ChildStatus::StillRunning);
        assert!(dispatcher.reap_nonblocking().is_empty());

        launcher.set_status("notify-send zero", ChildStatus::Signaled {
            signal: "SIGKILL".to_string(),
            core_dumped: false,
        });
        assert_eq!(dispatcher.reap_nonblocking().len(), 1);
        assert_eq!(dispatcher.outstanding(), 0);
    }

    #[test]
    fn test_real_child_is_reaped() {
        let table = Arc::new(ShortcutTable::parse("1:exit 4\n"));
        let launcher = ShellLauncher::new(PathBuf::from("/bin/sh"));
        let mut dispatcher = CommandDispatcher::new(table, Box::new(launcher));

        assert!(matches!(dispatcher.fire(1), FireOutcome::Launched(_)));

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut reaped = Vec::new();
        while reaped.is_empty() && Instant::now() < deadline {
            reaped = dispatcher.reap_nonblocking();
            std::thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(reaped.len(), 1);
        assert_eq!(reaped[0].status, ChildStatus::Exited(4));
        assert_eq!(dispatcher.outstanding(), 0);
    }
}
