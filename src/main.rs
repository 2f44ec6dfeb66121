use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

mod config;
mod error;
mod events;
mod mappings;
mod services;
mod utils;

use config::{LoggingConfig, Settings, DEFAULT_SETTINGS_PATH};
use error::{Result, ShortcutError};
use mappings::ShortcutTable;
use services::{
    create_device_source,
    create_launcher,
    ClickSession,
    CommandDispatcher,
    EventLoop,
    LoopExit,
};

const SYSLOG_IDENTITY: &std::ffi::CStr = c"mouse-shortcuts";

#[derive(Parser, Debug)]
#[command(name = "mouse-shortcuts")]
#[command(about = "Запуск команд по числу кликов левой кнопкой между двумя нажатиями средней")]
struct Args {
    /// Путь к файлу настроек демона (TOML, может отсутствовать)
    #[arg(short, long, default_value = DEFAULT_SETTINGS_PATH)]
    config: PathBuf,

    /// Файл ярлыков в формате <число>:<команда>
    #[arg(short, long)]
    shortcuts: Option<PathBuf>,

    /// Устройство /dev/input/eventN вместо автопоиска
    #[arg(long)]
    device: Option<String>,

    /// Не уходить в фон, писать лог в stderr
    #[arg(short, long)]
    foreground: bool,

    /// Режим сухого запуска (команды только логируются)
    #[arg(long)]
    dry_run: bool,

    /// Читать события из файла записей input_event вместо устройства
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Уровень логирования
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    Syslog,
}

fn main() -> ExitCode {
    let mut args = Args::parse();

    // Всё, что зависит от текущего каталога, фиксируется до chdir("/")
    let settings = match load_settings(&mut args) {
        Ok(settings) => settings,
        Err(e) => return report_startup_failure(&e),
    };

    let target = if args.foreground {
        LogTarget::Stderr
    } else {
        if let Err(e) = utils::daemon::daemonize() {
            return report_startup_failure(&e);
        }
        LogTarget::Syslog
    };

    if let Err(e) = init_tracing(&settings.logging, target) {
        eprintln!("Не удалось инициализировать логирование: {}", e);
        return e.exit_code();
    }

    match run(&args, &settings) {
        Ok(exit) => {
            info!("mouse-shortcuts завершил работу ({:?})", exit);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    }
}

fn load_settings(args: &mut Args) -> Result<Settings> {
    let mut settings = Settings::load(&args.config)?;

    if let Some(path) = &args.shortcuts {
        settings.shortcuts.path = path.clone();
    }
    if let Some(device) = &args.device {
        settings.input.device_path = device.clone();
    }
    if let Some(level) = &args.log_level {
        settings.logging.level = level.clone();
    }

    settings.validate()?;
    settings.absolutize_paths()?;

    if let Some(replay) = args.replay.take() {
        args.replay = Some(if replay.is_relative() {
            std::env::current_dir()?.join(replay)
        } else {
            replay
        });
    }

    Ok(settings)
}

fn run(args: &Args, settings: &Settings) -> Result<LoopExit> {
    info!("Запуск mouse-shortcuts v{}", env!("CARGO_PKG_VERSION"));

    if args.dry_run {
        warn!("Режим сухого запуска - команды не выполняются");
    }

    let table = Arc::new(ShortcutTable::load(&settings.shortcuts.path)?);

    if !args.dry_run {
        utils::permissions::check_shell(&settings.shortcuts.shell)?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(serve(args, settings, table))
}

async fn serve(args: &Args, settings: &Settings, table: Arc<ShortcutTable>) -> Result<LoopExit> {
    let source = create_device_source(&settings.input, args.replay.as_deref()).await?;

    let launcher = create_launcher(settings.shortcuts.shell.clone(), args.dry_run);
    let dispatcher = CommandDispatcher::new(table, launcher);
    let session = ClickSession::new(settings.session_timeout());

    let mut event_loop = EventLoop::new(source, session, dispatcher)
        .with_poll_interval(settings.poll_interval());

    info!("Все компоненты инициализированы");

    // При выходе из функции устройство освобождается вместе с event_loop
    event_loop.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Ошибка при ожидании SIGINT: {}", err);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Ошибка при подписке на SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = interrupt => info!("Получен сигнал завершения (SIGINT)"),
        _ = terminate => info!("Получен сигнал завершения (SIGTERM)"),
    }
}

/// Ошибки до запуска основного логирования пишутся в stderr
fn report_startup_failure(e: &ShortcutError) -> ExitCode {
    let logging = LoggingConfig {
        level: "error".to_string(),
        format: "compact".to_string(),
    };
    if init_tracing(&logging, LogTarget::Stderr).is_ok() {
        error!("{}", e);
    } else {
        eprintln!("{}", e);
    }
    e.exit_code()
}

fn init_tracing(logging: &LoggingConfig, target: LogTarget) -> Result<()> {
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| ShortcutError::Config(e.into()))?;

    let full = logging.format == "full";

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match target {
        LogTarget::Stderr if full => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogTarget::Stderr => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
        LogTarget::Syslog => {
            // syslog сам ставит время и имя процесса
            let syslog = syslog_tracing::Syslog::new(
                SYSLOG_IDENTITY,
                syslog_tracing::Options::LOG_PID,
                syslog_tracing::Facility::Daemon,
            )
            .ok_or_else(|| crate::shortcut_error!(internal, "syslog уже инициализирован"))?;

            let layer = fmt::layer()
                .with_writer(syslog)
                .without_time();
            if full {
                layer.boxed()
            } else {
                layer.compact().boxed()
            }
        }
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| crate::shortcut_error!(internal, "{}", e))?;

    Ok(())
}
