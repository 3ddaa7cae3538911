/// Logging setup for applications embedding the engine
///
/// The engine itself only emits `tracing` events. Binaries that want them on
/// stderr can call `init_logging` once at startup.

use tracing_subscriber::EnvFilter;

/// Verbosity for the engine's own log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Filter directive for the given level, e.g. `habit_streak_engine=info`
pub fn filter_directive(level: LogLevel) -> String {
    format!("habit_streak_engine={}", level.as_str())
}

/// Install a stderr `fmt` subscriber
///
/// `RUST_LOG` takes precedence over `level` when it is set. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Keep stdout free for the host application
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging was already initialized");
    }
}
