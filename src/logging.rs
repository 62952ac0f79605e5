use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Keeps the background log writer alive; flushes on drop.
pub struct LogGuard {
    _guard: WorkerGuard,
}

pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordfall")
        .join("logs")
}

/// The terminal belongs to the UI, so logs only go to a daily rolling file.
/// `WORDFALL_LOG` overrides the configured level filter.
pub fn init(log_level: &str, log_dir: &Path) -> Option<LogGuard> {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {}: {err}", log_dir.display());
        return None;
    }

    let env_filter = EnvFilter::try_from_env("WORDFALL_LOG")
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "wordfall.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        return None;
    }

    Some(LogGuard { _guard: guard })
}
