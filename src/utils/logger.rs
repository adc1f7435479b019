//! File logging for the application.
//!
//! Logs never go to the terminal because the TUI owns it. Each run writes a
//! fresh file under the user's data directory, e.g.
//! `~/.local/share/hyprchat/logs/hyprchat.2026-01-31-14-30-25.log`.
//!
//! The level is controlled by `RUST_LOG` and defaults to `info`.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directory that receives the log files.
///
/// Falls back to `logs/` next to the executable when the platform has no
/// data directory.
pub fn log_dir() -> PathBuf {
    if let Some(data) = dirs::data_local_dir() {
        return data.join("hyprchat").join("logs");
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn log_file_name(now: DateTime<Local>) -> String {
    format!("hyprchat.{}.log", now.format("%Y-%m-%d-%H-%M-%S"))
}

/// Install the global subscriber writing to a per-run log file.
///
/// The returned guard flushes buffered lines when dropped, so keep it alive
/// for the whole program. Logging stays disabled if the file can't be created.
pub fn init_logging() -> Option<WorkerGuard> {
    let dir = log_dir();
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("Warning: Failed to create logs directory {}: {}", dir.display(), e);
        return None;
    }

    let log_path = dir.join(log_file_name(Local::now()));
    let log_file = match fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {}", e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized - writing to {}", log_path.display());
    Some(guard)
}
