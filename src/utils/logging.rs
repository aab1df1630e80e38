//! File logging.
//!
//! The TUI owns the terminal, so every `tracing` event goes to `twinpane.log` in the
//! user's state directory (cache directory where there is none). The level is taken
//! from `TWINPANE_LOG` and defaults to `info`.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

pub const LOG_ENV: &str = "TWINPANE_LOG";
const LOG_FILE: &str = "twinpane.log";

/// Directory the log file is written to.
pub fn log_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("twinpane"))
}

/// Installs the global subscriber.
///
/// The returned guard flushes the writer when dropped and must live until exit. `None`
/// means logging is off: no usable directory, or a subscriber was already installed.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir()?;
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("[twinpane] cannot create log directory {}: {e}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .ok()
        .map(|()| guard)
}
