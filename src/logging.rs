//! File logging
//!
//! The terminal is owned by the UI, so all tracing output goes to a log file
//! in the config directory.

use crate::config::Config;
use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "COIN_TUI_LOG";

const LOG_FILE: &str = "coin-tui.log";

/// Keeps the non-blocking writer flushing until dropped
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
    pub path: PathBuf,
}

fn log_path() -> PathBuf {
    Config::config_dir()
        .filter(|dir| fs::create_dir_all(dir).is_ok())
        .unwrap_or_else(std::env::temp_dir)
        .join(LOG_FILE)
}

/// Install the global subscriber writing to the log file
pub fn init() -> Result<LogGuard> {
    let path = log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", path.display(), e))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard {
        _guard: guard,
        path,
    })
}
