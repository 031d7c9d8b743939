//! Logging setup
//!
//! Logs go to a daily rolling file under `~/.appointly/logs/`. Nothing is
//! written to stdout or stderr while the TUI owns the terminal.

use crate::config::appointly_home;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const LOG_FILE_PREFIX: &str = "appointly.log";

#[derive(Debug, Clone)]
pub struct LogConfig {
    debug_mode: bool,
    level: String,
    log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            level: "info".to_string(),
            log_dir: log_dir(),
        }
    }

    /// Debug mode forces `debug` level and adds source locations
    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_log_dir(mut self, dir: PathBuf) -> Self {
        self.log_dir = dir;
        self
    }

    fn filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
        let level = if self.debug_mode { "debug" } else { self.level.as_str() };
        EnvFilter::new(format!("warn,appointly={}", level))
    }
}

/// Default log directory: `~/.appointly/logs`
pub fn log_dir() -> PathBuf {
    appointly_home().join("logs")
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init_logging(config: LogConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(config.debug_mode)
        .with_line_number(config.debug_mode);

    tracing_subscriber::registry()
        .with(config.filter())
        .with(layer)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::info!(
        "Logging to {} (debug: {})",
        config.log_dir.display(),
        config.debug_mode
    );
    Ok(guard)
}

fn log_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .collect()
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Most recently written log file, if any
pub fn get_log_path() -> Option<PathBuf> {
    latest_log_in(&log_dir())
}

fn latest_log_in(dir: &Path) -> Option<PathBuf> {
    log_files(dir).into_iter().max_by_key(|p| modified(p))
}

/// Delete log files not modified in the last `days` days
pub fn cleanup_old_logs(days: u64) -> Result<usize> {
    cleanup_logs_in(&log_dir(), days)
}

fn cleanup_logs_in(dir: &Path, days: u64) -> Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(days * 24 * 60 * 60))
        .context("Log retention period is too long")?;

    let mut removed = 0;
    for path in log_files(dir) {
        if modified(&path).is_some_and(|m| m < cutoff) {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove old log: {:?}", path))?;
            removed += 1;
        }
    }
    Ok(removed)
}
