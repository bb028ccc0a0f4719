//! Logging setup for NEO Tracker.
//!
//! The TUI owns the terminal, so interactive runs log to a file. Headless runs
//! log to stderr where test harnesses can capture it.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes logging to the log file, truncating it first.
///
/// Location: `~/.local/state/neo-tracker/neo-tracker.log` on Linux, or the
/// platform's state/config directory elsewhere.
pub fn init_file_logging() {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            return;
        }
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Initializes logging to stderr.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the path of the log file.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("neo-tracker").join("neo-tracker.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("neo-tracker").join("neo-tracker.log");
    }

    std::env::temp_dir().join("neo-tracker.log")
}
