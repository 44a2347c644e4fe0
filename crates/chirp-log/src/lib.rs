// ABOUTME: Shared logging setup for chirp binaries
// ABOUTME: init() logs to stderr, init_file() logs to a file so the TUI screen stays clean

use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Standard logging to stderr. Default: INFO level, RUST_LOG override.
/// Used by headless subcommands.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}

/// File-based logging for the TUI. Default: WARN level, RUST_LOG override.
/// Logs to ~/.config/chirp/{app_name}.log
/// If setup fails, prints a warning to stderr and continues without logging.
pub fn init_file(app_name: &str) {
    let result: Result<std::fs::File, Box<dyn std::error::Error>> = log_dir()
        .ok_or_else(|| "could not determine config directory".into())
        .and_then(|dir| open_log(&dir, app_name));

    match result {
        Ok(log_file) => {
            tracing_subscriber::fmt()
                .with_writer(log_file)
                .with_env_filter(
                    EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
                )
                .with_ansi(false)
                .init();
        }
        Err(e) => eprintln!("Warning: failed to set up file logging: {e}"),
    }
}

/// Directory holding chirp log files
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chirp"))
}

/// Path of the log file for `app_name` inside `dir`
pub fn log_path(dir: &Path, app_name: &str) -> PathBuf {
    dir.join(format!("{app_name}.log"))
}

fn open_log(dir: &Path, app_name: &str) -> Result<std::fs::File, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path(dir, app_name))?;
    Ok(file)
}
