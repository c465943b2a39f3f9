//! Logging bootstrap: one timestamped log file per session.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use stagehand_core::config::LoggingConfig;

use crate::error::{Result, SessionError};

/// Create the log directory, open a fresh `stagehand-<timestamp>.log`
/// and install the global tracing subscriber over it.
///
/// Returns the path of the log file.
///
/// # Errors
/// I/O errors creating the directory or file, and
/// [`SessionError::Logging`] when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.directory)?;
    let name = format!(
        "stagehand-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );
    let path = config.directory.join(name);
    let file = File::create(&path)?;

    let filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| SessionError::Logging(err.to_string()))?;

    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
