//! Tracing subscriber setup.
//!
//! The filter comes from `FITDASH_LOG` (e.g. `FITDASH_LOG=fitdash=debug`) and
//! defaults to `warn`. Initialization is idempotent: a second call is a no-op.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, EXIT_DATA};

pub const LOG_ENV: &str = "FITDASH_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr (CLI commands).
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to a file, so the TUI's alternate screen stays clean.
pub fn init_file(path: &Path) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_DATA, format!("Failed to create log file '{}': {e}", path.display())))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
