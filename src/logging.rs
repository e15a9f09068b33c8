//! Diagnostic logging.
//!
//! Logs go to `~/.dwtimer/dwtimer.log` rather than the terminal, where they
//! would tear through the countdown line. The filter comes from
//! `DWTIMER_LOG` when set, then `RUST_LOG`, otherwise from
//! `general.log_filter` in the config.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Paths;
use crate::error::DwtimerError;

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV: &str = "DWTIMER_LOG";

/// Install the global subscriber, appending to the log file.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init(paths: &Paths, default_filter: &str) -> Result<(), DwtimerError> {
    paths.ensure_dirs()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_file)
        .map_err(|e| {
            DwtimerError::Config(format!(
                "Failed to open log file {}: {e}",
                paths.log_file.display()
            ))
        })?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| DwtimerError::Config(format!("Failed to initialize logging: {e}")))
}
