//! Path resolution for dwtimer configuration and data files.
//!
//! All dwtimer data is stored in `~/.dwtimer/`:
//! - `config.yaml` - Key bindings and preferences
//! - `dwtimer.db` - `SQLite` database of finished sessions
//! - `dwtimer.log` - Diagnostic log

use std::path::PathBuf;

use crate::error::DwtimerError;

/// Paths to dwtimer configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.dwtimer/`
    pub root: PathBuf,
    /// Config file: `~/.dwtimer/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.dwtimer/dwtimer.db`
    pub database: PathBuf,
    /// Log file: `~/.dwtimer/dwtimer.log`
    pub log_file: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, DwtimerError> {
        let home = std::env::var("HOME").map_err(|_| {
            DwtimerError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".dwtimer")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("dwtimer.db"),
            log_file: root.join("dwtimer.log"),
            root,
        }
    }

    /// Ensure the data directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), DwtimerError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                DwtimerError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}
