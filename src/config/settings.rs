//! Configuration settings for dwtimer.
//!
//! Settings are loaded from `~/.dwtimer/config.yaml`. Every field has a
//! default, so a partial file (or no file) is fine.

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::error::DwtimerError;
use crate::focus::SignalKind;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Timer settings.
    pub focus: FocusConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format for `history`.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Log filter directive used when `DWTIMER_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

/// Timer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Keys that drive the running timer.
    pub keys: KeyBindings,
    /// Enable desktop notifications.
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Width of the countdown progress bar in cells.
    #[serde(default = "default_bar_width")]
    pub progress_bar_width: usize,
}

/// Single-key bindings for the three timer signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Pause or resume.
    pub pause: char,
    /// Log a distraction.
    pub distract: char,
    /// Abort the session.
    pub quit: char,
}

impl KeyBindings {
    /// Map a typed character to a signal, ignoring case.
    #[must_use]
    pub fn signal_for(&self, key: char) -> Option<SignalKind> {
        let key = key.to_ascii_lowercase();
        if key == self.pause.to_ascii_lowercase() {
            Some(SignalKind::PauseToggle)
        } else if key == self.distract.to_ascii_lowercase() {
            Some(SignalKind::Distract)
        } else if key == self.quit.to_ascii_lowercase() {
            Some(SignalKind::Quit)
        } else {
            None
        }
    }

    /// One-line legend for the command panel.
    #[must_use]
    pub fn legend(&self) -> String {
        format!(
            "({}) pause/resume / ({}) distraction / ({}) quit",
            self.pause, self.distract, self.quit
        )
    }

    fn validate(&self) -> Result<(), DwtimerError> {
        let keys = [
            self.pause.to_ascii_lowercase(),
            self.distract.to_ascii_lowercase(),
            self.quit.to_ascii_lowercase(),
        ];
        if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
            return Err(DwtimerError::Config(format!(
                "Key bindings must be distinct, got {}",
                self.legend()
            )));
        }
        Ok(())
    }
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

fn default_log_filter() -> String {
    "warn".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_bar_width() -> usize {
    40
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            log_filter: default_log_filter(),
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            keys: KeyBindings::default(),
            notifications: default_true(),
            progress_bar_width: default_bar_width(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            pause: 'p',
            distract: 'd',
            quit: 'q',
        }
    }
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if two key bindings collide.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, DwtimerError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            DwtimerError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            DwtimerError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        config.focus.keys.validate()?;
        Ok(config)
    }
}
