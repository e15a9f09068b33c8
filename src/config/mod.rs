//! Configuration management for dwtimer.
//!
//! This module handles loading configuration from `~/.dwtimer/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{Config, FocusConfig, GeneralConfig, KeyBindings};
