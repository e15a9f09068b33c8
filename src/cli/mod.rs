//! Command-line interface for dwtimer.

pub mod args;
pub mod commands;
pub mod prompt;
