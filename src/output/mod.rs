//! Output formatting for dwtimer.
//!
//! This module provides formatters for displaying stored sessions.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::DwtimerError;
use crate::focus::StoredSession;

pub use json::*;
pub use pretty::*;

/// Format session history based on output format
///
/// # Errors
///
/// Returns `DwtimerError::Parse` if JSON serialization fails.
pub fn format_history(
    sessions: &[StoredSession],
    format: OutputFormat,
) -> Result<String, DwtimerError> {
    match format {
        OutputFormat::Pretty => Ok(format_history_pretty(sessions)),
        OutputFormat::Json => format_history_json(sessions),
    }
}
