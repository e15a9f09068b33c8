//! JSON output formatting for dwtimer.

use serde::Serialize;
use serde_json::json;

use crate::error::DwtimerError;
use crate::focus::StoredSession;

/// Format stored sessions as JSON
///
/// # Errors
///
/// Returns `DwtimerError::Parse` if JSON serialization fails.
pub fn format_history_json(sessions: &[StoredSession]) -> Result<String, DwtimerError> {
    let output = json!({
        "count": sessions.len(),
        "items": sessions
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Serialize any value as pretty JSON.
///
/// # Errors
///
/// Returns `DwtimerError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, DwtimerError> {
    Ok(serde_json::to_string_pretty(value)?)
}
