use chrono::{Local, TimeZone};
use colored::Colorize;

use crate::focus::{format_mmss, StoredSession};

/// Format stored sessions as a pretty table
pub fn format_history_pretty(sessions: &[StoredSession]) -> String {
    if sessions.is_empty() {
        return "No sessions recorded yet.\n\nStart one with: dwtimer".to_string();
    }

    let mut output = format!("{} ({} sessions)\n", "Session history".bold(), sessions.len());
    output.push_str(&"─".repeat(72));
    output.push('\n');
    output.push_str(&format!(
        "{:<17} {:>7} {:>7} {:>6} {:>6}  {}\n",
        "Started", "Planned", "Worked", "Pauses", "Dist.", "Objective"
    ));

    for session in sessions {
        let status = if session.end_ts.is_none() {
            "▶".blue()
        } else if session.completed() {
            "✓".green()
        } else {
            "✗".red()
        };

        let worked = session
            .wall_seconds()
            .map_or_else(|| "-".to_string(), |wall| seconds_label(wall - session.paused_seconds()));

        output.push_str(&format!(
            "{:<17} {:>7} {:>7} {:>6} {:>6}  {} {}\n",
            local_time(session.start_ts),
            seconds_label(session.duration_seconds),
            worked,
            session.pauses.len(),
            session.distractions.len(),
            status,
            session.objective
        ));
    }

    output
}

fn seconds_label(seconds: i64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let seconds = seconds.max(0) as u32;
    format_mmss(seconds)
}

fn local_time(ts: i64) -> String {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map_or_else(|| ts.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}
