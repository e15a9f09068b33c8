//! Database migrations for dwtimer.
//!
//! Each migration is a function that upgrades the schema by one version.
//! Migrations are run automatically when the database is opened.

use rusqlite::Connection;

use crate::error::DwtimerError;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, DwtimerError> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| DwtimerError::Database(format!("Failed to get schema version: {e}")))?;

    Ok(version)
}

/// Set the schema version in the database.
fn set_version(conn: &Connection, version: i32) -> Result<(), DwtimerError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| DwtimerError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
///
/// Returns the number of migrations applied.
pub fn run(conn: &Connection) -> Result<i32, DwtimerError> {
    let current = get_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(0);
    }

    for version in (current + 1)..=CURRENT_VERSION {
        run_migration(conn, version)?;
        set_version(conn, version)?;
        tracing::info!(version, "applied schema migration");
    }

    Ok(CURRENT_VERSION - current)
}

/// Run a specific migration.
fn run_migration(conn: &Connection, version: i32) -> Result<(), DwtimerError> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(DwtimerError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// Creates `tasks`, one row per session, and the append-only child tables
/// `distractions` and `pauses`. Task ids come from `AUTOINCREMENT`, so an
/// id is never handed out twice, even after the newest row is deleted.
fn migrate_v1(conn: &Connection) -> Result<(), DwtimerError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            objective TEXT NOT NULL,
            duration_seconds INTEGER NOT NULL,
            start_ts INTEGER NOT NULL,
            end_ts INTEGER
        );

        CREATE TABLE IF NOT EXISTS distractions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id INTEGER NOT NULL REFERENCES tasks(id),
            ts INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_distractions_task
        ON distractions(task_id);

        CREATE TABLE IF NOT EXISTS pauses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id INTEGER NOT NULL REFERENCES tasks(id),
            start_ts INTEGER NOT NULL,
            end_ts INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_pauses_task
        ON pauses(task_id);
        ",
    )
    .map_err(|e| DwtimerError::Database(format!("Migration v1 failed: {e}")))
}
