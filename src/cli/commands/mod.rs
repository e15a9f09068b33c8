//! Command implementations for dwtimer.

mod run;

pub use run::run;

use colored::Colorize;
use serde::Serialize;

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::DwtimerError;
use crate::focus::SqliteSessionStore;
use crate::output::{format_history, to_json};
use crate::storage::Database;

#[derive(Serialize)]
struct InitReport {
    database: String,
    created: bool,
    schema_version: i32,
}

/// Execute the init flag: create the session schema and report whether it
/// already existed.
///
/// # Errors
///
/// Returns an error if the data directory or database cannot be created.
pub fn init(paths: &Paths, format: OutputFormat) -> Result<String, DwtimerError> {
    paths.ensure_dirs()?;
    let (db, created) = Database::initialize_at(&paths.database)?;
    tracing::info!(path = %paths.database.display(), created, "init");

    match format {
        OutputFormat::Json => to_json(&InitReport {
            database: paths.database.display().to_string(),
            created,
            schema_version: db.schema_version()?,
        }),
        OutputFormat::Pretty if created => Ok(format!(
            "{} Schema created in {}",
            "✓".green(),
            paths.database.display()
        )),
        OutputFormat::Pretty => Ok(format!(
            "DB schema already created in {}",
            paths.database.display()
        )),
    }
}

/// Execute history command
///
/// # Errors
///
/// Returns an error if the database cannot be read or output formatting fails.
pub fn history(paths: &Paths, limit: usize, format: OutputFormat) -> Result<String, DwtimerError> {
    paths.ensure_dirs()?;
    let store = SqliteSessionStore::with_database(Database::open_at(&paths.database)?);
    let sessions = store.recent(limit)?;
    format_history(&sessions, format)
}
