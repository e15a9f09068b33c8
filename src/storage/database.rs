//! `SQLite` database connection and operations.
//!
//! The database is stored at `~/.dwtimer/dwtimer.db` and holds one row per
//! finished session plus its distraction and pause rows.

use rusqlite::{Connection, Transaction};

use crate::error::DwtimerError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, DwtimerError> {
        let conn = Connection::open(path).map_err(|e| {
            DwtimerError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "opened database");

        Self::from_connection(conn).map(|(db, _)| db)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, DwtimerError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DwtimerError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        Self::from_connection(conn).map(|(db, _)| db)
    }

    /// Enable foreign keys and migrate; also returns how many migrations ran.
    fn from_connection(conn: Connection) -> Result<(Self, i32), DwtimerError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DwtimerError::Database(format!("Failed to enable foreign keys: {e}")))?;

        let db = Self { conn };
        let applied = db.migrate()?;

        Ok((db, applied))
    }

    /// Run database migrations.
    fn migrate(&self) -> Result<i32, DwtimerError> {
        migrations::run(&self.conn)
    }

    /// Open the database at `path` and report whether the schema had to be
    /// created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn initialize_at(path: &std::path::Path) -> Result<(Self, bool), DwtimerError> {
        let conn = Connection::open(path).map_err(|e| {
            DwtimerError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        let (db, applied) = Self::from_connection(conn)?;
        Ok((db, applied > 0))
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, DwtimerError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction; it rolls back unless committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, DwtimerError> {
        self.conn
            .transaction()
            .map_err(|e| DwtimerError::Database(format!("Failed to begin transaction: {e}")))
    }
}
