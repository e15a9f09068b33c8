//! Session storage.
//!
//! Persists finished sessions to the local database: one `tasks` row plus
//! its `distractions` and `pauses` rows, written in a single transaction.

use rusqlite::params;
use serde::Serialize;

use super::session::{Pause, Session};
use crate::error::DwtimerError;
use crate::storage::Database;

/// Destination for finished sessions.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore {
    /// Persist a finished session and return its new task id.
    ///
    /// # Errors
    ///
    /// Any error means the session was not saved.
    fn write_session(&mut self, session: &Session) -> Result<i64, DwtimerError>;
}

/// A session read back from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredSession {
    pub id: i64,
    pub objective: String,
    pub duration_seconds: i64,
    pub start_ts: i64,
    pub end_ts: Option<i64>,
    pub distractions: Vec<i64>,
    pub pauses: Vec<Pause>,
}

impl StoredSession {
    /// Wall-clock length including pauses, if the session was ended.
    #[must_use]
    pub fn wall_seconds(&self) -> Option<i64> {
        self.end_ts.map(|end| end - self.start_ts)
    }

    /// Total seconds spent paused.
    #[must_use]
    pub fn paused_seconds(&self) -> i64 {
        self.pauses.iter().map(Pause::seconds).sum()
    }

    /// True if the countdown ran for the full planned duration.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.wall_seconds()
            .is_some_and(|wall| wall - self.paused_seconds() >= self.duration_seconds)
    }
}

/// `SQLite`-backed session store.
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    /// Create a store over an existing database connection.
    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self { db }
    }

    /// Most recent sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the queries fail.
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredSession>, DwtimerError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(
                r"SELECT id, objective, duration_seconds, start_ts, end_ts
                  FROM tasks
                  ORDER BY start_ts DESC, id DESC
                  LIMIT ?1",
            )
            .map_err(|e| DwtimerError::Database(format!("Failed to prepare query: {e}")))?;

        #[allow(clippy::cast_possible_wrap)]
        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok(StoredSession {
                    id: row.get(0)?,
                    objective: row.get(1)?,
                    duration_seconds: row.get(2)?,
                    start_ts: row.get(3)?,
                    end_ts: row.get(4)?,
                    distractions: Vec::new(),
                    pauses: Vec::new(),
                })
            })
            .map_err(|e| DwtimerError::Database(format!("Failed to query sessions: {e}")))?;

        let mut sessions = Vec::new();
        for row in rows {
            let mut session = row.map_err(|e| DwtimerError::Database(e.to_string()))?;
            session.distractions = self.distractions_for(session.id)?;
            session.pauses = self.pauses_for(session.id)?;
            sessions.push(session);
        }

        Ok(sessions)
    }

    fn distractions_for(&self, task_id: i64) -> Result<Vec<i64>, DwtimerError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT ts FROM distractions WHERE task_id = ?1 ORDER BY ts, id")
            .map_err(|e| DwtimerError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([task_id], |row| row.get(0))
            .map_err(|e| DwtimerError::Database(format!("Failed to query distractions: {e}")))?;

        rows.collect::<Result<Vec<i64>, _>>()
            .map_err(|e| DwtimerError::Database(e.to_string()))
    }

    fn pauses_for(&self, task_id: i64) -> Result<Vec<Pause>, DwtimerError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT start_ts, end_ts FROM pauses WHERE task_id = ?1 ORDER BY start_ts, id")
            .map_err(|e| DwtimerError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([task_id], |row| {
                Ok(Pause {
                    start: row.get(0)?,
                    end: row.get(1)?,
                })
            })
            .map_err(|e| DwtimerError::Database(format!("Failed to query pauses: {e}")))?;

        rows.collect::<Result<Vec<Pause>, _>>()
            .map_err(|e| DwtimerError::Database(e.to_string()))
    }
}

impl SessionStore for SqliteSessionStore {
    fn write_session(&mut self, session: &Session) -> Result<i64, DwtimerError> {
        let Some(end_ts) = session.end_time() else {
            return Err(DwtimerError::InvalidInput(
                "refusing to store a session that has not ended".to_string(),
            ));
        };

        let tx = self.db.transaction()?;

        tx.execute(
            r"INSERT INTO tasks (objective, duration_seconds, start_ts, end_ts)
              VALUES (?1, ?2, ?3, ?4)",
            params![
                session.objective(),
                session.planned_duration_seconds(),
                session.start_time(),
                end_ts,
            ],
        )
        .map_err(|e| DwtimerError::Database(format!("Failed to insert task: {e}")))?;

        let task_id = tx.last_insert_rowid();

        {
            let mut insert = tx
                .prepare("INSERT INTO distractions (task_id, ts) VALUES (?1, ?2)")
                .map_err(|e| DwtimerError::Database(format!("Failed to prepare insert: {e}")))?;
            for ts in session.distraction_log() {
                insert
                    .execute(params![task_id, ts])
                    .map_err(|e| DwtimerError::Database(format!("Failed to insert distraction: {e}")))?;
            }
        }

        {
            let mut insert = tx
                .prepare("INSERT INTO pauses (task_id, start_ts, end_ts) VALUES (?1, ?2, ?3)")
                .map_err(|e| DwtimerError::Database(format!("Failed to prepare insert: {e}")))?;
            for pause in session.pauses() {
                insert
                    .execute(params![task_id, pause.start, pause.end])
                    .map_err(|e| DwtimerError::Database(format!("Failed to insert pause: {e}")))?;
            }
        }

        tx.commit()
            .map_err(|e| DwtimerError::Database(format!("Failed to commit session: {e}")))?;

        tracing::info!(
            task_id,
            distractions = session.distraction_log().len(),
            pauses = session.pauses().len(),
            "session stored"
        );
        Ok(task_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::focus::clock::ManualClock;

    const T0: u64 = 1_700_000_000;

    fn create_test_store() -> SqliteSessionStore {
        let db = Database::open_in_memory().unwrap();
        SqliteSessionStore::with_database(db)
    }

    fn finished_session(objective: &str, clock: &Arc<ManualClock>) -> Session {
        let mut session = Session::new(objective, 120, clock.clone()).unwrap();
        clock.advance(Duration::from_secs(5));
        session.register_distraction().unwrap();
        session.start_pause().unwrap();
        clock.advance(Duration::from_secs(10));
        session.end_pause().unwrap();
        clock.advance(Duration::from_secs(20));
        session.end().unwrap();
        session
    }

    #[test]
    fn test_write_and_read_back() {
        let mut store = create_test_store();
        let clock = Arc::new(ManualClock::at(T0));
        let session = finished_session("Write report", &clock);

        let id = store.write_session(&session).unwrap();

        let stored = store.recent(10).unwrap();
        assert_eq!(stored.len(), 1);
        let row = &stored[0];
        assert_eq!(row.id, id);
        assert_eq!(row.objective, "Write report");
        assert_eq!(row.duration_seconds, 120);
        assert_eq!(row.start_ts, T0 as i64);
        assert_eq!(row.end_ts, Some(T0 as i64 + 35));
        assert_eq!(row.distractions, vec![T0 as i64 + 5]);
        assert_eq!(
            row.pauses,
            vec![Pause { start: T0 as i64 + 5, end: T0 as i64 + 15 }]
        );
        assert_eq!(row.paused_seconds(), 10);
        assert!(!row.completed());
    }

    #[test]
    fn test_write_empty_session() {
        let mut store = create_test_store();
        let clock = Arc::new(ManualClock::at(T0));
        let mut session = Session::new("Nothing happened", 60, clock.clone()).unwrap();
        clock.advance(Duration::from_secs(60));
        session.end().unwrap();

        store.write_session(&session).unwrap();

        let stored = store.recent(1).unwrap();
        assert!(stored[0].distractions.is_empty());
        assert!(stored[0].pauses.is_empty());
        assert!(stored[0].completed());
    }

    #[test]
    fn test_ids_are_fresh() {
        let mut store = create_test_store();
        let clock = Arc::new(ManualClock::at(T0));

        let first = store
            .write_session(&finished_session("one", &clock))
            .unwrap();
        let second = store
            .write_session(&finished_session("two", &clock))
            .unwrap();
        assert!(second > first);

        // Child rows are attached to the right task.
        let stored = store.recent(10).unwrap();
        assert_eq!(stored[0].objective, "two");
        assert_eq!(stored[0].distractions.len(), 1);
        assert_eq!(stored[1].objective, "one");
        assert_eq!(stored[1].distractions.len(), 1);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut store = create_test_store();
        let clock = Arc::new(ManualClock::at(T0));

        let first = store
            .write_session(&finished_session("one", &clock))
            .unwrap();
        {
            let conn = store.db.connection();
            conn.execute("DELETE FROM distractions WHERE task_id = ?1", [first])
                .unwrap();
            conn.execute("DELETE FROM pauses WHERE task_id = ?1", [first])
                .unwrap();
            conn.execute("DELETE FROM tasks WHERE id = ?1", [first]).unwrap();
        }

        let second = store
            .write_session(&finished_session("two", &clock))
            .unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_unfinished_session_rejected() {
        let mut store = create_test_store();
        let clock = Arc::new(ManualClock::at(T0));
        let session = Session::new("still running", 60, clock).unwrap();

        assert!(store.write_session(&session).is_err());
        assert!(store.recent(10).unwrap().is_empty());
    }

    #[test]
    fn test_recent_limit() {
        let mut store = create_test_store();
        let clock = Arc::new(ManualClock::at(T0));
        for i in 0..5 {
            store
                .write_session(&finished_session(&format!("task {i}"), &clock))
                .unwrap();
        }

        let recent = store.recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].objective, "task 4");
    }
}
