//! SQLite session storage
//!
//! Sessions are stored as JSON documents keyed by sender, with the last
//! activity time duplicated into an indexed column for the expiry sweep.

use crate::session::Session;
use crate::store::{SessionStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    sender_id TEXT PRIMARY KEY,
    data TEXT NOT NULL,
    last_active_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_last_active ON sessions(last_active_ms);
";

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }

    pub fn get_session(&self, sender_id: &str) -> Result<Option<Session>, StoreError> {
        let conn = self.conn()?;
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM sessions WHERE sender_id = ?1",
                params![sender_id],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    pub fn upsert_session(&self, session: &Session) -> Result<(), StoreError> {
        let data = serde_json::to_string(session)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (sender_id, data, last_active_ms) VALUES (?1, ?2, ?3)
             ON CONFLICT(sender_id) DO UPDATE SET data = excluded.data,
                                                  last_active_ms = excluded.last_active_ms",
            params![
                session.sender_id,
                data,
                session.last_active_at.timestamp_millis()
            ],
        )?;
        Ok(())
    }

    pub fn delete_inactive_since(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "DELETE FROM sessions WHERE last_active_ms < ?1",
            params![cutoff.timestamp_millis()],
        )?;
        Ok(rows)
    }

    #[allow(dead_code)] // Used in tests
    pub fn count_sessions(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[async_trait]
impl SessionStore for Database {
    async fn load(&self, sender_id: &str) -> Result<Option<Session>, StoreError> {
        self.get_session(sender_id)
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.upsert_session(session)
    }

    async fn sweep_expired(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        self.delete_inactive_since(cutoff)
    }
}
