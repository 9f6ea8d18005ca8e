//! Flat backend on a single SQLite table.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{check_quota, FlatBackend};
use crate::error::{Result, StoreError};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL                 -- JSON written by the content store
);
"#;

/// Key-value store persisted in a SQLite file.
pub struct SqliteKv {
    conn: Mutex<Connection>,
    quota: usize,
}

impl SqliteKv {
    /// Open (or create) the store at an explicit path.
    pub fn open_at(path: &Path, quota: usize) -> Result<Self> {
        tracing::info!(path = %path.display(), quota, "opening flat store");

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn, quota)
    }

    /// A store that lives only as long as the handle.
    pub fn in_memory(quota: usize) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, quota)
    }

    fn init(conn: Connection, quota: usize) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
            quota,
        })
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.lock().ok()?.path().map(PathBuf::from)
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl FlatBackend for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let used: i64 = tx.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
             FROM kv
             WHERE key != ?1",
            params![key],
            |row| row.get(0),
        )?;
        check_quota(used as usize, key, value, self.quota)?;

        tx.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
