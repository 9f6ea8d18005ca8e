use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::Value;

use super::{ObjectStore, ObjectStoreLocation, KNOWN_STORES};
use crate::error::{Result, StoreError};
use crate::migrations;

/// Object store backed by a SQLite file, one table per object store.
///
/// rusqlite is blocking, so every operation runs on the blocking pool and is
/// a single statement: each `add` or `delete` commits on its own.
#[derive(Clone)]
pub struct SqliteObjectStore {
    conn: Arc<Mutex<Connection>>,
}

#[async_trait]
impl ObjectStore for SqliteObjectStore {
    async fn open(location: &ObjectStoreLocation) -> Result<Self> {
        let location = location.clone();
        let conn = tokio::task::spawn_blocking(move || open_connection(&location))
            .await
            .map_err(|e| StoreError::BackendUnavailable(e.to_string()))?
            .map_err(|e| match e {
                e @ StoreError::UnsupportedSchema { .. } => e,
                other => StoreError::BackendUnavailable(other.to_string()),
            })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn get_all(&self, store: &str) -> Result<Vec<(i64, Value)>> {
        let sql = format!("SELECT id, value FROM {} ORDER BY id ASC", table(store)?);
        self.run("get_all", move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut objects = Vec::new();
            for row in rows {
                let (id, raw) = row?;
                match serde_json::from_str(&raw) {
                    Ok(value) => objects.push((id, value)),
                    Err(e) => tracing::warn!(id, error = %e, "skipping unreadable object"),
                }
            }
            Ok(objects)
        })
        .await
    }

    async fn add(&self, store: &str, value: Value) -> Result<i64> {
        let sql = format!("INSERT INTO {} (value) VALUES (?1)", table(store)?);
        let key = self
            .run("add", move |conn| {
                conn.execute(&sql, params![value.to_string()])?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        tracing::debug!(store, key, "added object");
        Ok(key)
    }

    async fn delete(&self, store: &str, key: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table(store)?);
        let affected = self
            .run("delete", move |conn| conn.execute(&sql, params![key]))
            .await?;
        Ok(affected > 0)
    }

    async fn clear(&self, store: &str) -> Result<()> {
        let sql = format!("DELETE FROM {}", table(store)?);
        self.run("clear", move |conn| conn.execute(&sql, []))
            .await?;
        Ok(())
    }
}

impl SqliteObjectStore {
    async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&conn).map_err(|e| StoreError::TransactionFailure(format!("{op}: {e}")))
        })
        .await
        .map_err(|e| StoreError::TransactionFailure(format!("{op}: {e}")))?
    }
}

fn open_connection(location: &ObjectStoreLocation) -> Result<Connection> {
    let conn = match location {
        ObjectStoreLocation::Path(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            tracing::info!(path = %path.display(), "opening object store");
            let conn = Connection::open(path)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn
        }
        ObjectStoreLocation::Memory => Connection::open_in_memory()?,
    };

    migrations::run_migrations(&conn)?;
    Ok(conn)
}

// Table names come from a fixed list, never from caller text.
fn table(store: &str) -> Result<&'static str> {
    KNOWN_STORES
        .iter()
        .copied()
        .find(|known| *known == store)
        .ok_or_else(|| StoreError::TransactionFailure(format!("no such object store: {store}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::PHOTOS_STORE;
    use serde_json::json;
    use tempfile::TempDir;

    async fn test_store() -> (SqliteObjectStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let location = ObjectStoreLocation::Path(dir.path().join("objects.db"));
        let store = SqliteObjectStore::open(&location).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_add_assigns_increasing_keys() {
        let (store, _dir) = test_store().await;

        let a = store.add(PHOTOS_STORE, json!({"n": 1})).await.unwrap();
        let b = store.add(PHOTOS_STORE, json!({"n": 2})).await.unwrap();
        assert_eq!((a, b), (1, 2));

        let all = store.get_all(PHOTOS_STORE).await.unwrap();
        assert_eq!(all, vec![(1, json!({"n": 1})), (2, json!({"n": 2}))]);
    }

    #[tokio::test]
    async fn test_keys_not_reused_after_delete_or_clear() {
        let (store, _dir) = test_store().await;

        let a = store.add(PHOTOS_STORE, json!("a")).await.unwrap();
        assert!(store.delete(PHOTOS_STORE, a).await.unwrap());
        let b = store.add(PHOTOS_STORE, json!("b")).await.unwrap();
        assert!(b > a);

        store.clear(PHOTOS_STORE).await.unwrap();
        assert!(store.get_all(PHOTOS_STORE).await.unwrap().is_empty());
        let c = store.add(PHOTOS_STORE, json!("c")).await.unwrap();
        assert!(c > b);
    }

    #[tokio::test]
    async fn test_unreadable_row_is_skipped() {
        let (store, _dir) = test_store().await;
        store.add(PHOTOS_STORE, json!("a")).await.unwrap();
        store
            .run("insert", |conn| {
                conn.execute("INSERT INTO photos (value) VALUES ('{not json')", [])
                    .map(|_| ())
            })
            .await
            .unwrap();
        store.add(PHOTOS_STORE, json!("c")).await.unwrap();

        let all = store.get_all(PHOTOS_STORE).await.unwrap();
        assert_eq!(all, vec![(1, json!("a")), (3, json!("c"))]);
    }

    #[tokio::test]
    async fn test_delete_missing_key() {
        let (store, _dir) = test_store().await;
        assert!(!store.delete(PHOTOS_STORE, 42).await.unwrap());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let location = ObjectStoreLocation::Path(dir.path().join("objects.db"));

        {
            let store = SqliteObjectStore::open(&location).await.unwrap();
            store.add(PHOTOS_STORE, json!({"kept": true})).await.unwrap();
        }

        let store = SqliteObjectStore::open(&location).await.unwrap();
        let all = store.get_all(PHOTOS_STORE).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_store_is_transaction_failure() {
        let store = SqliteObjectStore::open(&ObjectStoreLocation::Memory)
            .await
            .unwrap();
        assert!(matches!(
            store.add("videos", json!({})).await,
            Err(StoreError::TransactionFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_open_failure_is_backend_unavailable() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let location = ObjectStoreLocation::Path(file.join("objects.db"));
        assert!(matches!(
            SqliteObjectStore::open(&location).await,
            Err(StoreError::BackendUnavailable(_))
        ));
    }
}
