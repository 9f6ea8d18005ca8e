//! Object-store schema migrations.
//!
//! Migrations run every time the structured store is opened.  Each one is
//! guarded by the `user_version` pragma so it runs exactly once; this is the
//! upgrade path that creates object stores on first open.
//!
//! Changing the shape of stored records (not just tables) is done the same
//! way: add a `vNNN` module whose `up` rewrites the JSON values in place, and
//! bump [`OBJECT_DB_VERSION`].  Records are read back with serde defaults, so
//! purely additive optional fields need no migration at all.

pub mod v001_initial;

use rusqlite::Connection;
use sanctuary_shared::constants::OBJECT_DB_VERSION;

use crate::error::{Result, StoreError};

/// Run all pending migrations against the open connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::info!(
        current_version = current,
        target_version = OBJECT_DB_VERSION,
        "checking object store migrations"
    );

    if current > OBJECT_DB_VERSION {
        return Err(StoreError::UnsupportedSchema {
            found: current,
            supported: OBJECT_DB_VERSION,
        });
    }

    if current < 1 {
        tracing::info!("applying migration v001_initial");
        v001_initial::up(conn).map_err(|e| StoreError::Migration(e.to_string()))?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, OBJECT_DB_VERSION);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", OBJECT_DB_VERSION + 1)
            .unwrap();
        assert!(matches!(
            run_migrations(&conn),
            Err(StoreError::UnsupportedSchema { .. })
        ));
    }
}
