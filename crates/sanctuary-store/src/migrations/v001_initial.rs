//! v001 -- Initial schema creation.
//!
//! Creates the `photos` object store.  AUTOINCREMENT keeps SQLite from
//! handing out a key again after the highest row is deleted or the table is
//! cleared.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL                      -- JSON-encoded photo record
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
