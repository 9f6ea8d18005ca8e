//! Flat key-value blob backend.
//!
//! A key maps to one text value and the backend knows nothing about its
//! structure: callers serialize a whole collection into a single value and
//! rewrite it on every change. Writes are checked against a byte quota
//! before anything is stored, so a rejected write leaves the old value.

mod memory;
mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

use crate::error::{Result, StoreError};

/// Synchronous key-to-text store.
pub trait FlatBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Fails with [`StoreError::StorageFull`] if the write would exceed the
    /// quota.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

// Space is counted as key bytes + value bytes across all keys, with the
// previous value of `key` replaced by the new one.
pub(crate) fn check_quota(used_by_others: usize, key: &str, value: &str, quota: usize) -> Result<()> {
    let needed = used_by_others + key.len() + value.len();
    if needed > quota {
        return Err(StoreError::StorageFull { needed, quota });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_quota_boundary() {
        assert!(check_quota(0, "k", "1234", 5).is_ok());
        assert!(matches!(
            check_quota(1, "k", "1234", 5),
            Err(StoreError::StorageFull { needed: 6, quota: 5 })
        ));
    }
}
