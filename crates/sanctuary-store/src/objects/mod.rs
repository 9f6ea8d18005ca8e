//! Structured object-store backend.
//!
//! Records are JSON values kept per named object store under integer keys
//! that the backend assigns.  Keys only ever increase and are never handed
//! out twice, not even after `clear`.

mod memory;
mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

pub use memory::MemoryObjectStore;
pub use sqlite::SqliteObjectStore;

use crate::error::Result;

/// Object stores created by the upgrade path.
pub const PHOTOS_STORE: &str = "photos";

pub(crate) const KNOWN_STORES: &[&str] = &[PHOTOS_STORE];

/// Where a structured store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectStoreLocation {
    Path(PathBuf),
    Memory,
}

#[async_trait]
pub trait ObjectStore: Send + Sync + Sized + 'static {
    /// Open the store, creating object stores on first use.  Failures here
    /// surface as [`crate::StoreError::BackendUnavailable`].
    async fn open(location: &ObjectStoreLocation) -> Result<Self>;

    /// Every record in `store`, in ascending key order.
    async fn get_all(&self, store: &str) -> Result<Vec<(i64, Value)>>;

    /// Insert `value` and return its freshly assigned key.
    async fn add(&self, store: &str, value: Value) -> Result<i64>;

    /// Returns `false` if no record had that key.
    async fn delete(&self, store: &str, key: i64) -> Result<bool>;

    /// Remove every record.  The key generator is not reset.
    async fn clear(&self, store: &str) -> Result<()>;
}
