use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ObjectStore, ObjectStoreLocation, KNOWN_STORES};
use crate::error::{Result, StoreError};

#[derive(Debug, Default)]
struct ObjectTable {
    records: BTreeMap<i64, Value>,
    last_key: i64,
}

/// In-process object store.  Every `open` yields a fresh, empty store.
#[derive(Debug)]
pub struct MemoryObjectStore {
    tables: Mutex<HashMap<&'static str, ObjectTable>>,
}

impl MemoryObjectStore {
    fn with_table<T>(&self, store: &str, f: impl FnOnce(&mut ObjectTable) -> T) -> Result<T> {
        let mut tables = self.tables.lock().map_err(|_| StoreError::LockPoisoned)?;
        let table = tables
            .get_mut(store)
            .ok_or_else(|| StoreError::TransactionFailure(format!("no such object store: {store}")))?;
        Ok(f(table))
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn open(_location: &ObjectStoreLocation) -> Result<Self> {
        let tables = KNOWN_STORES
            .iter()
            .map(|name| (*name, ObjectTable::default()))
            .collect();
        Ok(Self {
            tables: Mutex::new(tables),
        })
    }

    async fn get_all(&self, store: &str) -> Result<Vec<(i64, Value)>> {
        self.with_table(store, |table| {
            table
                .records
                .iter()
                .map(|(key, value)| (*key, value.clone()))
                .collect()
        })
    }

    async fn add(&self, store: &str, value: Value) -> Result<i64> {
        self.with_table(store, |table| {
            table.last_key += 1;
            table.records.insert(table.last_key, value);
            table.last_key
        })
    }

    async fn delete(&self, store: &str, key: i64) -> Result<bool> {
        self.with_table(store, |table| table.records.remove(&key).is_some())
    }

    async fn clear(&self, store: &str) -> Result<()> {
        self.with_table(store, |table| table.records.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::PHOTOS_STORE;
    use serde_json::json;

    #[tokio::test]
    async fn test_clear_keeps_key_generator() {
        let store = MemoryObjectStore::open(&ObjectStoreLocation::Memory)
            .await
            .unwrap();

        let a = store.add(PHOTOS_STORE, json!(1)).await.unwrap();
        store.clear(PHOTOS_STORE).await.unwrap();
        let b = store.add(PHOTOS_STORE, json!(2)).await.unwrap();

        assert_eq!((a, b), (1, 2));
        assert_eq!(store.get_all(PHOTOS_STORE).await.unwrap(), vec![(2, json!(2))]);
    }
}
