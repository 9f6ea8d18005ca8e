//! Text entries in the flat collections (`memories`, `awesome`).
//!
//! Each collection is one JSON list under the collection's name; every
//! change reads the list, edits it and writes it back whole.

use sanctuary_shared::{BackendKind, Collection, Entry, EntryId, StoredEntry};

use crate::content::ContentStore;
use crate::error::{Result, StoreError};
use crate::flat::FlatBackend;
use crate::objects::ObjectStore;

fn flat_key(collection: Collection) -> Result<&'static str> {
    match collection.backend() {
        BackendKind::Flat => Ok(collection.as_str()),
        BackendKind::Structured => Err(StoreError::WrongCollection {
            collection,
            what: "a text entry",
        }),
    }
}

impl<F: FlatBackend, O: ObjectStore> ContentStore<F, O> {
    /// List entries in insertion order.  A collection that cannot be
    /// decoded lists as empty.
    pub fn list_entries(&self, collection: Collection) -> Result<Vec<StoredEntry>> {
        let key = flat_key(collection)?;
        let entries = match self.read_entries(key) {
            Ok(entries) => entries,
            Err(StoreError::Corrupt { key, source }) => {
                tracing::warn!(%key, error = %source, "unreadable collection, listing as empty");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(position, entry)| StoredEntry { position, entry })
            .collect())
    }

    /// Append an entry.  On [`StoreError::StorageFull`] the collection is
    /// left as it was.
    pub fn add_entry(&self, collection: Collection, entry: Entry) -> Result<EntryId> {
        let key = flat_key(collection)?;
        let _writes = self.lock_writes()?;

        let mut entries = self.read_entries(key)?;
        let id = entry.id;
        entries.push(entry);
        self.write_entries(key, &entries)?;

        tracing::debug!(%collection, %id, count = entries.len(), "added entry");
        Ok(id)
    }

    /// Delete the entry currently at `position`; later entries move up one.
    pub fn delete_entry_at(&self, collection: Collection, position: usize) -> Result<bool> {
        self.remove_entry(collection, |entries| {
            (position < entries.len()).then_some(position)
        })
    }

    pub fn delete_entry(&self, collection: Collection, id: EntryId) -> Result<bool> {
        self.remove_entry(collection, |entries| entries.iter().position(|e| e.id == id))
    }

    fn remove_entry(
        &self,
        collection: Collection,
        find: impl FnOnce(&[Entry]) -> Option<usize>,
    ) -> Result<bool> {
        let key = flat_key(collection)?;
        let _writes = self.lock_writes()?;

        let mut entries = self.read_entries(key)?;
        let Some(index) = find(&entries) else {
            return Ok(false);
        };
        let removed = entries.remove(index);
        self.write_entries(key, &entries)?;

        tracing::debug!(%collection, id = %removed.id, position = index, "deleted entry");
        Ok(true)
    }

    fn read_entries(&self, key: &str) -> Result<Vec<Entry>> {
        match self.flat.get(key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write_entries(&self, key: &str, entries: &[Entry]) -> Result<()> {
        self.flat.set(key, &serde_json::to_string(entries)?)
    }
}
