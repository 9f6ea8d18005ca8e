//! The content store: one entry point over the three collections.
//!
//! [`ContentStore::open`] reads the versioned state record and brings the
//! profile up to date before handing out the store.  Which backend serves a
//! collection is decided by [`Collection::backend`] and nowhere else; the
//! typed helpers live in `entries.rs`, `photos.rs` and `legacy.rs`.

use std::sync::{Mutex, MutexGuard};

use sanctuary_shared::constants::FLAT_SCHEMA_VERSION;
use sanctuary_shared::{
    BackendKind, Collection, Entry, EntryId, Photo, PhotoId, StoredEntry, StoredPhoto,
};
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::error::{Result, StoreError};
use crate::flat::{FlatBackend, SqliteKv};
use crate::location::DataDir;
use crate::objects::{ObjectStore, ObjectStoreLocation, SqliteObjectStore};
use crate::state::StoreState;

/// A record to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Entry(Entry),
    Photo(Photo),
}

/// A record as listed, with the key that deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StoredRecord {
    Entry(StoredEntry),
    Photo(StoredPhoto),
}

/// Identifies one record for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    /// Zero-based display position in a flat collection, as of the request.
    Position(usize),
    /// Stable id of a flat-collection entry.
    Entry(EntryId),
    Photo(PhotoId),
}

pub struct ContentStore<F, O> {
    pub(crate) flat: F,
    location: ObjectStoreLocation,
    objects: OnceCell<O>,
    state: Mutex<StoreState>,
    // Serializes read-modify-write cycles on the flat backend.
    writes: Mutex<()>,
}

/// The on-disk store used outside tests.
pub type SqliteContentStore = ContentStore<SqliteKv, SqliteObjectStore>;

impl SqliteContentStore {
    /// Open both backends inside `dir`, creating it if needed.
    pub async fn open_dir(dir: &DataDir, flat_quota: usize) -> Result<Self> {
        dir.ensure()?;
        let flat = SqliteKv::open_at(&dir.flat_path(), flat_quota)?;
        Self::open(flat, dir.objects_location()).await
    }
}

impl<F: FlatBackend, O: ObjectStore> ContentStore<F, O> {
    /// Wrap `flat` and the object store at `location`.  The object store is
    /// opened lazily on first photo access unless legacy photos need moving.
    ///
    /// A failed legacy migration or entry id backfill does not fail the
    /// open; both are retried on the next open (the migration also on an
    /// explicit [`Self::migrate_legacy_photos`] call).
    pub async fn open(flat: F, location: ObjectStoreLocation) -> Result<Self> {
        let state = StoreState::load(&flat)?;
        tracing::info!(
            schema_version = state.schema_version,
            legacy_photos_migrated = state.legacy_photos_migrated,
            "opening content store"
        );

        let store = Self {
            flat,
            location,
            objects: OnceCell::new(),
            state: Mutex::new(state),
            writes: Mutex::new(()),
        };

        // Moving legacy photos out first frees flat space for the backfill.
        if let Err(e) = store.migrate_legacy_photos().await {
            tracing::warn!(error = %e, "legacy photo migration did not finish");
        }
        if let Err(e) = store.upgrade_flat_schema() {
            tracing::warn!(error = %e, "entry id backfill did not finish");
        }

        Ok(store)
    }

    /// The flat backend, for collaborators that keep their own keys there.
    pub fn flat(&self) -> &F {
        &self.flat
    }

    pub fn state(&self) -> Result<StoreState> {
        Ok(*self.state.lock().map_err(|_| StoreError::LockPoisoned)?)
    }

    // ------------------------------------------------------------------
    // Collection-level API
    // ------------------------------------------------------------------

    /// Every record of `collection` in display order.
    pub async fn list_all(&self, collection: Collection) -> Result<Vec<StoredRecord>> {
        match collection.backend() {
            BackendKind::Flat => Ok(self
                .list_entries(collection)?
                .into_iter()
                .map(StoredRecord::Entry)
                .collect()),
            BackendKind::Structured => Ok(self
                .list_photos()
                .await?
                .into_iter()
                .map(StoredRecord::Photo)
                .collect()),
        }
    }

    /// Append `record` to `collection` and return its key.
    pub async fn add(&self, collection: Collection, record: Record) -> Result<RecordKey> {
        match (collection.backend(), record) {
            (BackendKind::Flat, Record::Entry(entry)) => {
                self.add_entry(collection, entry).map(RecordKey::Entry)
            }
            (BackendKind::Structured, Record::Photo(photo)) => {
                self.add_photo(&photo).await.map(RecordKey::Photo)
            }
            (_, Record::Entry(_)) => Err(StoreError::WrongCollection {
                collection,
                what: "a text entry",
            }),
            (_, Record::Photo(_)) => Err(StoreError::WrongCollection {
                collection,
                what: "a photo",
            }),
        }
    }

    /// Remove one record.  Returns `false` when nothing matched `key`.
    pub async fn delete(&self, collection: Collection, key: RecordKey) -> Result<bool> {
        match (collection.backend(), key) {
            (BackendKind::Flat, RecordKey::Position(position)) => {
                self.delete_entry_at(collection, position)
            }
            (BackendKind::Flat, RecordKey::Entry(id)) => self.delete_entry(collection, id),
            (BackendKind::Structured, RecordKey::Photo(id)) => self.delete_photo(id).await,
            _ => Err(StoreError::WrongCollection {
                collection,
                what: "this kind of key",
            }),
        }
    }

    // ------------------------------------------------------------------
    // Internals shared by the typed helpers
    // ------------------------------------------------------------------

    pub(crate) fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.writes.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Persist a modified state record; memory is only updated once the
    /// write succeeded.
    pub(crate) fn update_state(&self, f: impl FnOnce(&mut StoreState)) -> Result<()> {
        let mut current = self.state.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut next = *current;
        f(&mut next);
        next.save(&self.flat)?;
        *current = next;
        Ok(())
    }

    pub(crate) async fn objects(&self) -> Result<&O> {
        self.objects
            .get_or_try_init(|| O::open(&self.location))
            .await
    }

    // Schema 1 entries carry no id; give each one a stable id once.  The
    // version is only bumped after every readable collection was rewritten.
    fn upgrade_flat_schema(&self) -> Result<()> {
        if self.state()?.schema_version >= FLAT_SCHEMA_VERSION {
            return Ok(());
        }

        let _writes = self.lock_writes()?;
        for collection in [Collection::Memories, Collection::Awesome] {
            let key = collection.as_str();
            let Some(raw) = self.flat.get(key)? else {
                continue;
            };

            match serde_json::from_str::<Vec<Entry>>(&raw) {
                Ok(entries) => {
                    self.flat.set(key, &serde_json::to_string(&entries)?)?;
                    tracing::info!(%collection, count = entries.len(), "assigned stable entry ids");
                }
                Err(e) => {
                    tracing::warn!(%collection, error = %e, "leaving unreadable collection untouched");
                }
            }
        }

        self.update_state(|state| state.schema_version = FLAT_SCHEMA_VERSION)
    }
}
