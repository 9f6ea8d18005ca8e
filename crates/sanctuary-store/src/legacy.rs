//! One-time move of photos from the flat store into the object store.
//!
//! Older profiles kept photos as a JSON list under the `photos` flat key.
//! The move runs until it completes once; after that the state record's
//! flag keeps it from ever running again, whatever the object store holds.

use sanctuary_shared::{Collection, Photo};

use crate::content::ContentStore;
use crate::error::Result;
use crate::flat::FlatBackend;
use crate::objects::{ObjectStore, PHOTOS_STORE};

impl<F: FlatBackend, O: ObjectStore> ContentStore<F, O> {
    /// Copy legacy photos into the object store and clear the legacy key.
    /// Returns how many photos were moved by this call.
    ///
    /// The legacy list is rewritten after every copied photo, so a failure
    /// partway through leaves only the uncopied photos behind and a retry
    /// never duplicates.
    pub async fn migrate_legacy_photos(&self) -> Result<usize> {
        if self.state()?.legacy_photos_migrated {
            tracing::debug!("legacy photos already migrated");
            return Ok(0);
        }

        let key = Collection::Photos.as_str();
        let mut remaining: Vec<Photo> = match self.flat.get(key)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Photo>>(&raw) {
                Ok(photos) => photos.into_iter().map(without_empty_caption).collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "legacy photos unreadable, leaving them in place");
                    Vec::new()
                }
            },
        };

        let total = remaining.len();
        if total > 0 {
            tracing::info!(count = total, "migrating legacy photos");
            let objects = self.objects().await?;

            while let Some(photo) = remaining.first() {
                let id = objects
                    .add(PHOTOS_STORE, serde_json::to_value(photo)?)
                    .await?;

                let shortened = self.drop_first_legacy_photo(key, &remaining);
                if let Err(e) = shortened {
                    // The photo is still listed as legacy, so it must not
                    // stay in the object store as well.
                    if let Err(undo) = objects.delete(PHOTOS_STORE, id).await {
                        tracing::warn!(id, error = %undo, "could not take back copied legacy photo");
                    }
                    return Err(e);
                }
                remaining.remove(0);
            }
        }

        {
            let _writes = self.lock_writes()?;
            self.update_state(|state| state.legacy_photos_migrated = true)?;
        }

        tracing::info!(migrated = total, "legacy photo migration complete");
        Ok(total)
    }

    fn drop_first_legacy_photo(&self, key: &str, remaining: &[Photo]) -> Result<()> {
        let _writes = self.lock_writes()?;
        match remaining.get(1..) {
            Some(rest) if !rest.is_empty() => self.flat.set(key, &serde_json::to_string(rest)?),
            _ => self.flat.remove(key),
        }
    }
}

// Older versions stored an empty caption as "".
fn without_empty_caption(mut photo: Photo) -> Photo {
    if photo.caption.as_deref().is_some_and(|c| c.trim().is_empty()) {
        photo.caption = None;
    }
    photo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tests::{test_store, test_store_with, TestStore};
    use crate::content::ContentStore;
    use crate::error::StoreError;
    use crate::flat::MemoryKv;
    use crate::objects::{MemoryObjectStore, ObjectStoreLocation};
    use async_trait::async_trait;
    use sanctuary_shared::constants::DEFAULT_FLAT_QUOTA;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, Ordering};

    const LEGACY: &str = r#"[
        {"author":"Ann","content":"data:image/png;base64,AAAA","caption":"beach","date":"2023-07-01"},
        {"author":"Bo","content":"https://example.com/b.jpg","caption":"","date":"2023-08-01"}
    ]"#;

    fn legacy_kv(raw: &str) -> MemoryKv {
        let kv = MemoryKv::new(DEFAULT_FLAT_QUOTA);
        kv.set("photos", raw).unwrap();
        kv
    }

    #[tokio::test]
    async fn test_open_moves_legacy_photos() {
        let store = test_store_with(legacy_kv(LEGACY)).await;

        let photos = store.list_photos().await.unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].photo.author, "Ann");
        assert!(photos[0].photo.content.is_embedded());
        assert_eq!(photos[0].photo.caption.as_deref(), Some("beach"));
        assert_eq!(photos[0].photo.date, "2023-07-01");
        assert_eq!(photos[1].photo.caption, None);

        assert_eq!(store.flat().get("photos").unwrap(), None);
        assert!(store.state().unwrap().legacy_photos_migrated);
    }

    #[tokio::test]
    async fn test_no_legacy_photos_sets_flag() {
        let store = test_store().await;
        assert!(store.state().unwrap().legacy_photos_migrated);
        assert!(store.list_photos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_run_never_duplicates() {
        let store: TestStore = test_store_with(legacy_kv(LEGACY)).await;

        // New legacy data appearing later is not picked up.
        store.flat().set("photos", LEGACY).unwrap();
        assert_eq!(store.migrate_legacy_photos().await.unwrap(), 0);
        assert_eq!(store.list_photos().await.unwrap().len(), 2);

        // Nor does clearing the object store re-arm the migration.
        store.objects().await.unwrap().clear(PHOTOS_STORE).await.unwrap();
        assert_eq!(store.migrate_legacy_photos().await.unwrap(), 0);
        assert!(store.list_photos().await.unwrap().is_empty());
    }

    /// Refuses any record whose author is "boom".
    struct PickyObjects(MemoryObjectStore);

    #[async_trait]
    impl ObjectStore for PickyObjects {
        async fn open(location: &ObjectStoreLocation) -> crate::Result<Self> {
            Ok(Self(MemoryObjectStore::open(location).await?))
        }

        async fn get_all(&self, store: &str) -> crate::Result<Vec<(i64, Value)>> {
            self.0.get_all(store).await
        }

        async fn add(&self, store: &str, value: Value) -> crate::Result<i64> {
            if value["author"] == json!("boom") {
                return Err(StoreError::TransactionFailure("refused".into()));
            }
            self.0.add(store, value).await
        }

        async fn delete(&self, store: &str, key: i64) -> crate::Result<bool> {
            self.0.delete(store, key).await
        }

        async fn clear(&self, store: &str) -> crate::Result<()> {
            self.0.clear(store).await
        }
    }

    #[tokio::test]
    async fn test_partial_failure_resumes_without_duplicates() {
        let kv = legacy_kv(
            r#"[
                {"author":"Ann","content":"https://example.com/a.jpg","date":"2023-01-01"},
                {"author":"boom","content":"https://example.com/x.jpg","date":"2023-01-02"},
                {"author":"Cy","content":"https://example.com/c.jpg","date":"2023-01-03"}
            ]"#,
        );
        let store: ContentStore<MemoryKv, PickyObjects> =
            ContentStore::open(kv, ObjectStoreLocation::Memory).await.unwrap();

        // Open survived the failure; only the first photo moved.
        assert!(!store.state().unwrap().legacy_photos_migrated);
        assert_eq!(store.list_photos().await.unwrap().len(), 1);
        let left: Vec<Photo> =
            serde_json::from_str(&store.flat().get("photos").unwrap().unwrap()).unwrap();
        assert_eq!(left.len(), 2);
        assert_eq!(left[0].author, "boom");

        // Fix the offending record and retry.
        let fixed = r#"[
            {"author":"Di","content":"https://example.com/x.jpg","date":"2023-01-02"},
            {"author":"Cy","content":"https://example.com/c.jpg","date":"2023-01-03"}
        ]"#;
        store.flat().set("photos", fixed).unwrap();
        assert_eq!(store.migrate_legacy_photos().await.unwrap(), 2);

        let authors: Vec<String> = store
            .list_photos()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.photo.author)
            .collect();
        assert_eq!(authors, vec!["Ann", "Di", "Cy"]);
        assert_eq!(store.flat().get("photos").unwrap(), None);
        assert!(store.state().unwrap().legacy_photos_migrated);
    }

    /// Flat store whose writes to the legacy key fail while `refuse` is set.
    struct StuckLegacyKey {
        inner: MemoryKv,
        refuse: AtomicBool,
    }

    impl FlatBackend for StuckLegacyKey {
        fn get(&self, key: &str) -> crate::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> crate::Result<()> {
            if key == "photos" && self.refuse.load(Ordering::SeqCst) {
                return Err(StoreError::StorageFull { needed: 1, quota: 0 });
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> crate::Result<()> {
            self.inner.remove(key)
        }
    }

    #[tokio::test]
    async fn test_failed_progress_write_takes_the_copy_back() {
        let flat = StuckLegacyKey {
            inner: legacy_kv(
                r#"[
                    {"author":"Ann","content":"https://example.com/a.jpg","date":"2023-01-01"},
                    {"author":"Bo","content":"https://example.com/b.jpg","date":"2023-01-02"},
                    {"author":"Cy","content":"https://example.com/c.jpg","date":"2023-01-03"}
                ]"#,
            ),
            refuse: AtomicBool::new(true),
        };
        let store: ContentStore<StuckLegacyKey, MemoryObjectStore> =
            ContentStore::open(flat, ObjectStoreLocation::Memory).await.unwrap();

        assert!(!store.state().unwrap().legacy_photos_migrated);
        assert!(store.list_photos().await.unwrap().is_empty());

        store.flat().refuse.store(false, Ordering::SeqCst);
        assert_eq!(store.migrate_legacy_photos().await.unwrap(), 3);

        let authors: Vec<String> = store
            .list_photos()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.photo.author)
            .collect();
        assert_eq!(authors, vec!["Ann", "Bo", "Cy"]);
    }

    #[tokio::test]
    async fn test_unreadable_legacy_data_is_left_alone() {
        let store = test_store_with(legacy_kv("not json")).await;
        assert!(store.state().unwrap().legacy_photos_migrated);
        assert_eq!(store.flat().get("photos").unwrap().as_deref(), Some("not json"));
        assert!(store.list_photos().await.unwrap().is_empty());
    }
}
