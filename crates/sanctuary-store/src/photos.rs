//! Photos, kept in the structured object store.

use sanctuary_shared::{Photo, PhotoId, StoredPhoto};

use crate::content::ContentStore;
use crate::error::Result;
use crate::flat::FlatBackend;
use crate::objects::{ObjectStore, PHOTOS_STORE};

impl<F: FlatBackend, O: ObjectStore> ContentStore<F, O> {
    /// All photos in ascending id order.  Records that no longer decode as a
    /// photo are skipped.
    pub async fn list_photos(&self) -> Result<Vec<StoredPhoto>> {
        let records = self.objects().await?.get_all(PHOTOS_STORE).await?;

        let mut photos = Vec::with_capacity(records.len());
        for (key, value) in records {
            match serde_json::from_value::<Photo>(value) {
                Ok(photo) => photos.push(StoredPhoto {
                    id: PhotoId(key),
                    photo,
                }),
                Err(e) => tracing::warn!(key, error = %e, "skipping unreadable photo record"),
            }
        }
        Ok(photos)
    }

    /// Store one photo in its own transaction and return its new id.
    pub async fn add_photo(&self, photo: &Photo) -> Result<PhotoId> {
        let value = serde_json::to_value(photo)?;
        let key = self.objects().await?.add(PHOTOS_STORE, value).await?;

        tracing::debug!(id = key, embedded = photo.content.is_embedded(), "added photo");
        Ok(PhotoId(key))
    }

    pub async fn delete_photo(&self, id: PhotoId) -> Result<bool> {
        let deleted = self.objects().await?.delete(PHOTOS_STORE, id.0).await?;
        tracing::debug!(%id, deleted, "deleted photo");
        Ok(deleted)
    }
}
