//! The add-photo flow: one draft, any number of uploaded files.
//!
//! Every file is encoded and stored on its own.  A file that fails is
//! reported and the rest of the batch carries on; photos stored before the
//! failure stay stored.

use sanctuary_shared::constants::{DEFAULT_PHOTO_MAX_WIDTH, DEFAULT_PHOTO_QUALITY};
use sanctuary_shared::imaging::resize_and_encode;
use sanctuary_shared::{PhotoContent, PhotoDraft, PhotoId, ValidationError};
use serde::Serialize;

use crate::content::ContentStore;
use crate::flat::FlatBackend;
use crate::objects::ObjectStore;

/// How uploaded files are downscaled before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoEncoding {
    pub max_width: u32,
    pub quality: u8,
}

impl Default for PhotoEncoding {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_PHOTO_MAX_WIDTH,
            quality: DEFAULT_PHOTO_QUALITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    /// Index of the file in the submitted batch.
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub added: Vec<PhotoId>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Store the photos described by `draft`.
///
/// With no files the draft's URL is stored as a single linked photo.  The
/// draft itself is validated up front; an invalid draft stores nothing.
pub async fn submit_photos<F, O>(
    store: &ContentStore<F, O>,
    draft: &PhotoDraft,
    files: &[Vec<u8>],
    encoding: PhotoEncoding,
) -> Result<BatchReport, ValidationError>
where
    F: FlatBackend,
    O: ObjectStore,
{
    draft.validate()?;
    let mut report = BatchReport::default();

    if files.is_empty() {
        let photo = draft.clone().into_link_photo()?;
        match store.add_photo(&photo).await {
            Ok(id) => report.added.push(id),
            Err(e) => report.failed.push(BatchFailure {
                index: 0,
                reason: e.to_string(),
            }),
        }
        return Ok(report);
    }

    for (index, bytes) in files.iter().enumerate() {
        let outcome = async {
            let data_url = resize_and_encode(bytes, encoding.max_width, encoding.quality)
                .map_err(|e| e.to_string())?;
            let photo = draft
                .with_content(PhotoContent::Embedded(data_url))
                .map_err(|e| e.to_string())?;
            store.add_photo(&photo).await.map_err(|e| e.to_string())
        }
        .await;

        match outcome {
            Ok(id) => report.added.push(id),
            Err(reason) => {
                tracing::debug!(index, %reason, "photo in batch failed");
                report.failed.push(BatchFailure { index, reason });
            }
        }
    }

    Ok(report)
}
