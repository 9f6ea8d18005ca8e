//! Versioned store-state record kept in the flat backend.

use sanctuary_shared::constants::{FLAT_SCHEMA_VERSION, LEGACY_MIGRATED_FLAG_KEY, STATE_KEY};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::flat::FlatBackend;

/// What has already been done to this profile's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    /// Shape of the flat collections, see [`FLAT_SCHEMA_VERSION`].
    pub schema_version: u32,
    /// Legacy photos have been moved to the object store. Once set, never
    /// cleared.
    #[serde(default)]
    pub legacy_photos_migrated: bool,
}

impl Default for StoreState {
    // Profiles written before the record existed: entries
    // have no ids and photos may still live in the flat store.
    fn default() -> Self {
        Self {
            schema_version: 1,
            legacy_photos_migrated: false,
        }
    }
}

impl StoreState {
    /// Read the record.  A missing or unreadable record means nothing has
    /// been done yet; every step it guards is safe to repeat.
    pub fn load(flat: &impl FlatBackend) -> Result<Self> {
        let mut state = match flat.get(STATE_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key = STATE_KEY, error = %e, "unreadable state record, starting over");
                Self::default()
            }),
            None => Self::default(),
        };

        if flat.get(LEGACY_MIGRATED_FLAG_KEY)?.as_deref() == Some("true") {
            state.legacy_photos_migrated = true;
        }

        if state.schema_version > FLAT_SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                found: state.schema_version,
                supported: FLAT_SCHEMA_VERSION,
            });
        }

        Ok(state)
    }

    /// Persist the record and drop the older standalone flag it replaces.
    pub fn save(&self, flat: &impl FlatBackend) -> Result<()> {
        flat.set(STATE_KEY, &serde_json::to_string(self)?)?;
        flat.remove(LEGACY_MIGRATED_FLAG_KEY)
    }
}
