/// Application name
pub const APP_NAME: &str = "Sanctuary";

/// Flat-store key holding the versioned store-state record
pub const STATE_KEY: &str = "sanctuary_state";

/// Older boolean migration flag, folded into the state record on open
pub const LEGACY_MIGRATED_FLAG_KEY: &str = "photos_migrated";

/// Flat-store key the access gate persists its unlocked state under
pub const UNLOCKED_KEY: &str = "hub_unlocked";

/// Flat-store schema version understood by this build.
/// 1 = entries without ids, 2 = every entry carries a stable id.
pub const FLAT_SCHEMA_VERSION: u32 = 2;

/// Name of the structured database
pub const OBJECT_DB_NAME: &str = "sanctuary";

/// Structured schema version understood by this build
pub const OBJECT_DB_VERSION: u32 = 1;

/// Flat-store quota in bytes (5 MiB, keys + values)
pub const DEFAULT_FLAT_QUOTA: usize = 5 * 1024 * 1024;

/// Default maximum width of an uploaded photo after downscaling
pub const DEFAULT_PHOTO_MAX_WIDTH: u32 = 1200;

/// Default JPEG quality (1-100) for uploaded photos
pub const DEFAULT_PHOTO_QUALITY: u8 = 70;

/// Access key used when none is configured
pub const DEFAULT_ACCESS_KEY: &str = "1234";
