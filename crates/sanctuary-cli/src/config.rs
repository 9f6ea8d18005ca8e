//! CLI configuration loaded from environment variables.
//!
//! Every setting has a default so the tool runs with zero configuration.

use std::path::PathBuf;

use sanctuary_shared::constants::{
    DEFAULT_ACCESS_KEY, DEFAULT_FLAT_QUOTA, DEFAULT_PHOTO_MAX_WIDTH, DEFAULT_PHOTO_QUALITY,
};
use sanctuary_store::PhotoEncoding;

#[derive(Clone)]
pub struct CliConfig {
    /// Profile directory holding both backends.
    /// Env: `SANCTUARY_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Byte quota of the flat store.
    /// Env: `SANCTUARY_FLAT_QUOTA`
    /// Default: 5 MiB
    pub flat_quota: usize,

    /// Key that unlocks the sanctuary.
    /// Env: `SANCTUARY_ACCESS_KEY`
    /// Default: `"1234"`
    pub access_key: String,

    /// Uploaded photos wider than this are downscaled.
    /// Env: `SANCTUARY_PHOTO_MAX_WIDTH`
    /// Default: `1200`
    pub photo_max_width: u32,

    /// JPEG quality of uploaded photos, 1-100.
    /// Env: `SANCTUARY_PHOTO_QUALITY`
    /// Default: `70`
    pub photo_quality: u8,
}

// Keeps the access key out of logs.
impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("data_dir", &self.data_dir)
            .field("flat_quota", &self.flat_quota)
            .field("access_key", &"<redacted>")
            .field("photo_max_width", &self.photo_max_width)
            .field("photo_quality", &self.photo_quality)
            .finish()
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            flat_quota: DEFAULT_FLAT_QUOTA,
            access_key: DEFAULT_ACCESS_KEY.to_string(),
            photo_max_width: DEFAULT_PHOTO_MAX_WIDTH,
            photo_quality: DEFAULT_PHOTO_QUALITY,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("SANCTUARY_DATA_DIR").filter(|d| !d.is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(val) = lookup("SANCTUARY_FLAT_QUOTA") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.flat_quota = n,
                _ => tracing::warn!(value = %val, "Invalid SANCTUARY_FLAT_QUOTA, using default"),
            }
        }

        if let Some(key) = lookup("SANCTUARY_ACCESS_KEY") {
            if !key.is_empty() {
                config.access_key = key;
            }
        }

        if let Some(val) = lookup("SANCTUARY_PHOTO_MAX_WIDTH") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => config.photo_max_width = n,
                _ => tracing::warn!(value = %val, "Invalid SANCTUARY_PHOTO_MAX_WIDTH, using default"),
            }
        }

        if let Some(val) = lookup("SANCTUARY_PHOTO_QUALITY") {
            match val.parse::<u32>() {
                Ok(n) => config.photo_quality = n.clamp(1, 100) as u8,
                Err(_) => tracing::warn!(value = %val, "Invalid SANCTUARY_PHOTO_QUALITY, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }

    pub fn photo_encoding(&self) -> PhotoEncoding {
        PhotoEncoding {
            max_width: self.photo_max_width,
            quality: self.photo_quality,
        }
    }
}
