use sanctuary_shared::Collection;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The flat store's quota would be exceeded. Nothing was written.
    #[error("Storage full: write needs {needed} bytes, quota is {quota}")]
    StorageFull { needed: usize, quota: usize },

    /// The structured store could not be opened.
    #[error("Object store unavailable: {0}")]
    BackendUnavailable(String),

    /// A single structured-store operation failed.
    #[error("Object store transaction failed: {0}")]
    TransactionFailure(String),

    /// A record or key of the wrong kind was used with a collection.
    #[error("Collection '{collection}' cannot take {what}")]
    WrongCollection {
        collection: Collection,
        what: &'static str,
    },

    /// A flat-store value did not decode.
    #[error("Corrupt data under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data was written by a newer build.
    #[error("Store schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the data directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
