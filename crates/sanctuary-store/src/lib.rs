//! # sanctuary-store
//!
//! Local storage for the sanctuary's three collections.
//!
//! Text entries (`memories`, `awesome`) live in a flat key-value backend,
//! one JSON list per collection.  Photos live in a structured object store
//! that assigns each record a stable integer id.  [`ContentStore`] routes
//! every operation to the right backend and owns the one-time move of
//! legacy photos out of the flat store.

pub mod batch;
pub mod content;
pub mod flat;
pub mod gate;
pub mod location;
pub mod migrations;
pub mod objects;
pub mod state;

mod entries;
mod error;
mod legacy;
mod photos;

pub use batch::{submit_photos, BatchFailure, BatchReport, PhotoEncoding};
pub use content::{ContentStore, Record, RecordKey, SqliteContentStore, StoredRecord};
pub use error::{Result, StoreError};
pub use flat::{FlatBackend, MemoryKv, SqliteKv};
pub use gate::AccessGate;
pub use location::DataDir;
pub use objects::{MemoryObjectStore, ObjectStore, ObjectStoreLocation, SqliteObjectStore};
pub use state::StoreState;
