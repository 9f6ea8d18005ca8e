//! # sanctuary-shared
//!
//! Domain types shared by the store and the command-line front end: the
//! three collections, the records they hold, draft validation, and the
//! image downscaling used by the add-photo flow.

pub mod constants;
pub mod draft;
pub mod error;
pub mod imaging;
pub mod types;

pub use draft::{EntryDraft, PhotoDraft};
pub use error::{ImageError, ValidationError};
pub use types::*;
