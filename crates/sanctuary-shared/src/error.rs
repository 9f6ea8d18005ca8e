use thiserror::Error;

/// A draft was rejected before reaching the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Author is required")]
    MissingAuthor,

    #[error("Content is required")]
    MissingContent,

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image processing error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Invalid resize parameters: {0}")]
    InvalidParameters(String),
}
