//! User-supplied drafts and their validation.
//!
//! The store never validates; callers turn a draft into a record here first
//! and surface [`ValidationError`] themselves.

use chrono::{Local, NaiveDate};

use crate::error::ValidationError;
use crate::types::{Accent, Entry, EntryId, Photo, PhotoContent};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in the local time zone, formatted the way entries store it.
pub fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

fn resolve_date(date: Option<&str>) -> Result<String, ValidationError> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(today()),
        Some(d) => NaiveDate::parse_from_str(d, DATE_FORMAT)
            .map(|parsed| parsed.format(DATE_FORMAT).to_string())
            .map_err(|_| ValidationError::InvalidDate(d.to_string())),
    }
}

fn required(value: &str, err: ValidationError) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(err);
    }
    Ok(trimmed.to_string())
}

/// A new memory or awesome highlight as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub author: String,
    pub content: String,
    pub date: Option<String>,
    pub accent: Option<Accent>,
}

impl EntryDraft {
    /// Validate and assign a fresh stable id.
    pub fn into_entry(self) -> Result<Entry, ValidationError> {
        let author = required(&self.author, ValidationError::MissingAuthor)?;
        let content = required(&self.content, ValidationError::MissingContent)?;
        let date = resolve_date(self.date.as_deref())?;

        let accent = self.accent.filter(|a| match a {
            Accent::Emoji(s) | Accent::Image(s) => !s.trim().is_empty(),
        });

        Ok(Entry {
            id: EntryId::new(),
            author,
            content,
            date,
            accent,
        })
    }
}

/// A new photo as typed by the user. The image itself is either `url` or a
/// file the caller encodes separately.
#[derive(Debug, Clone, Default)]
pub struct PhotoDraft {
    pub author: String,
    pub date: Option<String>,
    pub caption: Option<String>,
    pub url: Option<String>,
}

impl PhotoDraft {
    /// Check the fields shared by every photo in a submission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.author, ValidationError::MissingAuthor)?;
        resolve_date(self.date.as_deref())?;
        Ok(())
    }

    /// Build a photo around already-encoded content.
    pub fn with_content(&self, content: PhotoContent) -> Result<Photo, ValidationError> {
        let author = required(&self.author, ValidationError::MissingAuthor)?;
        if content.as_str().trim().is_empty() {
            return Err(ValidationError::MissingContent);
        }
        let date = resolve_date(self.date.as_deref())?;
        let caption = self
            .caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Photo {
            author,
            content,
            caption,
            date,
        })
    }

    /// Build a photo referencing `url`.
    pub fn into_link_photo(self) -> Result<Photo, ValidationError> {
        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ValidationError::MissingContent)?
            .to_string();
        self.with_content(PhotoContent::Link(url))
    }
}
