use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// One of the three named collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Memories,
    Awesome,
    Photos,
}

/// Where a collection's records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Whole collection serialized as one JSON list under a single key.
    Flat,
    /// Per-record object store with auto-assigned integer keys.
    Structured,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::Memories, Self::Awesome, Self::Photos];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memories => "memories",
            Self::Awesome => "awesome",
            Self::Photos => "photos",
        }
    }

    // Photos are large enough to threaten the flat quota and need keys that
    // survive deletes; everything else is small text.
    pub fn backend(&self) -> BackendKind {
        match self {
            Self::Memories | Self::Awesome => BackendKind::Flat,
            Self::Photos => BackendKind::Structured,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memories" => Ok(Self::Memories),
            "awesome" => Ok(Self::Awesome),
            "photos" => Ok(Self::Photos),
            other => Err(ValidationError::UnknownCollection(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable identifier of a text entry, assigned when the entry is created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Key assigned to a photo by the structured store. Never reused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PhotoId(pub i64);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// Decorative annotation attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accent {
    /// A short emoji-like token.
    Emoji(String),
    /// An image payload (data URL or link).
    Image(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentType {
    Emoji,
    Image,
    #[default]
    None,
}

/// A text record in `memories` or `awesome`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntryRepr", into = "EntryRepr")]
pub struct Entry {
    pub id: EntryId,
    pub author: String,
    pub content: String,
    /// Calendar date, `YYYY-MM-DD` when entered through a draft.
    pub date: String,
    pub accent: Option<Accent>,
}

impl Entry {
    pub fn accent_type(&self) -> AccentType {
        match self.accent {
            Some(Accent::Emoji(_)) => AccentType::Emoji,
            Some(Accent::Image(_)) => AccentType::Image,
            None => AccentType::None,
        }
    }
}

/// On-disk shape of an entry. Older pages wrote entries without `id` or
/// accent fields, so both are optional here.
#[derive(Serialize, Deserialize)]
struct EntryRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<EntryId>,
    author: String,
    content: String,
    #[serde(default)]
    date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accent: Option<String>,
    #[serde(rename = "accentType", default)]
    accent_type: AccentType,
}

impl From<EntryRepr> for Entry {
    fn from(repr: EntryRepr) -> Self {
        let accent = match (repr.accent_type, repr.accent) {
            (AccentType::Emoji, Some(token)) => Some(Accent::Emoji(token)),
            (AccentType::Image, Some(payload)) => Some(Accent::Image(payload)),
            _ => None,
        };
        Self {
            id: repr.id.unwrap_or_default(),
            author: repr.author,
            content: repr.content,
            date: repr.date,
            accent,
        }
    }
}

impl From<Entry> for EntryRepr {
    fn from(entry: Entry) -> Self {
        let accent_type = entry.accent_type();
        let accent = entry.accent.map(|a| match a {
            Accent::Emoji(s) | Accent::Image(s) => s,
        });
        Self {
            id: Some(entry.id),
            author: entry.author,
            content: entry.content,
            date: entry.date,
            accent,
            accent_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Photo
// ---------------------------------------------------------------------------

/// The image of a photo record: embedded payload or external reference,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PhotoContent {
    /// A `data:` URL carrying the encoded image.
    Embedded(String),
    /// An external image URL.
    Link(String),
}

impl PhotoContent {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Embedded(s) | Self::Link(s) => s,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }
}

impl From<String> for PhotoContent {
    fn from(s: String) -> Self {
        if s.starts_with("data:") {
            Self::Embedded(s)
        } else {
            Self::Link(s)
        }
    }
}

impl From<PhotoContent> for String {
    fn from(content: PhotoContent) -> Self {
        match content {
            PhotoContent::Embedded(s) | PhotoContent::Link(s) => s,
        }
    }
}

/// A record in `photos`. The id lives beside it in [`StoredPhoto`] since the
/// store assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub author: String,
    pub content: PhotoContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub date: String,
}

// ---------------------------------------------------------------------------
// Listing results
// ---------------------------------------------------------------------------

/// An entry as returned by a listing, with its current display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredEntry {
    pub position: usize,
    #[serde(flatten)]
    pub entry: Entry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredPhoto {
    pub id: PhotoId,
    #[serde(flatten)]
    pub photo: Photo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_backend_policy() {
        assert_eq!(Collection::Memories.backend(), BackendKind::Flat);
        assert_eq!(Collection::Awesome.backend(), BackendKind::Flat);
        assert_eq!(Collection::Photos.backend(), BackendKind::Structured);
    }

    #[test]
    fn test_collection_from_str() {
        assert_eq!("awesome".parse::<Collection>().unwrap(), Collection::Awesome);
        assert!(matches!(
            "videos".parse::<Collection>(),
            Err(ValidationError::UnknownCollection(_))
        ));
    }

    #[test]
    fn test_entry_without_id_or_accent_is_accepted() {
        let json = r#"{"author":"Ann","content":"hello","caption":"","date":"2024-01-01"}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.author, "Ann");
        assert_eq!(entry.content, "hello");
        assert_eq!(entry.accent, None);
    }

    #[test]
    fn test_entry_accent_wire_shape() {
        let entry = Entry {
            id: EntryId::new(),
            author: "Ann".into(),
            content: "hello".into(),
            date: "2024-01-01".into(),
            accent: Some(Accent::Emoji("🌙".into())),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["accent"], "🌙");
        assert_eq!(value["accentType"], "emoji");

        let back: Entry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_accent_type_without_payload_is_none() {
        let json = r#"{"author":"A","content":"c","date":"2024-01-01","accentType":"image"}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.accent_type(), AccentType::None);
    }

    #[test]
    fn test_photo_content_variant_from_prefix() {
        let embedded: PhotoContent = "data:image/jpeg;base64,AAAA".to_string().into();
        assert!(embedded.is_embedded());

        let link: PhotoContent = "https://example.com/a.jpg".to_string().into();
        assert_eq!(link, PhotoContent::Link("https://example.com/a.jpg".into()));
    }

    #[test]
    fn test_stored_photo_flattens_id() {
        let stored = StoredPhoto {
            id: PhotoId(7),
            photo: Photo {
                author: "Ann".into(),
                content: PhotoContent::Link("https://example.com/a.jpg".into()),
                caption: None,
                date: "2024-01-01".into(),
            },
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["content"], "https://example.com/a.jpg");
        assert!(value.get("caption").is_none());
    }
}
