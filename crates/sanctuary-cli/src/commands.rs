//! Subcommands and their handlers.
//!
//! Every handler prints JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Subcommand;
use sanctuary_shared::{
    Accent, BackendKind, Collection, EntryDraft, EntryId, PhotoDraft, PhotoId,
};
use sanctuary_store::{
    submit_photos, AccessGate, ContentStore, FlatBackend, ObjectStore, Record, RecordKey,
};
use serde_json::json;

use crate::config::CliConfig;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Unlock the sanctuary with the access key.
    Unlock { key: String },

    /// Lock the sanctuary again.
    Lock,

    /// List every record of a collection.
    List { collection: Collection },

    /// Add a memory or awesome highlight.
    Add {
        /// `memories` or `awesome`.
        collection: Collection,
        #[arg(long)]
        author: String,
        #[arg(long)]
        content: String,
        /// YYYY-MM-DD, defaults to today.
        #[arg(long)]
        date: Option<String>,
        #[arg(long, conflicts_with = "accent_image")]
        emoji: Option<String>,
        /// Image payload or URL shown beside the entry.
        #[arg(long)]
        accent_image: Option<String>,
    },

    /// Add photos from files, or one photo by URL.
    AddPhoto {
        #[arg(long)]
        author: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        caption: Option<String>,
        #[arg(long, conflicts_with = "files")]
        url: Option<String>,
        files: Vec<PathBuf>,
    },

    /// Delete a record by position or id.
    Delete { collection: Collection, key: String },

    /// Move photos left in the flat store by older versions.
    Migrate,
}

/// Turn command-line text into a delete key for `collection`.  Flat
/// collections take a position or an entry id; photos take their id.
pub fn parse_key(collection: Collection, raw: &str) -> anyhow::Result<RecordKey> {
    match collection.backend() {
        BackendKind::Flat => {
            if let Ok(position) = raw.parse::<usize>() {
                return Ok(RecordKey::Position(position));
            }
            let id = raw
                .parse::<EntryId>()
                .with_context(|| format!("'{raw}' is neither a position nor an entry id"))?;
            Ok(RecordKey::Entry(id))
        }
        BackendKind::Structured => {
            let id = raw
                .parse::<i64>()
                .with_context(|| format!("'{raw}' is not a photo id"))?;
            Ok(RecordKey::Photo(PhotoId(id)))
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl Command {
    fn needs_unlock(&self) -> bool {
        !matches!(self, Self::Unlock { .. } | Self::Lock)
    }
}

pub async fn run<F, O>(
    command: Command,
    store: &ContentStore<F, O>,
    config: &CliConfig,
) -> anyhow::Result<()>
where
    F: FlatBackend,
    O: ObjectStore,
{
    let gate = AccessGate::new(config.access_key.clone());
    if command.needs_unlock() && !gate.is_unlocked(store.flat())? {
        bail!("the sanctuary is locked; run `sanctuary unlock <key>` first");
    }

    match command {
        Command::Unlock { key } => {
            if !gate.unlock(store.flat(), &key)? {
                bail!("wrong access key");
            }
            print_json(&json!({ "unlocked": true }))
        }

        Command::Lock => {
            gate.lock(store.flat())?;
            print_json(&json!({ "unlocked": false }))
        }

        Command::List { collection } => print_json(&store.list_all(collection).await?),

        Command::Add {
            collection,
            author,
            content,
            date,
            emoji,
            accent_image,
        } => {
            if collection.backend() != BackendKind::Flat {
                bail!("use `add-photo` for {collection}");
            }
            let accent = emoji.map(Accent::Emoji).or(accent_image.map(Accent::Image));
            let entry = EntryDraft {
                author,
                content,
                date,
                accent,
            }
            .into_entry()?;

            let id = entry.id;
            store.add(collection, Record::Entry(entry)).await?;
            print_json(&json!({ "collection": collection, "id": id.to_string() }))
        }

        Command::AddPhoto {
            author,
            date,
            caption,
            url,
            files,
        } => {
            let draft = PhotoDraft {
                author,
                date,
                caption,
                url,
            };

            let mut contents = Vec::with_capacity(files.len());
            for path in &files {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                contents.push(bytes);
            }

            let report = submit_photos(store, &draft, &contents, config.photo_encoding()).await?;
            print_json(&report)?;
            if !report.is_complete() {
                bail!(
                    "{} of {} photos could not be added",
                    report.failed.len(),
                    report.failed.len() + report.added.len()
                );
            }
            Ok(())
        }

        Command::Delete { collection, key } => {
            let key = parse_key(collection, &key)?;
            let deleted = store.delete(collection, key).await?;
            print_json(&json!({ "collection": collection, "deleted": deleted }))
        }

        Command::Migrate => {
            let migrated = store.migrate_legacy_photos().await?;
            print_json(&json!({ "migrated": migrated }))
        }
    }
}
