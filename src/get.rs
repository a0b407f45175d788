//! Content retrieval by kind and id.
//!
//! Fetches one item and its keyword rows (ordered by position) via
//! [`SqliteStore`]. Used by `csearch get`.
//!
//! ```bash
//! csearch get document 12
//! csearch get image 3
//! ```

use anyhow::{bail, Result};

pub use corpus_search_core::search::ContentWithKeywords;
use corpus_search_core::models::{ContentDetails, ContentId, ContentKind};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Retrieves an item with its keyword rows; errors when it does not exist.
pub async fn get_content(
    config: &Config,
    kind: ContentKind,
    id: ContentId,
) -> Result<ContentWithKeywords> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());

    let result = corpus_search_core::search::get_content(&store, kind, id).await;
    pool.close().await;

    match result? {
        Some(found) => Ok(found),
        None => bail!("{} not found: {}", kind, id),
    }
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// CLI entry point for `csearch get <kind> <id>`.
pub async fn run_get(config: &Config, kind: ContentKind, id: ContentId, json: bool) -> Result<()> {
    let found = get_content(config, kind, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    let item = &found.item;
    println!("--- {} ---", kind.label());
    println!("id:           {}", item.id);
    println!("title:        {}", item.title);
    println!("path:         {}", item.path);
    println!("file_type:    {}", item.file_type);
    println!("size_bytes:   {}", item.size_bytes);
    println!("created_at:   {}", format_ts_iso(item.created_at));
    match &item.details {
        ContentDetails::Document { body } => {
            println!();
            println!("--- Body ---");
            println!("{}", body);
        }
        ContentDetails::Image {
            description,
            alt_text,
        } => {
            println!("description:  {}", description);
            println!("alt_text:     {}", alt_text);
        }
        ContentDetails::Video {
            description,
            duration_seconds,
        } => {
            println!("description:  {}", description);
            println!("duration:     {}s", duration_seconds);
        }
    }
    println!();

    println!("--- Keywords ({}) ---", found.keywords.len());
    for k in &found.keywords {
        let pos = k.position.map(|p| p.to_string()).unwrap_or_default();
        println!("{:>5}  {:<24} {}", pos, k.token, k.stem);
    }

    Ok(())
}
