//! Filesystem indexing.
//!
//! Turns files into [`NewContent`] (metadata, extracted text or caller
//! supplied media descriptions) and hands them to the core indexing
//! pipeline through [`SqliteStore`]. A folder walk indexes every supported
//! file below a root and keeps going past per-file failures.
//!
//! | Extension | Kind |
//! |-----------|------|
//! | `txt pdf docx html htm` | document |
//! | `jpg jpeg png gif svg` | image |
//! | `mp4 avi mov webm` | video |
//!
//! Items are keyed by the path as given; re-indexing the same path
//! replaces the previous item and all of its keyword rows.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use walkdir::WalkDir;

use corpus_search_core::indexing::index_content;
use corpus_search_core::models::{ContentDetails, ContentKind, ContentRef, NewContent};
use corpus_search_core::store::Store;

use crate::config::Config;
use crate::db;
use crate::extract;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Directories skipped by every folder walk.
const DEFAULT_EXCLUDES: &[&str] = &["**/.git/**", "**/target/**", "**/node_modules/**"];

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported file type: {}", .0.display())]
    Unsupported(PathBuf),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Caller-supplied image metadata. A missing title defaults to the file
/// name without extension.
#[derive(Debug, Clone, Default)]
pub struct ImageMetadata {
    pub title: Option<String>,
    pub description: String,
    pub alt_text: String,
}

/// Caller-supplied video metadata.
#[derive(Debug, Clone, Default)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub description: String,
    pub duration_seconds: i64,
}

/// Outcome of a folder walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexCounters {
    pub documents: usize,
    pub images: usize,
    pub videos: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl IndexCounters {
    fn record(&mut self, kind: ContentKind) {
        match kind {
            ContentKind::Document => self.documents += 1,
            ContentKind::Image => self.images += 1,
            ContentKind::Video => self.videos += 1,
        }
    }

    pub fn indexed(&self) -> usize {
        self.documents + self.images + self.videos
    }
}

/// Lowercase extension without the dot.
fn file_type_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Build the insertable form of the file at `path`. Documents get their
/// text extracted; media get `details` as given.
fn build_content(
    path: &Path,
    title: Option<String>,
    details: impl FnOnce(&Path, &str) -> ContentDetails,
) -> Result<NewContent, IndexError> {
    let metadata = std::fs::metadata(path).map_err(|_| IndexError::NotFound(path.to_path_buf()))?;
    if !metadata.is_file() {
        return Err(IndexError::NotFound(path.to_path_buf()));
    }
    let file_type = file_type_of(path);

    Ok(NewContent {
        title: title.unwrap_or_else(|| default_title(path)),
        details: details(path, &file_type),
        file_type,
        path: path.display().to_string(),
        size_bytes: metadata.len() as i64,
    })
}

fn document_details(path: &Path, file_type: &str) -> ContentDetails {
    ContentDetails::Document {
        body: extract::read_document_text(path, file_type),
    }
}

/// Content for a file whose kind follows from its extension. Media found
/// this way carry empty descriptions.
fn content_by_extension(path: &Path) -> Result<NewContent, IndexError> {
    match ContentKind::from_extension(&file_type_of(path)) {
        Some(ContentKind::Document) => build_content(path, None, document_details),
        Some(ContentKind::Image) => build_content(path, None, |_, _| ContentDetails::Image {
            description: String::new(),
            alt_text: String::new(),
        }),
        Some(ContentKind::Video) => build_content(path, None, |_, _| ContentDetails::Video {
            description: String::new(),
            duration_seconds: 0,
        }),
        None if !path.exists() => Err(IndexError::NotFound(path.to_path_buf())),
        None => Err(IndexError::Unsupported(path.to_path_buf())),
    }
}

async fn store_content<S: Store + ?Sized>(
    store: &S,
    content: &NewContent,
) -> Result<ContentRef, IndexError> {
    let id = index_content(store, content).await?;
    tracing::info!(kind = %content.kind(), id, path = %content.path, "indexed");
    Ok(ContentRef {
        kind: content.kind(),
        id,
    })
}

async fn with_store(
    config: &Config,
    content: Result<NewContent, IndexError>,
) -> Result<ContentRef, IndexError> {
    // Resolve the file before touching the database, so a missing path
    // never writes.
    let content = content?;
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let result = store_content(&store, &content).await;
    pool.close().await;
    result
}

/// Index one file, choosing its kind by extension.
pub async fn index_path(config: &Config, path: &Path) -> Result<ContentRef, IndexError> {
    with_store(config, content_by_extension(path)).await
}

/// Index an image with explicit metadata.
pub async fn index_image(
    config: &Config,
    path: &Path,
    meta: ImageMetadata,
) -> Result<ContentRef, IndexError> {
    let content = build_content(path, meta.title, |_, _| ContentDetails::Image {
        description: meta.description,
        alt_text: meta.alt_text,
    });
    with_store(config, content).await
}

/// Index a video with explicit metadata.
pub async fn index_video(
    config: &Config,
    path: &Path,
    meta: VideoMetadata,
) -> Result<ContentRef, IndexError> {
    let content = build_content(path, meta.title, |_, _| ContentDetails::Video {
        description: meta.description,
        duration_seconds: meta.duration_seconds,
    });
    with_store(config, content).await
}

/// Remove the item stored at `path`. Returns whether anything was removed.
pub async fn remove_path(config: &Config, path: &Path) -> Result<bool> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let removed = store.remove_content(&path.display().to_string()).await;
    pool.close().await;
    let removed = removed?;
    if removed {
        tracing::info!(path = %path.display(), "removed");
    }
    Ok(removed)
}

fn build_excludes(extra: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_EXCLUDES.iter().copied().chain(extra.iter().map(String::as_str)) {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Walk `root` (default `[corpus].root`) and index every supported file.
///
/// Files are visited in file-name order. Unsupported extensions count as
/// skipped; per-file failures count as errors and the walk continues.
pub async fn index_folder(config: &Config, root: Option<&Path>) -> Result<IndexCounters> {
    let root = root.unwrap_or(&config.corpus.root);
    if !root.is_dir() {
        return Err(IndexError::NotFound(root.to_path_buf()).into());
    }
    let excludes = build_excludes(&config.corpus.exclude_globs)?;

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let counters = walk_and_index(&store, root, &excludes, config.corpus.follow_symlinks).await;
    pool.close().await;

    tracing::info!(
        root = %root.display(),
        documents = counters.documents,
        images = counters.images,
        videos = counters.videos,
        errors = counters.errors,
        skipped = counters.skipped,
        "folder indexed"
    );
    Ok(counters)
}

/// Discard the whole index (items, keywords and query log), then index
/// `root` from scratch. A missing root fails before anything is dropped.
pub async fn rebuild_folder(config: &Config, root: Option<&Path>) -> Result<IndexCounters> {
    let dir = root.unwrap_or(&config.corpus.root);
    if !dir.is_dir() {
        return Err(IndexError::NotFound(dir.to_path_buf()).into());
    }
    migrate::reset_schema(config).await?;
    index_folder(config, root).await
}

async fn walk_and_index<S: Store + ?Sized>(
    store: &S,
    root: &Path,
    excludes: &GlobSet,
    follow_symlinks: bool,
) -> IndexCounters {
    let mut counters = IndexCounters::default();

    let walker = WalkDir::new(root)
        .follow_links(follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "walk error");
                counters.errors += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if excludes.is_match(relative) {
            continue;
        }

        let outcome = match content_by_extension(path) {
            Ok(content) => store_content(store, &content).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(owner) => counters.record(owner.kind),
            Err(IndexError::Unsupported(_)) => counters.skipped += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to index");
                counters.errors += 1;
            }
        }
    }

    counters
}

// ── CLI entry points ──

/// CLI entry point for `csearch index <path>`.
pub async fn run_index(config: &Config, path: &Path) -> Result<()> {
    let owner = index_path(config, path).await?;
    println!("indexed {} {} ({})", owner.kind, owner.id, path.display());
    Ok(())
}

/// CLI entry point for `csearch index-image`.
pub async fn run_index_image(config: &Config, path: &Path, meta: ImageMetadata) -> Result<()> {
    let owner = index_image(config, path, meta).await?;
    println!("indexed image {} ({})", owner.id, path.display());
    Ok(())
}

/// CLI entry point for `csearch index-video`.
pub async fn run_index_video(config: &Config, path: &Path, meta: VideoMetadata) -> Result<()> {
    let owner = index_video(config, path, meta).await?;
    println!("indexed video {} ({})", owner.id, path.display());
    Ok(())
}

/// CLI entry point for `csearch index-folder`.
pub async fn run_index_folder(config: &Config, root: Option<&Path>, rebuild: bool) -> Result<()> {
    let counters = if rebuild {
        rebuild_folder(config, root).await?
    } else {
        index_folder(config, root).await?
    };
    println!("index-folder {}", root.unwrap_or(&config.corpus.root).display());
    println!("  documents: {}", counters.documents);
    println!("  images:    {}", counters.images);
    println!("  videos:    {}", counters.videos);
    println!("  skipped:   {}", counters.skipped);
    println!("  errors:    {}", counters.errors);
    println!("ok");
    Ok(())
}

/// CLI entry point for `csearch remove <path>`.
pub async fn run_remove(config: &Config, path: &Path) -> Result<()> {
    if remove_path(config, path).await? {
        println!("removed {}", path.display());
    } else {
        println!("not indexed: {}", path.display());
    }
    Ok(())
}
