//! Core data models used throughout corpus-search.
//!
//! A corpus holds three kinds of content item (documents, images, videos).
//! Each item owns a set of [`KeywordEntry`] rows produced by the normalizer;
//! the owner is a [`ContentRef`], i.e. exactly one item of exactly one kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier of a content item. Unique per kind.
pub type ContentId = i64;

/// The three kinds of indexed content.
///
/// Each kind carries a static descriptor (table, owner column in the
/// keyword index, accepted extensions) so that per-kind store operations
/// are written once and parameterized over the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Document,
    Image,
    Video,
}

impl ContentKind {
    /// All kinds, in the order searches visit them.
    pub const ALL: [ContentKind; 3] = [ContentKind::Document, ContentKind::Image, ContentKind::Video];

    /// Name of the table holding items of this kind.
    pub fn table(self) -> &'static str {
        match self {
            ContentKind::Document => "documents",
            ContentKind::Image => "images",
            ContentKind::Video => "videos",
        }
    }

    /// Foreign-key column of `keyword_index` pointing at this kind.
    pub fn owner_column(self) -> &'static str {
        match self {
            ContentKind::Document => "document_id",
            ContentKind::Image => "image_id",
            ContentKind::Video => "video_id",
        }
    }

    /// Lowercase file extensions (without the dot) classified as this kind.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ContentKind::Document => &["txt", "pdf", "docx", "html", "htm"],
            ContentKind::Image => &["jpg", "jpeg", "png", "gif", "svg"],
            ContentKind::Video => &["mp4", "avi", "mov", "webm"],
        }
    }

    /// Singular lowercase label (`document`, `image`, `video`).
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Document => "document",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
        }
    }

    /// Classify a file extension. Case-insensitive, leading dot optional.
    pub fn from_extension(ext: &str) -> Option<ContentKind> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content kind: '{0}' (expected document, image or video)")]
pub struct ParseKindError(pub String);

impl FromStr for ContentKind {
    type Err = ParseKindError;

    /// Accepts singular and plural spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document" | "documents" => Ok(ContentKind::Document),
            "image" | "images" => Ok(ContentKind::Image),
            "video" | "videos" => Ok(ContentKind::Video),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// Which kinds a search visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFilter {
    #[default]
    All,
    Only(ContentKind),
}

impl ContentFilter {
    pub fn kinds(self) -> Vec<ContentKind> {
        match self {
            ContentFilter::All => ContentKind::ALL.to_vec(),
            ContentFilter::Only(kind) => vec![kind],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content filter: '{0}' (expected all, document(s), image(s) or video(s))")]
pub struct ParseFilterError(pub String);

impl FromStr for ContentFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(ContentFilter::All);
        }
        s.parse::<ContentKind>()
            .map(ContentFilter::Only)
            .map_err(|_| ParseFilterError(s.to_string()))
    }
}

/// Kind-specific attributes of a content item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentDetails {
    Document {
        body: String,
    },
    Image {
        description: String,
        alt_text: String,
    },
    Video {
        description: String,
        duration_seconds: i64,
    },
}

impl ContentDetails {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentDetails::Document { .. } => ContentKind::Document,
            ContentDetails::Image { .. } => ContentKind::Image,
            ContentDetails::Video { .. } => ContentKind::Video,
        }
    }

    /// Free text describing the item: the body for documents, the
    /// description for media.
    pub fn text(&self) -> &str {
        match self {
            ContentDetails::Document { body } => body,
            ContentDetails::Image { description, .. } => description,
            ContentDetails::Video { description, .. } => description,
        }
    }
}

/// A content item as handed to the store for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub title: String,
    /// File extension, lowercase, without the dot.
    pub file_type: String,
    /// Storage path; the natural key for replace-on-reindex.
    pub path: String,
    pub size_bytes: i64,
    pub details: ContentDetails,
}

impl NewContent {
    pub fn kind(&self) -> ContentKind {
        self.details.kind()
    }

    /// The text fed to the normalizer when indexing this item.
    ///
    /// Documents index their body; images index title, description and alt
    /// text; videos index title and description.
    pub fn searchable_text(&self) -> String {
        match &self.details {
            ContentDetails::Document { body } => body.clone(),
            ContentDetails::Image {
                description,
                alt_text,
            } => format!("{} {} {}", self.title, description, alt_text),
            ContentDetails::Video { description, .. } => {
                format!("{} {}", self.title, description)
            }
        }
    }
}

/// A persisted content item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub title: String,
    pub file_type: String,
    pub path: String,
    pub size_bytes: i64,
    /// Unix seconds.
    pub created_at: i64,
    #[serde(flatten)]
    pub details: ContentDetails,
}

impl ContentItem {
    pub fn kind(&self) -> ContentKind {
        self.details.kind()
    }

    pub fn content_ref(&self) -> ContentRef {
        ContentRef {
            kind: self.kind(),
            id: self.id,
        }
    }
}

/// Owner of a keyword entry: exactly one item of exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContentRef {
    pub kind: ContentKind,
    pub id: ContentId,
}

/// One indexed occurrence of a normalized token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordEntry {
    pub id: i64,
    pub token: String,
    pub stem: String,
    pub owner: ContentRef,
    pub frequency: i64,
    pub position: Option<i64>,
}

/// Append-only record of an executed search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryLogEntry {
    pub query: String,
    pub result_count: i64,
    /// Unix seconds.
    pub searched_at: i64,
    pub elapsed_ms: f64,
}

/// Aggregated popularity of one raw query string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularQuery {
    pub query: String,
    pub count: i64,
    pub avg_results: f64,
    pub avg_elapsed_ms: f64,
}

/// Corpus-wide counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CorpusStats {
    pub documents: i64,
    pub images: i64,
    pub videos: i64,
    pub unique_keywords: i64,
}
