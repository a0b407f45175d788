//! Storage abstraction for corpus-search.
//!
//! The [`Store`] trait defines every storage operation the indexer and the
//! query engine need, so the ranking pipeline runs unchanged against SQLite
//! or the [`memory::InMemoryStore`] used in tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{
    ContentId, ContentItem, ContentKind, ContentRef, KeywordEntry, NewContent, PopularQuery,
    QueryLogEntry,
};
use crate::normalize::TokenOccurrence;

/// One content item matched by a keyword lookup.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub item: ContentItem,
    /// Number of distinct keyword rows that matched.
    pub match_count: i64,
    /// Sum of `frequency` over the matched rows.
    pub score: i64,
}

/// Abstract storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`replace_content`](Store::replace_content) | Upsert an item by path together with its keyword rows |
/// | [`remove_content`](Store::remove_content) | Delete the item at a path and its keyword rows |
/// | [`get_content`](Store::get_content) | Fetch an item by kind and id |
/// | [`find_by_path`](Store::find_by_path) | Fetch the item stored at a path |
/// | [`keyword_entries`](Store::keyword_entries) | Keyword rows owned by an item |
/// | [`lookup`](Store::lookup) | Per-kind OR-match of tokens/stems, grouped and ranked |
/// | [`record_query`](Store::record_query) | Append to the query log |
/// | [`popular_queries`](Store::popular_queries) | Aggregate the query log |
/// | [`suggest`](Store::suggest) | Indexed tokens by prefix |
/// | [`count_content`](Store::count_content) | Items of one kind |
/// | [`count_unique_keywords`](Store::count_unique_keywords) | Distinct surface tokens |
#[async_trait]
pub trait Store: Send + Sync {
    /// Store `content` and one keyword row per occurrence as a single atomic
    /// unit, replacing whatever item is already stored at `content.path`
    /// (of any kind) together with all of its keyword rows. A path holds at
    /// most one item.
    ///
    /// Returns the identifier assigned to the new item.
    async fn replace_content(
        &self,
        content: &NewContent,
        occurrences: &[TokenOccurrence],
    ) -> Result<ContentId>;

    /// Delete whatever item is stored at `path`, with its keyword rows.
    /// Returns whether anything was removed.
    async fn remove_content(&self, path: &str) -> Result<bool>;

    async fn get_content(&self, kind: ContentKind, id: ContentId) -> Result<Option<ContentItem>>;

    async fn find_by_path(&self, path: &str) -> Result<Option<ContentItem>>;

    /// Keyword rows owned by `owner`, ordered by position.
    async fn keyword_entries(&self, owner: ContentRef) -> Result<Vec<KeywordEntry>>;

    /// Items of `kind` owning at least one keyword row whose token is in
    /// `tokens` or whose stem is in `stems`.
    ///
    /// Ordered by score, then match count (both descending), then id;
    /// at most `limit` candidates.
    async fn lookup(
        &self,
        kind: ContentKind,
        tokens: &[String],
        stems: &[String],
        limit: i64,
    ) -> Result<Vec<Candidate>>;

    async fn record_query(&self, entry: &QueryLogEntry) -> Result<()>;

    /// Logged queries grouped by raw text, most frequent first.
    async fn popular_queries(&self, limit: i64) -> Result<Vec<PopularQuery>>;

    /// Distinct indexed tokens starting with `prefix` (literal,
    /// case-sensitive), most frequent first.
    async fn suggest(&self, prefix: &str, limit: i64) -> Result<Vec<String>>;

    async fn count_content(&self, kind: ContentKind) -> Result<i64>;

    async fn count_unique_keywords(&self) -> Result<i64>;
}
