//! Ranked keyword search over documents, images and videos.
//!
//! The algorithm operates entirely through the [`Store`] trait, with no
//! database or configuration dependencies. The calling application builds
//! [`SearchOptions`] from its config and passes the store implementation.
//!
//! # Ranking Algorithm
//!
//! 1. Expand the query through the synonym table.
//! 2. Extract `(token, stem)` keywords from the expanded query. No keywords
//!    means an empty response without touching the store.
//! 3. For each admitted [`ContentKind`], look up items owning a keyword row
//!    whose token or stem matches (OR semantics). `score` is the sum of the
//!    matched rows' frequencies, `match_count` their number.
//! 4. Per kind: score (desc), match count (desc), id (asc), truncated to
//!    `limit`.
//! 5. Merge all kinds, stable-sort by score (desc), truncate to `limit`.
//! 6. Log the raw query with the result count and elapsed time.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;

use crate::expand::expand_query;
use crate::models::{
    ContentDetails, ContentFilter, ContentId, ContentItem, ContentKind, ContentRef, CorpusStats,
    KeywordEntry, PopularQuery, QueryLogEntry,
};
use crate::normalize::{KeywordCount, Normalizer};
use crate::snippet::{extract_snippet, DEFAULT_SNIPPET_CHARS};
use crate::store::{Candidate, Store};

/// Prefixes shorter than this never produce suggestions.
pub const MIN_SUGGEST_PREFIX_CHARS: usize = 2;

/// Search tuning, decoupled from application config.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub filter: ContentFilter,
    /// Maximum results per kind and overall.
    pub limit: i64,
    /// Width of document snippets, in characters.
    pub snippet_chars: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            filter: ContentFilter::All,
            limit: 20,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub kind: ContentKind,
    pub id: ContentId,
    pub title: String,
    /// Excerpt around the first match for documents; the description for
    /// images and videos.
    pub snippet: String,
    pub file_type: String,
    pub path: String,
    pub match_count: i64,
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub total_count: usize,
    pub elapsed_ms: f64,
    /// Keywords extracted from the expanded query.
    pub processed_terms: Vec<KeywordCount>,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total_count: 0,
            elapsed_ms: 0.0,
            processed_terms: Vec::new(),
        }
    }
}

/// An item together with its keyword rows, ordered by position.
#[derive(Debug, Clone, Serialize)]
pub struct ContentWithKeywords {
    pub item: ContentItem,
    pub keywords: Vec<KeywordEntry>,
}

/// Keywords searched for `query`: its expansion, normalized. Empty when
/// nothing searchable remains.
pub fn query_terms(query: &str) -> Vec<KeywordCount> {
    Normalizer::shared().extract_keywords(&expand_query(query), 1)
}

/// Run a ranked search.
///
/// A failure to append the query log is reported and swallowed; lookup
/// failures propagate.
pub async fn search<S: Store + ?Sized>(
    store: &S,
    query: &str,
    opts: &SearchOptions,
) -> Result<SearchResponse> {
    let started = Instant::now();

    let terms = query_terms(query);
    if terms.is_empty() {
        tracing::debug!(query, "query has no searchable terms");
        return Ok(SearchResponse::empty());
    }

    let tokens: Vec<String> = terms.iter().map(|t| t.token.clone()).collect();
    let mut stems: Vec<String> = terms.iter().map(|t| t.stem.clone()).collect();
    stems.sort();
    stems.dedup();

    let mut hits: Vec<SearchHit> = Vec::new();
    for kind in opts.filter.kinds() {
        let candidates = store.lookup(kind, &tokens, &stems, opts.limit).await?;
        tracing::debug!(%kind, candidates = candidates.len(), "keyword lookup");
        hits.extend(
            candidates
                .into_iter()
                .map(|c| to_hit(c, &tokens, opts.snippet_chars)),
        );
    }

    // Stable: per-kind order survives among equal scores.
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(opts.limit.max(0) as usize);

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let entry = QueryLogEntry {
        query: query.to_string(),
        result_count: hits.len() as i64,
        searched_at: chrono::Utc::now().timestamp(),
        elapsed_ms,
    };
    if let Err(e) = store.record_query(&entry).await {
        tracing::warn!(error = %e, query, "failed to record query");
    }

    Ok(SearchResponse {
        total_count: hits.len(),
        results: hits,
        elapsed_ms,
        processed_terms: terms,
    })
}

fn to_hit(candidate: Candidate, tokens: &[String], snippet_chars: usize) -> SearchHit {
    let Candidate {
        item,
        match_count,
        score,
    } = candidate;
    let kind = item.kind();

    let (snippet, alt_text, duration_seconds) = match item.details {
        ContentDetails::Document { body } => {
            (extract_snippet(&body, tokens, snippet_chars), None, None)
        }
        ContentDetails::Image {
            description,
            alt_text,
        } => (description, Some(alt_text), None),
        ContentDetails::Video {
            description,
            duration_seconds,
        } => (description, None, Some(duration_seconds)),
    };

    SearchHit {
        kind,
        id: item.id,
        title: item.title,
        snippet,
        file_type: item.file_type,
        path: item.path,
        match_count,
        score,
        alt_text,
        duration_seconds,
    }
}

/// Most frequent logged queries. An unreadable log yields an empty list.
pub async fn popular_queries<S: Store + ?Sized>(store: &S, limit: i64) -> Vec<PopularQuery> {
    store.popular_queries(limit).await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to read query log");
        Vec::new()
    })
}

/// Indexed tokens completing `prefix`, most frequent first.
pub async fn suggest<S: Store + ?Sized>(store: &S, prefix: &str, limit: i64) -> Result<Vec<String>> {
    if prefix.chars().count() < MIN_SUGGEST_PREFIX_CHARS {
        return Ok(Vec::new());
    }
    store.suggest(prefix, limit).await
}

/// Corpus counts. Each count that cannot be read is reported as zero.
pub async fn corpus_stats<S: Store + ?Sized>(store: &S) -> CorpusStats {
    let mut stats = CorpusStats::default();
    for kind in ContentKind::ALL {
        let count = match store.count_content(kind).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(%kind, error = %e, "failed to count content");
                0
            }
        };
        match kind {
            ContentKind::Document => stats.documents = count,
            ContentKind::Image => stats.images = count,
            ContentKind::Video => stats.videos = count,
        }
    }
    stats.unique_keywords = store.count_unique_keywords().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to count keywords");
        0
    });
    stats
}

/// Fetch one item with its keyword rows.
pub async fn get_content<S: Store + ?Sized>(
    store: &S,
    kind: ContentKind,
    id: ContentId,
) -> Result<Option<ContentWithKeywords>> {
    let Some(item) = store.get_content(kind, id).await? else {
        return Ok(None);
    };
    let keywords = store.keyword_entries(ContentRef { kind, id }).await?;
    Ok(Some(ContentWithKeywords { item, keywords }))
}
