//! In-memory [`Store`] implementation for tests and embedding callers.
//!
//! Items and keyword rows live in one arena behind a `std::sync::RwLock`, so
//! each write is atomic with respect to readers. Keyword rows reference
//! their owner through a [`ContentRef`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{
    ContentId, ContentItem, ContentKind, ContentRef, KeywordEntry, NewContent, PopularQuery,
    QueryLogEntry,
};
use crate::normalize::TokenOccurrence;

use super::{Candidate, Store};

#[derive(Default)]
struct Arena {
    items: Vec<ContentItem>,
    next_item_id: HashMap<ContentKind, ContentId>,
    keywords: Vec<KeywordEntry>,
    next_keyword_id: i64,
    query_log: Vec<QueryLogEntry>,
}

impl Arena {
    /// Drop every item stored at `path`, whatever its kind.
    fn drop_path(&mut self, path: &str) -> bool {
        let doomed: Vec<ContentRef> = self
            .items
            .iter()
            .filter(|i| i.path == path)
            .map(ContentItem::content_ref)
            .collect();
        if doomed.is_empty() {
            return false;
        }
        self.keywords.retain(|k| !doomed.contains(&k.owner));
        self.items.retain(|i| !doomed.contains(&i.content_ref()));
        true
    }
}

/// In-memory store.
pub struct InMemoryStore {
    arena: RwLock<Arena>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            arena: RwLock::new(Arena::default()),
        }
    }

    /// Snapshot of the query log, oldest first.
    pub fn query_log(&self) -> Result<Vec<QueryLogEntry>> {
        Ok(self.read()?.query_log.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Arena>> {
        self.arena
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Arena>> {
        self.arena
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn replace_content(
        &self,
        content: &NewContent,
        occurrences: &[TokenOccurrence],
    ) -> Result<ContentId> {
        let kind = content.kind();
        let mut arena = self.write()?;
        arena.drop_path(&content.path);

        let next = arena.next_item_id.entry(kind).or_insert(1);
        let id = *next;
        *next += 1;

        let item = ContentItem {
            id,
            title: content.title.clone(),
            file_type: content.file_type.clone(),
            path: content.path.clone(),
            size_bytes: content.size_bytes,
            created_at: chrono::Utc::now().timestamp(),
            details: content.details.clone(),
        };
        let owner = item.content_ref();
        arena.items.push(item);

        for occ in occurrences {
            arena.next_keyword_id += 1;
            let entry = KeywordEntry {
                id: arena.next_keyword_id,
                token: occ.token.clone(),
                stem: occ.stem.clone(),
                owner,
                frequency: 1,
                position: Some(occ.position as i64),
            };
            arena.keywords.push(entry);
        }

        Ok(id)
    }

    async fn remove_content(&self, path: &str) -> Result<bool> {
        Ok(self.write()?.drop_path(path))
    }

    async fn get_content(&self, kind: ContentKind, id: ContentId) -> Result<Option<ContentItem>> {
        let owner = ContentRef { kind, id };
        Ok(self
            .read()?
            .items
            .iter()
            .find(|i| i.content_ref() == owner)
            .cloned())
    }

    async fn find_by_path(&self, path: &str) -> Result<Option<ContentItem>> {
        Ok(self.read()?.items.iter().find(|i| i.path == path).cloned())
    }

    async fn keyword_entries(&self, owner: ContentRef) -> Result<Vec<KeywordEntry>> {
        let mut entries: Vec<KeywordEntry> = self
            .read()?
            .keywords
            .iter()
            .filter(|k| k.owner == owner)
            .cloned()
            .collect();
        entries.sort_by_key(|k| (k.position, k.id));
        Ok(entries)
    }

    async fn lookup(
        &self,
        kind: ContentKind,
        tokens: &[String],
        stems: &[String],
        limit: i64,
    ) -> Result<Vec<Candidate>> {
        let arena = self.read()?;

        let mut tallies: HashMap<ContentId, (i64, i64)> = HashMap::new();
        for entry in arena.keywords.iter().filter(|k| k.owner.kind == kind) {
            if tokens.contains(&entry.token) || stems.contains(&entry.stem) {
                let tally = tallies.entry(entry.owner.id).or_insert((0, 0));
                tally.0 += 1;
                tally.1 += entry.frequency;
            }
        }

        let mut candidates: Vec<Candidate> = arena
            .items
            .iter()
            .filter(|i| i.kind() == kind)
            .filter_map(|i| {
                tallies.get(&i.id).map(|&(match_count, score)| Candidate {
                    item: i.clone(),
                    match_count,
                    score,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(b.match_count.cmp(&a.match_count))
                .then(a.item.id.cmp(&b.item.id))
        });
        candidates.truncate(limit.max(0) as usize);
        Ok(candidates)
    }

    async fn record_query(&self, entry: &QueryLogEntry) -> Result<()> {
        self.write()?.query_log.push(entry.clone());
        Ok(())
    }

    async fn popular_queries(&self, limit: i64) -> Result<Vec<PopularQuery>> {
        let arena = self.read()?;

        let mut groups: HashMap<&str, (i64, i64, f64)> = HashMap::new();
        for entry in &arena.query_log {
            let g = groups.entry(entry.query.as_str()).or_insert((0, 0, 0.0));
            g.0 += 1;
            g.1 += entry.result_count;
            g.2 += entry.elapsed_ms;
        }

        let mut popular: Vec<PopularQuery> = groups
            .into_iter()
            .map(|(query, (count, results, elapsed))| PopularQuery {
                query: query.to_string(),
                count,
                avg_results: results as f64 / count as f64,
                avg_elapsed_ms: elapsed / count as f64,
            })
            .collect();
        popular.sort_by(|a, b| b.count.cmp(&a.count).then(a.query.cmp(&b.query)));
        popular.truncate(limit.max(0) as usize);
        Ok(popular)
    }

    async fn suggest(&self, prefix: &str, limit: i64) -> Result<Vec<String>> {
        let arena = self.read()?;

        let mut counts: HashMap<&str, i64> = HashMap::new();
        for entry in arena.keywords.iter().filter(|k| k.token.starts_with(prefix)) {
            *counts.entry(entry.token.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        Ok(ranked
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(token, _)| token.to_string())
            .collect())
    }

    async fn count_content(&self, kind: ContentKind) -> Result<i64> {
        Ok(self
            .read()?
            .items
            .iter()
            .filter(|i| i.kind() == kind)
            .count() as i64)
    }

    async fn count_unique_keywords(&self) -> Result<i64> {
        let arena = self.read()?;
        let mut tokens: Vec<&str> = arena.keywords.iter().map(|k| k.token.as_str()).collect();
        tokens.sort_unstable();
        tokens.dedup();
        Ok(tokens.len() as i64)
    }
}
