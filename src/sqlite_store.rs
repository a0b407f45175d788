//! SQLite-backed [`Store`] implementation.
//!
//! Per-kind statements are written once and parameterized by the
//! [`ContentKind`] descriptor (table name and owner column), which are
//! static identifiers and never user input.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use corpus_search_core::models::{
    ContentDetails, ContentId, ContentItem, ContentKind, ContentRef, KeywordEntry, NewContent,
    PopularQuery, QueryLogEntry,
};
use corpus_search_core::normalize::TokenOccurrence;
use corpus_search_core::store::{Candidate, Store};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn item_from_row(kind: ContentKind, row: &SqliteRow) -> Result<ContentItem> {
    let details = match kind {
        ContentKind::Document => ContentDetails::Document {
            body: row.try_get("body")?,
        },
        ContentKind::Image => ContentDetails::Image {
            description: row.try_get("description")?,
            alt_text: row.try_get("alt_text")?,
        },
        ContentKind::Video => ContentDetails::Video {
            description: row.try_get("description")?,
            duration_seconds: row.try_get("duration_seconds")?,
        },
    };

    Ok(ContentItem {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        file_type: row.try_get("file_type")?,
        path: row.try_get("path")?,
        size_bytes: row.try_get("size_bytes")?,
        created_at: row.try_get("created_at")?,
        details,
    })
}

fn push_in_list(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, values: &[String]) {
    qb.push(format!("k.{column} IN ("));
    let mut list = qb.separated(", ");
    for v in values {
        list.push_bind(v.clone());
    }
    list.push_unseparated(")");
}

#[async_trait]
impl Store for SqliteStore {
    async fn replace_content(
        &self,
        content: &NewContent,
        occurrences: &[TokenOccurrence],
    ) -> Result<ContentId> {
        let owner = content.kind().owner_column();
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        // A path holds one item, so clear it from every kind's table.
        for kind in ContentKind::ALL {
            let (table, column) = (kind.table(), kind.owner_column());
            sqlx::query(&format!(
                "DELETE FROM keyword_index WHERE {column} IN (SELECT id FROM {table} WHERE path = ?)"
            ))
            .bind(&content.path)
            .execute(&mut *tx)
            .await?;

            sqlx::query(&format!("DELETE FROM {table} WHERE path = ?"))
                .bind(&content.path)
                .execute(&mut *tx)
                .await?;
        }

        let inserted = match &content.details {
            ContentDetails::Document { body } => {
                sqlx::query(
                    "INSERT INTO documents (title, file_type, path, size_bytes, created_at, body) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&content.title)
                .bind(&content.file_type)
                .bind(&content.path)
                .bind(content.size_bytes)
                .bind(now)
                .bind(body)
                .execute(&mut *tx)
                .await?
            }
            ContentDetails::Image {
                description,
                alt_text,
            } => {
                sqlx::query(
                    "INSERT INTO images (title, file_type, path, size_bytes, created_at, description, alt_text) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&content.title)
                .bind(&content.file_type)
                .bind(&content.path)
                .bind(content.size_bytes)
                .bind(now)
                .bind(description)
                .bind(alt_text)
                .execute(&mut *tx)
                .await?
            }
            ContentDetails::Video {
                description,
                duration_seconds,
            } => {
                sqlx::query(
                    "INSERT INTO videos (title, file_type, path, size_bytes, created_at, description, duration_seconds) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&content.title)
                .bind(&content.file_type)
                .bind(&content.path)
                .bind(content.size_bytes)
                .bind(now)
                .bind(description)
                .bind(duration_seconds)
                .execute(&mut *tx)
                .await?
            }
        };
        let id = inserted.last_insert_rowid();

        let insert_keyword = format!(
            "INSERT INTO keyword_index (token, stem, {owner}, frequency, position) VALUES (?, ?, ?, 1, ?)"
        );
        for occ in occurrences {
            sqlx::query(&insert_keyword)
                .bind(&occ.token)
                .bind(&occ.stem)
                .bind(id)
                .bind(occ.position as i64)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    async fn remove_content(&self, path: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0;
        for kind in ContentKind::ALL {
            // keyword_index rows follow through ON DELETE CASCADE
            let result = sqlx::query(&format!("DELETE FROM {} WHERE path = ?", kind.table()))
                .bind(path)
                .execute(&mut *tx)
                .await?;
            removed += result.rows_affected();
        }
        tx.commit().await?;
        Ok(removed > 0)
    }

    async fn get_content(&self, kind: ContentKind, id: ContentId) -> Result<Option<ContentItem>> {
        let row = sqlx::query(&format!("SELECT * FROM {} WHERE id = ?", kind.table()))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| item_from_row(kind, &r)).transpose()
    }

    async fn find_by_path(&self, path: &str) -> Result<Option<ContentItem>> {
        for kind in ContentKind::ALL {
            let row = sqlx::query(&format!("SELECT * FROM {} WHERE path = ?", kind.table()))
                .bind(path)
                .fetch_optional(&self.pool)
                .await?;
            if let Some(row) = row {
                return item_from_row(kind, &row).map(Some);
            }
        }
        Ok(None)
    }

    async fn keyword_entries(&self, owner: ContentRef) -> Result<Vec<KeywordEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT id, token, stem, frequency, position FROM keyword_index \
             WHERE {} = ? ORDER BY position, id",
            owner.kind.owner_column()
        ))
        .bind(owner.id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(KeywordEntry {
                    id: row.try_get("id")?,
                    token: row.try_get("token")?,
                    stem: row.try_get("stem")?,
                    owner,
                    frequency: row.try_get("frequency")?,
                    position: row.try_get("position")?,
                })
            })
            .collect()
    }

    async fn lookup(
        &self,
        kind: ContentKind,
        tokens: &[String],
        stems: &[String],
        limit: i64,
    ) -> Result<Vec<Candidate>> {
        if tokens.is_empty() && stems.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT t.*, COUNT(k.id) AS match_count, COALESCE(SUM(k.frequency), 0) AS score \
             FROM {table} t JOIN keyword_index k ON k.{owner} = t.id WHERE ",
            table = kind.table(),
            owner = kind.owner_column(),
        ));
        match (tokens.is_empty(), stems.is_empty()) {
            (false, false) => {
                qb.push("(");
                push_in_list(&mut qb, "token", tokens);
                qb.push(" OR ");
                push_in_list(&mut qb, "stem", stems);
                qb.push(")");
            }
            (false, true) => push_in_list(&mut qb, "token", tokens),
            _ => push_in_list(&mut qb, "stem", stems),
        }
        qb.push(" GROUP BY t.id ORDER BY score DESC, match_count DESC, t.id ASC LIMIT ");
        qb.push_bind(limit);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("keyword lookup over {} failed", kind.table()))?;

        rows.iter()
            .map(|row| {
                Ok(Candidate {
                    item: item_from_row(kind, row)?,
                    match_count: row.try_get("match_count")?,
                    score: row.try_get("score")?,
                })
            })
            .collect()
    }

    async fn record_query(&self, entry: &QueryLogEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO query_log (query, result_count, searched_at, elapsed_ms) VALUES (?, ?, ?, ?)",
        )
        .bind(&entry.query)
        .bind(entry.result_count)
        .bind(entry.searched_at)
        .bind(entry.elapsed_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn popular_queries(&self, limit: i64) -> Result<Vec<PopularQuery>> {
        let rows = sqlx::query(
            r#"
            SELECT query,
                   COUNT(*) AS count,
                   AVG(result_count) AS avg_results,
                   AVG(elapsed_ms) AS avg_elapsed_ms
            FROM query_log
            GROUP BY query
            ORDER BY count DESC, query ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PopularQuery {
                    query: row.try_get("query")?,
                    count: row.try_get("count")?,
                    avg_results: row.try_get("avg_results")?,
                    avg_elapsed_ms: row.try_get("avg_elapsed_ms")?,
                })
            })
            .collect()
    }

    async fn suggest(&self, prefix: &str, limit: i64) -> Result<Vec<String>> {
        // substr comparison keeps the prefix literal and case-sensitive
        let rows = sqlx::query(
            r#"
            SELECT token, COUNT(*) AS n
            FROM keyword_index
            WHERE substr(token, 1, length(?1)) = ?1
            GROUP BY token
            ORDER BY n DESC, token ASC
            LIMIT ?2
            "#,
        )
        .bind(prefix)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("token").map_err(Into::into))
            .collect()
    }

    async fn count_content(&self, kind: ContentKind) -> Result<i64> {
        let n: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", kind.table()))
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn count_unique_keywords(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT token) FROM keyword_index")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
