//! Search, suggestions, and query popularity.
//!
//! Application-level entry points. The ranking algorithm lives in
//! `corpus_search_core::search` and runs through the [`Store`] trait; this
//! wrapper handles config, the database connection, and CLI output.
//!
//! [`Store`]: corpus_search_core::store::Store

use anyhow::Result;

pub use corpus_search_core::search::{SearchHit, SearchOptions, SearchResponse};
use corpus_search_core::models::{ContentFilter, PopularQuery};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Core search function returning structured results.
///
/// `limit` falls back to `[search].default_limit`.
pub async fn search_content(
    config: &Config,
    query: &str,
    filter: ContentFilter,
    limit: Option<i64>,
) -> Result<SearchResponse> {
    let opts = config.search_options(filter, limit);
    if corpus_search_core::search::query_terms(query).is_empty() {
        tracing::debug!(query, "query has no searchable terms");
        return Ok(SearchResponse::empty());
    }

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let response = corpus_search_core::search::search(&store, query, &opts).await;
    pool.close().await;
    response
}

/// Most frequent logged queries.
pub async fn popular_queries(config: &Config, limit: i64) -> Result<Vec<PopularQuery>> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let popular = corpus_search_core::search::popular_queries(&store, limit).await;
    pool.close().await;
    Ok(popular)
}

/// Indexed tokens starting with `prefix`. `limit` falls back to
/// `[search].suggest_limit`.
pub async fn suggest(config: &Config, prefix: &str, limit: Option<i64>) -> Result<Vec<String>> {
    let limit = limit.unwrap_or(config.search.suggest_limit);
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let suggestions = corpus_search_core::search::suggest(&store, prefix, limit).await;
    pool.close().await;
    suggestions
}

/// CLI entry point for `csearch search`. Prints results to stdout.
pub async fn run_search(
    config: &Config,
    query: &str,
    filter: ContentFilter,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let response = search_content(config, query, filter, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!(
        "{} result(s) in {:.2} ms",
        response.total_count, response.elapsed_ms
    );
    println!();
    for (i, hit) in response.results.iter().enumerate() {
        println!(
            "{}. [{}] {} / {}",
            i + 1,
            hit.score,
            hit.kind.label(),
            hit.title
        );
        println!("    path: {}", hit.path);
        println!("    matches: {}", hit.match_count);
        if let Some(ref alt) = hit.alt_text {
            if !alt.is_empty() {
                println!("    alt: {}", alt);
            }
        }
        if let Some(secs) = hit.duration_seconds {
            println!("    duration: {}s", secs);
        }
        if !hit.snippet.is_empty() {
            println!("    excerpt: \"{}\"", hit.snippet.replace('\n', " ").trim());
        }
        println!("    id: {}", hit.id);
        println!();
    }

    Ok(())
}

/// CLI entry point for `csearch popular`.
pub async fn run_popular(config: &Config, limit: i64) -> Result<()> {
    let popular = popular_queries(config, limit).await?;
    if popular.is_empty() {
        println!("No queries logged yet.");
        return Ok(());
    }

    println!(
        "  {:<32} {:>6} {:>12} {:>12}",
        "QUERY", "COUNT", "AVG RESULTS", "AVG MS"
    );
    println!("  {}", "-".repeat(66));
    for p in &popular {
        println!(
            "  {:<32} {:>6} {:>12.1} {:>12.2}",
            p.query, p.count, p.avg_results, p.avg_elapsed_ms
        );
    }
    Ok(())
}

/// CLI entry point for `csearch suggest`.
pub async fn run_suggest(config: &Config, prefix: &str, limit: Option<i64>) -> Result<()> {
    for token in suggest(config, prefix, limit).await? {
        println!("{}", token);
    }
    Ok(())
}
