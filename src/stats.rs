//! Corpus statistics.
//!
//! Counts of indexed documents, images, videos and distinct keywords. Used
//! by `csearch stats`. Each count that cannot be read is reported as zero
//! (and logged) rather than failing the command.

use anyhow::Result;

pub use corpus_search_core::models::CorpusStats;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Collect corpus counts.
pub async fn corpus_stats(config: &Config) -> Result<CorpusStats> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());
    let stats = corpus_search_core::search::corpus_stats(&store).await;
    pool.close().await;
    Ok(stats)
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let stats = corpus_stats(config).await?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Corpus Search: Database Stats");
    println!("=============================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Documents:   {}", stats.documents);
    println!("  Images:      {}", stats.images);
    println!("  Videos:      {}", stats.videos);
    println!("  Keywords:    {}", stats.unique_keywords);
    println!();

    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
