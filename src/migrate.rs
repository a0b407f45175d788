use anyhow::Result;
use sqlx::SqliteConnection;

use crate::config::Config;
use crate::db;

/// Tables in drop order: keyword rows before the items they reference.
const TABLES: [&str; 5] = ["keyword_index", "query_log", "documents", "images", "videos"];

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let result = async {
        let mut conn = pool.acquire().await?;
        apply_schema(&mut *conn).await
    }
    .await;
    pool.close().await;
    result
}

/// Drop every table and recreate the empty schema, in one transaction.
/// Indexed items, keyword rows and the query log are all discarded.
pub async fn reset_schema(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let result = async {
        let mut tx = pool.begin().await?;
        for table in TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(&mut *tx)
                .await?;
        }
        apply_schema(&mut *tx).await?;
        tx.commit().await?;
        Ok::<(), anyhow::Error>(())
    }
    .await;
    pool.close().await;
    if result.is_ok() {
        tracing::info!("schema reset");
    }
    result
}

/// Create every table and index. Idempotent.
pub async fn apply_schema(conn: &mut SqliteConnection) -> Result<()> {
    // Create documents table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            file_type TEXT NOT NULL,
            path TEXT NOT NULL UNIQUE,
            size_bytes INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            body TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create images table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            file_type TEXT NOT NULL,
            path TEXT NOT NULL UNIQUE,
            size_bytes INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            alt_text TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create videos table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            file_type TEXT NOT NULL,
            path TEXT NOT NULL UNIQUE,
            size_bytes INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            duration_seconds INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create keyword index; each row belongs to exactly one item
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS keyword_index (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            token TEXT NOT NULL,
            stem TEXT NOT NULL,
            document_id INTEGER REFERENCES documents(id) ON DELETE CASCADE,
            image_id INTEGER REFERENCES images(id) ON DELETE CASCADE,
            video_id INTEGER REFERENCES videos(id) ON DELETE CASCADE,
            frequency INTEGER NOT NULL DEFAULT 1,
            position INTEGER,
            CHECK (
                (document_id IS NOT NULL) + (image_id IS NOT NULL) + (video_id IS NOT NULL) = 1
            )
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create query log
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS query_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            query TEXT NOT NULL,
            result_count INTEGER NOT NULL,
            searched_at INTEGER NOT NULL,
            elapsed_ms REAL NOT NULL
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Create indexes
    for stmt in [
        "CREATE INDEX IF NOT EXISTS idx_keyword_token ON keyword_index(token)",
        "CREATE INDEX IF NOT EXISTS idx_keyword_stem ON keyword_index(stem)",
        "CREATE INDEX IF NOT EXISTS idx_keyword_document ON keyword_index(document_id)",
        "CREATE INDEX IF NOT EXISTS idx_keyword_image ON keyword_index(image_id)",
        "CREATE INDEX IF NOT EXISTS idx_keyword_video ON keyword_index(video_id)",
        "CREATE INDEX IF NOT EXISTS idx_query_log_query ON query_log(query)",
    ] {
        sqlx::query(stmt).execute(&mut *conn).await?;
    }

    tracing::debug!("schema ready");
    Ok(())
}
