//! # Corpus Search CLI (`csearch`)
//!
//! The `csearch` binary indexes a local corpus of documents, images and
//! videos into SQLite and runs ranked keyword searches over it.
//!
//! ## Usage
//!
//! ```bash
//! csearch --config ./config/csearch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `csearch init` | Create the SQLite database and schema |
//! | `csearch reset` | Drop and recreate every table |
//! | `csearch index <path>` | Index one file (kind chosen by extension) |
//! | `csearch index-folder [root] [--rebuild]` | Index every supported file below a folder |
//! | `csearch index-image <path>` | Index an image with a description and alt text |
//! | `csearch index-video <path>` | Index a video with a description and duration |
//! | `csearch remove <path>` | Remove an indexed item |
//! | `csearch search "<query>"` | Ranked search |
//! | `csearch get <kind> <id>` | Show one item and its keywords |
//! | `csearch stats` | Corpus counts |
//! | `csearch popular` | Most frequent queries |
//! | `csearch suggest <prefix>` | Complete a token prefix |
//!
//! ## Examples
//!
//! ```bash
//! csearch init
//! csearch index-folder ./corpus
//! csearch search "machine learning" --type documents --limit 5
//! csearch search ia --json
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to override `[logging].filter`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use corpus_search::indexer::{ImageMetadata, VideoMetadata};
use corpus_search::{config, get, indexer, migrate, search, stats};
use corpus_search_core::models::{ContentFilter, ContentKind};

/// Corpus Search CLI: index local documents, images and videos and search
/// them by keyword.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/csearch.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "csearch",
    about = "Keyword search over a local corpus of documents, images and videos",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/csearch.toml`.
    #[arg(long, global = true, default_value = "./config/csearch.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all tables (documents, images,
    /// videos, keyword_index, query_log). Safe to run repeatedly.
    Init,

    /// Drop and recreate every table, discarding the index and query log.
    Reset,

    /// Index one file; its kind follows from the extension.
    Index {
        /// File to index.
        path: PathBuf,
    },

    /// Index every supported file below a folder.
    IndexFolder {
        /// Folder to walk. Defaults to `[corpus].root`.
        root: Option<PathBuf>,

        /// Reset the database first and rebuild the index from scratch.
        #[arg(long)]
        rebuild: bool,
    },

    /// Index an image with explicit metadata.
    IndexImage {
        path: PathBuf,

        /// Title; defaults to the file name without extension.
        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        alt_text: String,
    },

    /// Index a video with explicit metadata.
    IndexVideo {
        path: PathBuf,

        /// Title; defaults to the file name without extension.
        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value = "")]
        description: String,

        /// Duration in seconds.
        #[arg(long, default_value_t = 0)]
        duration: i64,
    },

    /// Remove an indexed item by path.
    Remove { path: PathBuf },

    /// Search the corpus.
    ///
    /// Returns items ranked by the number of matching keyword occurrences,
    /// with excerpts for documents.
    Search {
        /// The search query string.
        query: String,

        /// Content filter: `all`, `documents`, `images` or `videos`.
        #[arg(long = "type", default_value = "all")]
        filter: ContentFilter,

        /// Maximum number of results. Defaults to `[search].default_limit`.
        #[arg(long)]
        limit: Option<i64>,

        /// Print the full response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one item and its keyword rows.
    Get {
        /// `document`, `image` or `video`.
        kind: ContentKind,

        id: i64,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show corpus counts.
    Stats,

    /// Show the most frequent queries.
    Popular {
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },

    /// Suggest indexed tokens starting with a prefix (at least 2 characters).
    Suggest {
        prefix: String,

        /// Defaults to `[search].suggest_limit`.
        #[arg(long)]
        limit: Option<i64>,
    },
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;
    init_tracing(&cfg.logging.filter);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Index { path } => {
            indexer::run_index(&cfg, &path).await?;
        }
        Commands::Reset => {
            migrate::reset_schema(&cfg).await?;
            println!("Database reset.");
        }
        Commands::IndexFolder { root, rebuild } => {
            indexer::run_index_folder(&cfg, root.as_deref(), rebuild).await?;
        }
        Commands::IndexImage {
            path,
            title,
            description,
            alt_text,
        } => {
            let meta = ImageMetadata {
                title,
                description,
                alt_text,
            };
            indexer::run_index_image(&cfg, &path, meta).await?;
        }
        Commands::IndexVideo {
            path,
            title,
            description,
            duration,
        } => {
            let meta = VideoMetadata {
                title,
                description,
                duration_seconds: duration,
            };
            indexer::run_index_video(&cfg, &path, meta).await?;
        }
        Commands::Remove { path } => {
            indexer::run_remove(&cfg, &path).await?;
        }
        Commands::Search {
            query,
            filter,
            limit,
            json,
        } => {
            search::run_search(&cfg, &query, filter, limit, json).await?;
        }
        Commands::Get { kind, id, json } => {
            get::run_get(&cfg, kind, id, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Popular { limit } => {
            search::run_popular(&cfg, limit).await?;
        }
        Commands::Suggest { prefix, limit } => {
            search::run_suggest(&cfg, &prefix, limit).await?;
        }
    }

    Ok(())
}
