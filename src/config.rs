use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use corpus_search_core::search::SearchOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
    #[serde(default = "default_suggest_limit")]
    pub suggest_limit: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            snippet_chars: default_snippet_chars(),
            suggest_limit: default_suggest_limit(),
        }
    }
}

fn default_limit() -> i64 {
    20
}
fn default_snippet_chars() -> usize {
    200
}
fn default_suggest_limit() -> i64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: default_corpus_root(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_corpus_root() -> PathBuf {
    PathBuf::from("./corpus")
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "corpus_search=info".to_string()
}

impl Config {
    /// Defaults for every section, with the database at its usual location.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/csearch.sqlite"),
            },
            search: SearchConfig::default(),
            corpus: CorpusConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Search options for a query, with `limit` falling back to
    /// `[search].default_limit`.
    pub fn search_options(
        &self,
        filter: corpus_search_core::models::ContentFilter,
        limit: Option<i64>,
    ) -> SearchOptions {
        SearchOptions {
            filter,
            limit: limit.unwrap_or(self.search.default_limit),
            snippet_chars: self.search.snippet_chars,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.search.default_limit < 1 {
        anyhow::bail!("search.default_limit must be >= 1");
    }
    if config.search.snippet_chars < 20 {
        anyhow::bail!("search.snippet_chars must be >= 20");
    }
    if config.search.suggest_limit < 1 {
        anyhow::bail!("search.suggest_limit must be >= 1");
    }
    for pattern in &config.corpus.exclude_globs {
        globset::Glob::new(pattern)
            .with_context(|| format!("invalid corpus.exclude_globs pattern: '{}'", pattern))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_only_db_section_required() {
        let config = parse("[db]\npath = \"/tmp/x.sqlite\"\n").unwrap();
        assert_eq!(config.search.default_limit, 20);
        assert_eq!(config.search.snippet_chars, 200);
        assert_eq!(config.search.suggest_limit, 5);
        assert_eq!(config.corpus.root, PathBuf::from("./corpus"));
        assert!(!config.corpus.follow_symlinks);
        assert_eq!(config.logging.filter, "corpus_search=info");
    }

    #[test]
    fn test_example_config_parses() {
        let config = parse(include_str!("../config/csearch.example.toml")).unwrap();
        assert_eq!(config.corpus.exclude_globs.len(), 2);
    }

    #[test]
    fn test_missing_db_section_is_rejected() {
        assert!(parse("[search]\ndefault_limit = 3\n").is_err());
    }

    #[test]
    fn test_invalid_limits_are_rejected() {
        let err = parse("[db]\npath = \"x\"\n[search]\ndefault_limit = 0\n").unwrap_err();
        assert!(err.to_string().contains("default_limit"));

        let err = parse("[db]\npath = \"x\"\n[search]\nsnippet_chars = 5\n").unwrap_err();
        assert!(err.to_string().contains("snippet_chars"));
    }

    #[test]
    fn test_bad_exclude_glob_is_rejected() {
        let src = "[db]\npath = \"x\"\n[corpus]\nexclude_globs = [\"a[\"]\n";
        assert!(parse(src).is_err());
    }

    #[test]
    fn test_search_options_fall_back_to_default_limit() {
        let config = Config::minimal();
        let opts = config.search_options(Default::default(), None);
        assert_eq!(opts.limit, 20);
        assert_eq!(config.search_options(Default::default(), Some(3)).limit, 3);
    }
}
