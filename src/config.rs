use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    /// Fraction of a canonical question's words that must appear in the
    /// user's question for the overlap stage to accept it.
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: default_overlap_threshold(),
        }
    }
}

fn default_overlap_threshold() -> f64 {
    0.6
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Terms must be strictly longer than this many characters to be used
    /// as keywords.
    #[serde(default = "default_min_keyword_chars")]
    pub min_keyword_chars: usize,
    #[serde(default = "default_max_hits")]
    pub max_hits: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_keyword_chars: default_min_keyword_chars(),
            max_hits: default_max_hits(),
        }
    }
}

fn default_min_keyword_chars() -> usize {
    3
}
fn default_max_hits() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Lines must be strictly longer than this many characters to become a chunk.
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            min_chunk_chars: default_min_chunk_chars(),
        }
    }
}

fn default_min_chunk_chars() -> usize {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// Optional external catalog replacing the built-in answers.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Config used when no file is supplied: database under `./data`,
    /// server on the local loopback.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/ethospsi.sqlite3"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:5000".to_string(),
            },
            matching: MatchingConfig::default(),
            search: SearchConfig::default(),
            index: IndexConfig::default(),
            history: HistoryConfig::default(),
            catalog: CatalogConfig::default(),
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
    let threshold = config.matching.overlap_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        anyhow::bail!("matching.overlap_threshold must be in (0.0, 1.0]");
    }

    if config.search.max_hits == 0 {
        anyhow::bail!("search.max_hits must be > 0");
    }

    if config.history.limit < 1 {
        anyhow::bail!("history.limit must be >= 1");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(())
}
