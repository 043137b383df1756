//! Application service shared by the CLI and the HTTP server.
//!
//! Owns the connection pool, the loaded catalog and the configuration, and
//! pairs every resolved question with its history entry.

use anyhow::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::db;
use crate::history;
use crate::ingest::{self, IndexReport};
use crate::matcher;
use crate::migrate;
use crate::models::{QaEntry, Resolution, Stats};
use crate::stats;

#[derive(Clone)]
pub struct EthosService {
    pool: SqlitePool,
    catalog: Arc<Catalog>,
    config: Arc<Config>,
}

impl EthosService {
    pub fn new(pool: SqlitePool, catalog: Catalog, config: Config) -> Self {
        Self {
            pool,
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }

    /// Connects, applies the schema, loads the configured catalog and
    /// seeds the index if nothing has been indexed yet.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply(&pool).await?;

        let catalog = Catalog::from_config(config.catalog.path.as_deref())?;
        info!(entries = catalog.len(), "catalog loaded");

        if let Some(report) = ingest::seed_if_empty(&pool, config.index.min_chunk_chars).await? {
            info!(chunks = report.chunks, "seeded empty index with built-in text");
        }

        Ok(Self::new(pool, catalog, config.clone()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolves a question and logs the pair.
    pub async fn ask(&self, question: &str) -> Result<Resolution> {
        let question = question.trim();
        let resolution =
            matcher::resolve(&self.pool, &self.catalog, &self.config, question).await?;
        history::save(&self.pool, question, &resolution.answer).await?;
        info!(kind = resolution.kind.as_str(), "question answered");
        Ok(resolution)
    }

    /// Most recent history, capped at `[history] limit`.
    pub async fn history(&self, limit: Option<i64>) -> Result<Vec<QaEntry>> {
        let max = self.config.history.limit;
        let limit = limit.unwrap_or(max).clamp(1, max);
        history::recent(&self.pool, limit).await
    }

    pub async fn clear_history(&self) -> Result<u64> {
        history::clear(&self.pool).await
    }

    pub async fn stats(&self) -> Stats {
        stats::stats(&self.pool).await
    }

    pub async fn reset_index(&self) -> Result<IndexReport> {
        let report = ingest::reset_index(&self.pool, self.config.index.min_chunk_chars).await?;
        info!(chunks = report.chunks, "index reset");
        Ok(report)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
