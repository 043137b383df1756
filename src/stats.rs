//! Row counts for the status panel.
//!
//! Counting never fails outward: if any of the queries errors (for
//! instance because the schema has not been created yet) every count is
//! reported as zero.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::warn;

use crate::models::Stats;

pub async fn stats(pool: &SqlitePool) -> Stats {
    match count_all(pool).await {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to count rows, reporting zeros");
            Stats::default()
        }
    }
}

async fn count_all(pool: &SqlitePool) -> Result<Stats> {
    let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await?;
    let chunks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
        .fetch_one(pool)
        .await?;
    let history: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM qa_history")
        .fetch_one(pool)
        .await?;

    Ok(Stats {
        documents,
        chunks,
        history,
    })
}
