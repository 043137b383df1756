//! Question/answer log.
//!
//! Every answered question is appended to `qa_history` together with the
//! exact HTML that was served, stamped `DD/MM HH:MM` in local time.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::models::QaEntry;

pub async fn save(pool: &SqlitePool, question: &str, answer: &str) -> Result<i64> {
    let created_at = chrono::Local::now().format("%d/%m %H:%M").to_string();
    let id = sqlx::query("INSERT INTO qa_history (question, answer, created_at) VALUES (?, ?, ?)")
        .bind(question)
        .bind(answer)
        .bind(&created_at)
        .execute(pool)
        .await?
        .last_insert_rowid();
    Ok(id)
}

/// Newest entries first.
pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<QaEntry>> {
    let rows = sqlx::query(
        "SELECT id, question, answer, created_at FROM qa_history ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| QaEntry {
            id: row.get("id"),
            question: row.get("question"),
            answer: row.get("answer"),
            created_at: row.get("created_at"),
        })
        .collect())
}

/// Removes every logged entry, returning how many were deleted.
pub async fn clear(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM qa_history").execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate::apply(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let pool = memory_pool().await;
        for i in 0..5 {
            save(&pool, &format!("pergunta {}", i), "<p>resposta</p>")
                .await
                .unwrap();
        }

        let entries = recent(&pool, 3).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].question, "pergunta 4");
        assert_eq!(entries[2].question, "pergunta 2");
    }

    #[tokio::test]
    async fn test_timestamp_format() {
        let pool = memory_pool().await;
        save(&pool, "q", "a").await.unwrap();
        let entry = &recent(&pool, 1).await.unwrap()[0];
        // DD/MM HH:MM
        assert_eq!(entry.created_at.len(), 11);
        assert_eq!(&entry.created_at[2..3], "/");
        assert_eq!(&entry.created_at[5..6], " ");
        assert_eq!(&entry.created_at[8..9], ":");
    }

    #[tokio::test]
    async fn test_clear() {
        let pool = memory_pool().await;
        save(&pool, "q1", "a").await.unwrap();
        save(&pool, "q2", "a").await.unwrap();
        assert_eq!(clear(&pool).await.unwrap(), 2);
        assert!(recent(&pool, 50).await.unwrap().is_empty());
    }
}
