//! Indexing of source texts for keyword search.
//!
//! Texts are split line by line; each trimmed line longer than
//! `min_chunk_chars` characters becomes one chunk. A document row and all
//! of its chunks are written in a single transaction.

use anyhow::{Context, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::path::Path;
use tracing::info;

use crate::models::Document;

/// Title under which the built-in ethics-code summary is indexed.
pub const BUILTIN_TITLE: &str = "Código de Ética (Resumo)";

/// Summary of the professional code of ethics shipped with the binary.
pub const BUILTIN_TEXT: &str = include_str!("../catalog/ethics_code.txt");

/// Message reported after the index has been rebuilt.
pub const RESET_MESSAGE: &str = "Cérebro ético atualizado com sucesso!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexReport {
    pub doc_id: i64,
    pub chunks: usize,
}

/// Lines of `text` that qualify as chunks, trimmed.
pub fn split_lines(text: &str, min_chunk_chars: usize) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > min_chunk_chars)
        .collect()
}

pub async fn index_text(
    pool: &SqlitePool,
    title: &str,
    text: &str,
    min_chunk_chars: usize,
) -> Result<IndexReport> {
    let mut tx = pool.begin().await?;
    let report = insert_document(&mut tx, title, text, min_chunk_chars).await?;
    tx.commit().await?;

    info!(doc_id = report.doc_id, title, chunks = report.chunks, "indexed document");
    Ok(report)
}

async fn insert_document(
    conn: &mut SqliteConnection,
    title: &str,
    text: &str,
    min_chunk_chars: usize,
) -> Result<IndexReport> {
    let chunks = split_lines(text, min_chunk_chars);
    let created_at = chrono::Local::now().format("%Y-%m-%d").to_string();

    let doc_id = sqlx::query("INSERT INTO documents (title, created_at) VALUES (?, ?)")
        .bind(title)
        .bind(&created_at)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    for chunk in &chunks {
        sqlx::query("INSERT INTO chunks (doc_id, chunk_text) VALUES (?, ?)")
            .bind(doc_id)
            .bind(*chunk)
            .execute(&mut *conn)
            .await?;
    }

    Ok(IndexReport {
        doc_id,
        chunks: chunks.len(),
    })
}

async fn delete_documents(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query("DELETE FROM chunks").execute(&mut *conn).await?;
    sqlx::query("DELETE FROM documents").execute(&mut *conn).await?;
    Ok(())
}

/// Indexes a UTF-8 text file. The title defaults to the file stem.
pub async fn index_file(
    pool: &SqlitePool,
    path: &Path,
    title: Option<&str>,
    min_chunk_chars: usize,
) -> Result<IndexReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let title = match title {
        Some(t) => t.to_string(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    };

    index_text(pool, &title, &text, min_chunk_chars).await
}

pub async fn clear_documents(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    delete_documents(&mut tx).await?;
    tx.commit().await?;
    Ok(())
}

/// Drops every indexed document and re-indexes the built-in text.
///
/// Both steps share one transaction; on failure the previous index is kept.
pub async fn reset_index(pool: &SqlitePool, min_chunk_chars: usize) -> Result<IndexReport> {
    let mut tx = pool.begin().await?;
    delete_documents(&mut tx).await?;
    let report = insert_document(&mut tx, BUILTIN_TITLE, BUILTIN_TEXT, min_chunk_chars).await?;
    tx.commit().await?;

    info!(doc_id = report.doc_id, chunks = report.chunks, "rebuilt index");
    Ok(report)
}

/// Indexes the built-in text when the chunk table is empty.
///
/// Returns `None` if there was already something indexed.
pub async fn seed_if_empty(
    pool: &SqlitePool,
    min_chunk_chars: usize,
) -> Result<Option<IndexReport>> {
    let chunks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
        .fetch_one(pool)
        .await?;
    if chunks > 0 {
        return Ok(None);
    }
    let report = index_text(pool, BUILTIN_TITLE, BUILTIN_TEXT, min_chunk_chars).await?;
    Ok(Some(report))
}

pub async fn list_documents(pool: &SqlitePool) -> Result<Vec<Document>> {
    let rows = sqlx::query(
        r#"
        SELECT d.id, d.title, d.created_at, COUNT(c.id) AS chunk_count
        FROM documents d
        LEFT JOIN chunks c ON c.doc_id = d.id
        GROUP BY d.id
        ORDER BY d.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| Document {
            id: row.get("id"),
            title: row.get("title"),
            created_at: row.get("created_at"),
            chunk_count: row.get("chunk_count"),
        })
        .collect())
}
