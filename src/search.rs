//! Keyword search over indexed chunks.
//!
//! The query is lowercased and split on whitespace; every term longer than
//! `min_keyword_chars` becomes a `LIKE '%term%'` clause and the clauses are
//! OR'ed together. Matching rows come back in insertion order, identical
//! texts are collapsed, and at most `max_hits` texts are returned.
//!
//! SQLite's `LIKE` folds case for ASCII letters only, so accented
//! capitals in the indexed text (e.g. `PRINCÍPIOS`) only match a keyword
//! spelled with the same accented capital.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::config::SearchConfig;

/// Terms of `query` that qualify as keywords.
pub fn extract_keywords(query: &str, min_keyword_chars: usize) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > min_keyword_chars)
        .map(|t| t.to_string())
        .collect()
}

/// Escapes `LIKE` metacharacters so the keyword matches literally.
fn escape_like(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len() + 2);
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub async fn search_chunks(
    pool: &SqlitePool,
    query: &str,
    config: &SearchConfig,
) -> Result<Vec<String>> {
    let keywords = extract_keywords(query, config.min_keyword_chars);
    if keywords.is_empty() {
        return Ok(Vec::new());
    }

    let clauses = vec!["chunk_text LIKE ? ESCAPE '\\'"; keywords.len()].join(" OR ");
    let sql = format!("SELECT chunk_text FROM chunks WHERE {} ORDER BY id", clauses);

    let mut q = sqlx::query(&sql);
    for kw in &keywords {
        q = q.bind(format!("%{}%", escape_like(kw)));
    }
    let rows = q.fetch_all(pool).await?;

    let mut hits: Vec<String> = Vec::new();
    for row in &rows {
        let text: String = row.get("chunk_text");
        if !hits.contains(&text) {
            hits.push(text);
        }
        if hits.len() >= config.max_hits {
            break;
        }
    }

    Ok(hits)
}
