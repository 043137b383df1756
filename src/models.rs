//! Core data models used throughout EthosPsi.
//!
//! These types represent the indexed documents, the logged
//! question/answer pairs, and the outcome of resolving a question.

use serde::Serialize;

/// An indexed source text with the number of chunks it produced.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    /// `YYYY-MM-DD`
    pub created_at: String,
    pub chunk_count: i64,
}

/// A logged question and the answer that was served for it.
#[derive(Debug, Clone, Serialize)]
pub struct QaEntry {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// `DD/MM HH:MM`, local time.
    pub created_at: String,
}

/// Row counts for the three tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub documents: i64,
    pub chunks: i64,
    pub history: i64,
}

/// Which stage of the resolution pipeline produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Contained,
    Overlap,
    Search,
    Fallback,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Contained => "contained",
            MatchKind::Overlap => "overlap",
            MatchKind::Search => "search",
            MatchKind::Fallback => "fallback",
        }
    }
}

/// The answer chosen for a question.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub kind: MatchKind,
    pub answer: String,
    /// Canonical question of the curated entry, for the catalog stages.
    pub matched_question: Option<String>,
    /// Chunk texts, for the search stage.
    pub hits: Vec<String>,
}
