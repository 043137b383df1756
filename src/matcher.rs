//! Question resolution pipeline.
//!
//! A question is answered by the first stage that produces something:
//!
//! 1. **Exact** — the question is literally a canonical catalog question.
//! 2. **Lexical** — after lowercasing and removing `?`, each catalog entry
//!    is tried in order: the query contained in the key wins, otherwise a
//!    word-set overlap covering at least `overlap_threshold` of the key's
//!    words wins.
//! 3. **Search** — keyword search over indexed chunks, rendered as a list
//!    of reference cards.
//! 4. **Fallback** — a fixed "not found" message.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use std::collections::HashSet;

use crate::catalog::{Catalog, Entry};
use crate::config::Config;
use crate::models::{MatchKind, Resolution};
use crate::search;

pub const FALLBACK_HTML: &str = r#"<div class="resposta-humanizada">
    <h3>🤔 Dúvida não encontrada.</h3>
    <div class="alert-box warning">
        Não encontrei uma resposta específica no meu banco de dados atual.
    </div>
    <p>Tente clicar em um dos botões abaixo para ver exemplos de perguntas que eu sei responder.</p>
</div>"#;

/// Lowercases and strips every `?`.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace('?', "")
}

/// Finds the curated entry for `query` using the exact and lexical stages.
pub fn match_catalog<'a>(
    catalog: &'a Catalog,
    query: &str,
    overlap_threshold: f64,
) -> Option<(MatchKind, &'a Entry)> {
    if let Some(entry) = catalog.get_exact(query) {
        return Some((MatchKind::Exact, entry));
    }

    let q_clean = normalize(query);
    // An empty needle is contained in every key.
    if q_clean.trim().is_empty() {
        return None;
    }
    let q_words: HashSet<&str> = q_clean.split_whitespace().collect();

    for entry in catalog.entries() {
        let key_clean = normalize(&entry.question);

        if key_clean.contains(&q_clean) {
            return Some((MatchKind::Contained, entry));
        }

        let key_words: HashSet<&str> = key_clean.split_whitespace().collect();
        let common = key_words.intersection(&q_words).count();
        if common as f64 >= key_words.len() as f64 * overlap_threshold {
            return Some((MatchKind::Overlap, entry));
        }
    }

    None
}

/// Escapes text for inclusion in an HTML fragment.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders keyword-search hits as a "search results" answer.
pub fn render_search_hits(hits: &[String]) -> String {
    let cards: String = hits
        .iter()
        .map(|h| {
            format!(
                "<div class='ref-card source-cfp'><div class='ref-body'>...{}...</div></div>",
                escape_html(h)
            )
        })
        .collect();

    format!(
        r#"<div class="resposta-humanizada">
    <h3>Resultados da Busca</h3>
    <p>Não encontrei uma resposta pronta exata, mas veja o que o Código diz sobre temas relacionados:</p>
    {}
    <div class="alert-box tip">💡 Tente simplificar a pergunta ou usar os botões de sugestão.</div>
</div>"#,
        cards
    )
}

/// Runs the full pipeline for an already-trimmed question.
pub async fn resolve(
    pool: &SqlitePool,
    catalog: &Catalog,
    config: &Config,
    question: &str,
) -> Result<Resolution> {
    if question.trim().is_empty() {
        bail!("invalid input: question must not be empty");
    }

    if let Some((kind, entry)) =
        match_catalog(catalog, question, config.matching.overlap_threshold)
    {
        return Ok(Resolution {
            kind,
            answer: entry.html.clone(),
            matched_question: Some(entry.question.clone()),
            hits: Vec::new(),
        });
    }

    let hits = search::search_chunks(pool, question, &config.search).await?;
    if !hits.is_empty() {
        return Ok(Resolution {
            kind: MatchKind::Search,
            answer: render_search_hits(&hits),
            matched_question: None,
            hits,
        });
    }

    Ok(Resolution {
        kind: MatchKind::Fallback,
        answer: FALLBACK_HTML.to_string(),
        matched_question: None,
        hits: Vec::new(),
    })
}
