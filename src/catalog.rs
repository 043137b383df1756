//! Curated answer catalog.
//!
//! Maps canonical ethics questions to pre-written HTML answer fragments.
//! The built-in catalog (`catalog/answers.toml`) is compiled into the
//! binary; an external file with the same shape can replace it through
//! `[catalog] path` in the config.
//!
//! Entry order is significant: the lexical matching stage walks entries in
//! declaration order and stops at the first hit.
//!
//! # File format
//!
//! ```toml
//! quick_questions = ["Posso atender de graça?"]
//!
//! [[answer]]
//! topic = "geral"
//! question = "Posso atender de graça?"
//! html = '''
//! <div class="resposta-humanizada">...</div>
//! '''
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../catalog/answers.toml");

/// One curated question and its canned answer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Entry {
    #[serde(default)]
    pub topic: String,
    pub question: String,
    pub html: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    quick_questions: Vec<String>,
    #[serde(default, rename = "answer")]
    answers: Vec<Entry>,
}

/// A topic slug with the canonical questions filed under it.
#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    pub topic: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<Entry>,
    by_question: HashMap<String, usize>,
    quick_questions: Vec<String>,
}

impl Catalog {
    /// The catalog shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_CATALOG).context("built-in catalog is invalid")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))
    }

    /// Loads the configured catalog, or the built-in one when no path is set.
    pub fn from_config(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;

        let mut entries = Vec::with_capacity(file.answers.len());
        let mut by_question = HashMap::with_capacity(file.answers.len());

        for mut entry in file.answers {
            // A question with no words once `?` is stripped would satisfy the
            // overlap test for any query.
            if entry.question.replace('?', "").split_whitespace().next().is_none() {
                bail!("catalog entry #{} has no words in its question", entries.len() + 1);
            }
            entry.html = entry.html.trim().to_string();
            if entry.html.is_empty() {
                bail!("catalog entry '{}' has an empty answer", entry.question);
            }
            if by_question.contains_key(&entry.question) {
                bail!("duplicate catalog question: '{}'", entry.question);
            }
            by_question.insert(entry.question.clone(), entries.len());
            entries.push(entry);
        }

        Ok(Self {
            entries,
            by_question,
            quick_questions: file.quick_questions,
        })
    }

    /// Exact, case-sensitive lookup of a canonical question.
    pub fn get_exact(&self, question: &str) -> Option<&Entry> {
        self.by_question
            .get(question)
            .and_then(|&i| self.entries.get(i))
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn quick_questions(&self) -> &[String] {
        &self.quick_questions
    }

    /// Topics in order of first appearance.
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = Vec::new();
        for entry in &self.entries {
            match topics.iter_mut().find(|t| t.topic == entry.topic) {
                Some(t) => t.questions.push(entry.question.clone()),
                None => topics.push(Topic {
                    topic: entry.topic.clone(),
                    questions: vec![entry.question.clone()],
                }),
            }
        }
        topics
    }

    pub fn by_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries.iter().filter(move |e| e.topic == topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 54);
        assert_eq!(catalog.quick_questions().len(), 9);
    }

    #[test]
    fn test_exact_lookup_is_case_sensitive() {
        let catalog = Catalog::builtin().unwrap();
        let entry = catalog.get_exact("Posso atender de graça?").unwrap();
        assert!(entry.html.contains("Pro bono"));
        assert!(catalog.get_exact("posso atender de graça?").is_none());
    }

    #[test]
    fn test_html_is_trimmed() {
        let catalog = Catalog::builtin().unwrap();
        for e in catalog.entries() {
            assert!(e.html.starts_with("<div"), "untrimmed: {}", e.question);
            assert!(e.html.ends_with("</div>"), "untrimmed: {}", e.question);
        }
    }

    #[test]
    fn test_topics_in_declaration_order() {
        let catalog = Catalog::builtin().unwrap();
        let topics: Vec<String> = catalog.topics().into_iter().map(|t| t.topic).collect();
        assert_eq!(
            topics,
            vec!["sigilo", "limites", "relacoes-duais", "postura", "autonomia", "geral"]
        );
        assert_eq!(catalog.by_topic("sigilo").count(), 10);
        assert_eq!(catalog.by_topic("geral").count(), 4);
    }

    #[test]
    fn test_duplicate_question_rejected() {
        let content = r#"
[[answer]]
question = "A?"
html = "<p>1</p>"

[[answer]]
question = "A?"
html = "<p>2</p>"
"#;
        let err = Catalog::from_toml(content).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_answer_rejected() {
        let content = "[[answer]]\nquestion = \"A?\"\nhtml = \"   \"\n";
        assert!(Catalog::from_toml(content).is_err());
    }

    #[test]
    fn test_empty_question_rejected() {
        let content = "[[answer]]\nquestion = \"   \"\nhtml = \"<p>a</p>\"\n";
        let err = Catalog::from_toml(content).unwrap_err();
        assert!(err.to_string().contains("no words"));
    }

    #[test]
    fn test_question_marks_only_rejected() {
        let content = r#"
[[answer]]
question = "? ??"
html = "<p>vazio</p>"

[[answer]]
question = "Posso atender de graça?"
html = "<p>Pro bono</p>"
"#;
        let err = Catalog::from_toml(content).unwrap_err();
        assert!(err.to_string().contains("#1"));
    }

    #[test]
    fn test_load_from_file_replaces_builtin() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("answers.toml");
        std::fs::write(
            &path,
            r#"
quick_questions = ["Posso gravar a sessão?"]

[[answer]]
topic = "registro"
question = "Posso gravar a sessão?"
html = '''
<p>Somente com consentimento.</p>
'''
"#,
        )
        .unwrap();

        let catalog = Catalog::from_config(Some(path.as_path())).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.quick_questions().to_vec(), vec!["Posso gravar a sessão?"]);
        assert_eq!(
            catalog.get_exact("Posso gravar a sessão?").unwrap().html,
            "<p>Somente com consentimento.</p>"
        );
        assert!(catalog.get_exact("Posso atender de graça?").is_none());
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = Catalog::load(Path::new("/nonexistent/answers.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/answers.toml"));
    }

    #[test]
    fn test_missing_quick_questions_defaults_empty() {
        let content = "[[answer]]\nquestion = \"A?\"\nhtml = \"<p>a</p>\"\n";
        let catalog = Catalog::from_toml(content).unwrap();
        assert!(catalog.quick_questions().is_empty());
        assert_eq!(catalog.entries()[0].topic, "");
    }
}
