use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ethospsi_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ethospsi");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/ethospsi.sqlite3"

[server]
bind = "127.0.0.1:5000"

[history]
limit = 50
"#,
        root.display()
    );

    let config_path = config_dir.join("ethospsi.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ethospsi_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ethospsi binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/ethospsi.sqlite3").exists());
}

#[test]
fn test_init_idempotent_and_seeds_once() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run(&config_path, &["init"]);
    assert!(success1, "First init failed");
    let (_, _, success2) = run(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");

    let (stdout, _, _) = run(&config_path, &["stats"]);
    assert!(stdout.contains("Documents:   1"), "got: {}", stdout);
    assert!(stdout.contains("Chunks:      14"), "got: {}", stdout);
}

#[test]
fn test_ask_exact_question() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run(&config_path, &["ask", "Posso atender de graça?"]);
    assert!(success, "ask failed: stderr={}", stderr);
    assert!(stdout.contains("match: exact"));
    assert!(stdout.contains("Pro bono"));
}

#[test]
fn test_ask_json_output() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run(&config_path, &["ask", "banana morango", "--json"]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["kind"], "fallback");
    assert!(value["answer"]
        .as_str()
        .unwrap()
        .contains("Dúvida não encontrada"));
}

#[test]
fn test_ask_blank_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run(&config_path, &["ask", "   "]);
    assert!(!success);
    assert!(stderr.contains("must not be empty"));
}

#[test]
fn test_history_records_questions() {
    let (_tmp, config_path) = setup_test_env();

    run(&config_path, &["ask", "Posso atender de graça?"]);
    run(&config_path, &["ask", "atender amigos"]);

    let (stdout, _, success) = run(&config_path, &["history", "--limit", "1"]);
    assert!(success);
    assert!(stdout.contains("atender amigos"));
    assert!(!stdout.contains("Posso atender de graça?"));

    let (stdout, _, _) = run(&config_path, &["history", "clear"]);
    assert!(stdout.contains("Deleted 2 history entries."));

    let (stdout, _, _) = run(&config_path, &["history"]);
    assert!(stdout.contains("No history."));
}

#[test]
fn test_index_file_makes_text_searchable() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("resolucao.txt");
    fs::write(
        &doc,
        "Resolução sobre teleatendimento e plataformas digitais seguras.\ncurta\n",
    )
    .unwrap();

    let (stdout, stderr, success) = run(
        &config_path,
        &["index", doc.to_str().unwrap(), "--title", "Resolução"],
    );
    assert!(success, "index failed: {}", stderr);
    assert!(stdout.contains("chunks: 1"));

    let (stdout, _, _) = run(&config_path, &["ask", "teleatendimento", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["kind"], "search");
    assert_eq!(value["hits"].as_array().unwrap().len(), 1);
}

#[test]
fn test_reindex_drops_extra_documents() {
    let (tmp, config_path) = setup_test_env();
    let doc = tmp.path().join("extra.txt");
    fs::write(&doc, "Linha adicional longa o bastante para virar um trecho.\n").unwrap();
    run(&config_path, &["index", doc.to_str().unwrap()]);

    let (stdout, _, success) = run(&config_path, &["reindex"]);
    assert!(success);
    assert!(stdout.contains("Cérebro ético atualizado com sucesso!"));

    let (stdout, _, _) = run(&config_path, &["stats"]);
    assert!(stdout.contains("Documents:   1"), "got: {}", stdout);
    assert!(!stdout.contains("extra"));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("bad.toml");
    fs::write(
        &config_path,
        "[db]\npath = \"x.sqlite3\"\n[server]\nbind = \"127.0.0.1:5000\"\n[matching]\noverlap_threshold = 2.0\n",
    )
    .unwrap();

    let (_, stderr, success) = run(&config_path, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("overlap_threshold"));
}

#[test]
fn test_external_catalog_replaces_builtin() {
    let (tmp, config_path) = setup_test_env();
    let catalog_path = tmp.path().join("answers.toml");
    fs::write(
        &catalog_path,
        r#"
quick_questions = ["Posso gravar a sessão?"]

[[answer]]
topic = "registro"
question = "Posso gravar a sessão?"
html = "<p>Somente com consentimento por escrito.</p>"
"#,
    )
    .unwrap();

    let mut config = fs::read_to_string(&config_path).unwrap();
    config.push_str(&format!("\n[catalog]\npath = \"{}\"\n", catalog_path.display()));
    fs::write(&config_path, config).unwrap();

    let (stdout, stderr, success) = run(&config_path, &["ask", "gravar a sessão", "--json"]);
    assert!(success, "ask failed: {}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["kind"], "contained");
    assert_eq!(value["matched_question"], "Posso gravar a sessão?");
    assert!(value["answer"]
        .as_str()
        .unwrap()
        .contains("consentimento por escrito"));

    // Built-in answers are no longer available
    let (stdout, _, _) = run(&config_path, &["ask", "Posso atender de graça?", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_ne!(value["kind"], "exact");
}
