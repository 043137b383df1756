//! # EthosPsi CLI (`ethospsi`)
//!
//! Command-line interface for asking questions, maintaining the search
//! index, inspecting the Q&A log and starting the HTTP server.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ethospsi init` | Create the SQLite database and seed the index |
//! | `ethospsi ask "<question>"` | Answer a question and log it |
//! | `ethospsi reindex` | Rebuild the index from the built-in ethics code |
//! | `ethospsi index <file>` | Index an additional text file |
//! | `ethospsi history` | Show recent questions and answers |
//! | `ethospsi stats` | Show row counts and indexed documents |
//! | `ethospsi serve` | Start the HTTP server |

use clap::{Parser, Subcommand};
use ethospsi::config::{self, Config};
use ethospsi::ingest;
use ethospsi::migrate;
use ethospsi::server;
use ethospsi::service::EthosService;
use std::path::PathBuf;

/// EthosPsi — professional-ethics answers for psychologists.
#[derive(Parser)]
#[command(name = "ethospsi", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// When the file does not exist, built-in defaults are used
    /// (database at `./data/ethospsi.sqlite3`, server on `127.0.0.1:5000`).
    #[arg(long, global = true, default_value = "./config/ethospsi.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema and seed the index.
    ///
    /// Idempotent: running it multiple times is safe.
    Init,

    /// Answer a question and record it in the history.
    Ask {
        question: String,

        /// Print the resolution as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Drop every indexed document and re-index the built-in ethics code.
    Reindex,

    /// Index an additional UTF-8 text file, one chunk per long line.
    Index {
        path: PathBuf,

        /// Document title (defaults to the file name without extension).
        #[arg(long)]
        title: Option<String>,
    },

    /// Show recent questions and answers.
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,

        /// Maximum number of entries to show.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Show row counts and indexed documents.
    Stats,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Delete every logged question.
    Clear,
}

fn load(path: &std::path::Path) -> anyhow::Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            let service = EthosService::open(&cfg).await?;
            service.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Ask { question, json } => {
            if question.trim().is_empty() {
                anyhow::bail!("question must not be empty");
            }
            let service = EthosService::open(&cfg).await?;
            let resolution = service.ask(&question).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                println!("match: {}", resolution.kind.as_str());
                if let Some(ref q) = resolution.matched_question {
                    println!("question: {}", q);
                }
                println!();
                println!("{}", resolution.answer);
            }
            service.close().await;
        }
        Commands::Reindex => {
            let service = EthosService::open(&cfg).await?;
            let report = service.reset_index().await?;
            println!("{}", ingest::RESET_MESSAGE);
            println!("  chunks: {}", report.chunks);
            service.close().await;
        }
        Commands::Index { path, title } => {
            let service = EthosService::open(&cfg).await?;
            let report = ingest::index_file(
                service.pool(),
                &path,
                title.as_deref(),
                cfg.index.min_chunk_chars,
            )
            .await?;
            println!("indexed {} (document {})", path.display(), report.doc_id);
            println!("  chunks: {}", report.chunks);
            service.close().await;
        }
        Commands::History { action, limit } => {
            let service = EthosService::open(&cfg).await?;
            match action {
                Some(HistoryAction::Clear) => {
                    let n = service.clear_history().await?;
                    println!("Deleted {} history entries.", n);
                }
                None => {
                    let entries = service.history(limit).await?;
                    if entries.is_empty() {
                        println!("No history.");
                    }
                    for e in &entries {
                        println!("[{}] {}", e.created_at, e.question);
                    }
                }
            }
            service.close().await;
        }
        Commands::Stats => {
            let service = EthosService::open(&cfg).await?;
            let stats = service.stats().await;
            println!("EthosPsi — Database Stats");
            println!("=========================");
            println!();
            println!("  Database:    {}", cfg.db.path.display());
            println!("  Documents:   {}", stats.documents);
            println!("  Chunks:      {}", stats.chunks);
            println!("  History:     {}", stats.history);
            println!("  Answers:     {}", service.catalog().len());

            let docs = ingest::list_documents(service.pool()).await?;
            if !docs.is_empty() {
                println!();
                println!("  {:<6} {:<40} {:>8}   {}", "ID", "TITLE", "CHUNKS", "CREATED");
                println!("  {}", "-".repeat(70));
                for d in &docs {
                    println!(
                        "  {:<6} {:<40} {:>8}   {}",
                        d.id, d.title, d.chunk_count, d.created_at
                    );
                }
            }
            println!();
            service.close().await;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
