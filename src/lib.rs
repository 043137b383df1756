//! # EthosPsi
//!
//! A professional-ethics Q&A service for psychologists, in Brazilian
//! Portuguese.
//!
//! A question is answered from a curated catalog of canned HTML answers
//! when possible, otherwise by keyword search over an indexed summary of
//! the code of ethics, otherwise with a fixed fallback. Every answered
//! question is logged to SQLite.
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────┐
//!   question ──▶ │   matcher    │──▶ exact ─▶ lexical ─▶ search ─▶ fallback
//!                └──────┬───────┘       (catalog)       (chunks)
//!                       │
//!                       ▼
//!                ┌──────────────┐
//!                │    SQLite    │  documents · chunks · qa_history
//!                └──────┬───────┘
//!              ┌────────┴────────┐
//!              ▼                 ▼
//!         ┌─────────┐       ┌─────────┐
//!         │   CLI   │       │  HTTP   │
//!         └─────────┘       └─────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`catalog`] | Curated question → answer table |
//! | [`matcher`] | Question resolution pipeline |
//! | [`search`] | Keyword search over chunks |
//! | [`ingest`] | Indexing source texts |
//! | [`history`] | Q&A log |
//! | [`stats`] | Row counts |
//! | [`service`] | Shared application service |
//! | [`server`] | JSON HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod catalog;
pub mod config;
pub mod db;
pub mod history;
pub mod ingest;
pub mod matcher;
pub mod migrate;
pub mod models;
pub mod search;
pub mod server;
pub mod service;
pub mod stats;
