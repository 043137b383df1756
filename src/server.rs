//! JSON HTTP server.
//!
//! Exposes the question resolution pipeline, the Q&A log and index
//! maintenance to browser front-ends.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/ask` | Resolve a question and log it |
//! | `GET`  | `/history` | Recent Q&A pairs, newest first (`?limit=N`) |
//! | `GET`  | `/stats` | Document, chunk and history counts |
//! | `GET`  | `/documents` | Indexed documents |
//! | `GET`  | `/quick-questions` | Suggested questions |
//! | `GET`  | `/topics` | Catalog questions grouped by topic |
//! | `POST` | `/admin/reset-index` | Re-index the built-in ethics code |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "question must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::catalog::Topic;
use crate::config::Config;
use crate::ingest;
use crate::models::{Document, MatchKind, QaEntry, Stats};
use crate::service::EthosService;

/// Starts the HTTP server on `[server].bind` and runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = EthosService::open(config).await?;
    let app = build_router(service);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("EthosPsi listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(service: EthosService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/ask", post(handle_ask))
        .route("/history", get(handle_history))
        .route("/stats", get(handle_stats))
        .route("/documents", get(handle_documents))
        .route("/quick-questions", get(handle_quick_questions))
        .route("/topics", get(handle_topics))
        .route("/admin/reset-index", post(handle_reset_index))
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(service)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = %err, "request failed");
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal".to_string(),
            message: err.to_string(),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

async fn handle_not_found() -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: "no such endpoint".to_string(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /ask ============

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct AskResponse {
    question: String,
    kind: MatchKind,
    answer: String,
    matched_question: Option<String>,
    hits: Vec<String>,
}

/// Resolves `q` and logs the pair. Blank questions are rejected with 400
/// and are not logged.
async fn handle_ask(
    State(service): State<EthosService>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let question = req.q.trim().to_string();
    if question.is_empty() {
        return Err(bad_request("question must not be empty"));
    }

    let resolution = service.ask(&question).await?;

    Ok(Json(AskResponse {
        question,
        kind: resolution.kind,
        answer: resolution.answer,
        matched_question: resolution.matched_question,
        hits: resolution.hits,
    }))
}

// ============ GET /history ============

#[derive(Deserialize)]
struct HistoryParams {
    limit: Option<i64>,
}

#[derive(Serialize)]
struct HistoryResponse {
    entries: Vec<QaEntry>,
}

async fn handle_history(
    State(service): State<EthosService>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, AppError> {
    if matches!(params.limit, Some(l) if l < 1) {
        return Err(bad_request("limit must be >= 1"));
    }
    let entries = service.history(params.limit).await?;
    Ok(Json(HistoryResponse { entries }))
}

// ============ GET /stats ============

async fn handle_stats(State(service): State<EthosService>) -> Json<Stats> {
    Json(service.stats().await)
}

// ============ GET /documents ============

#[derive(Serialize)]
struct DocumentsResponse {
    documents: Vec<Document>,
}

async fn handle_documents(
    State(service): State<EthosService>,
) -> Result<Json<DocumentsResponse>, AppError> {
    let documents = ingest::list_documents(service.pool()).await?;
    Ok(Json(DocumentsResponse { documents }))
}

// ============ GET /quick-questions ============

#[derive(Serialize)]
struct QuickQuestionsResponse {
    questions: Vec<String>,
}

async fn handle_quick_questions(
    State(service): State<EthosService>,
) -> Json<QuickQuestionsResponse> {
    Json(QuickQuestionsResponse {
        questions: service.catalog().quick_questions().to_vec(),
    })
}

// ============ GET /topics ============

#[derive(Serialize)]
struct TopicsResponse {
    topics: Vec<Topic>,
}

async fn handle_topics(State(service): State<EthosService>) -> Json<TopicsResponse> {
    Json(TopicsResponse {
        topics: service.catalog().topics(),
    })
}

// ============ POST /admin/reset-index ============

#[derive(Serialize)]
struct ResetResponse {
    message: String,
    stats: Stats,
}

async fn handle_reset_index(
    State(service): State<EthosService>,
) -> Result<Json<ResetResponse>, AppError> {
    service.reset_index().await?;
    Ok(Json(ResetResponse {
        message: ingest::RESET_MESSAGE.to_string(),
        stats: service.stats().await,
    }))
}
