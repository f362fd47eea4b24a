//! HTTP request handlers for the QA Server API
//!
//! Provides handlers for:
//! - Health checks
//! - Question answering (plain answers and detailed matches)
//! - Corpus reload

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use qa_core::search::MatchType;
use qa_core::Match;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AskParams {
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailedAskRequest {
    pub question: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub id: usize,
    pub question: String,
    pub answer: String,
    pub score: f32,
    pub confidence: MatchType,
}

impl From<Match> for MatchResponse {
    fn from(m: Match) -> Self {
        Self {
            id: m.record.id,
            question: m.record.question,
            answer: m.record.answer,
            score: m.score,
            confidence: m.confidence,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DetailedAskResponse {
    pub question: String,
    pub matches: Vec<MatchResponse>,
    pub total_matches: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub records: usize,
    pub match_count: usize,
    pub scorer: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub records: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        records: state.bot.store().len(),
        match_count: state.bot.match_count(),
        scorer: state.bot.scorer_name().to_string(),
    })
}

/// Answer a question passed as `?question=...`
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AskParams>,
) -> Result<Json<AskResponse>, ApiError> {
    let started = Instant::now();

    let question = params
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or(ApiError::MissingQuestion)?;

    let answers = state.bot.answer_question(&question)?;
    if answers.is_empty() {
        return Err(ApiError::NoAnswer);
    }

    info!(
        "Answered '{}' with {} answers in {:?}",
        question,
        answers.len(),
        started.elapsed()
    );

    Ok(Json(AskResponse { answers }))
}

/// Ranked matches with scores and confidence bands
///
/// Body rejections are reported through [`ApiError`] like every other failure.
pub async fn ask_detailed(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DetailedAskRequest>, JsonRejection>,
) -> Result<Json<DetailedAskResponse>, ApiError> {
    let Json(request) = payload?;

    if request.question.trim().is_empty() {
        return Err(ApiError::MissingQuestion);
    }

    let limit = request.limit.unwrap_or(state.bot.match_count());
    let matches = state.bot.ask_with_limit(&request.question, limit)?;
    if matches.is_empty() {
        return Err(ApiError::NoAnswer);
    }

    info!("Detailed ask: question='{}', limit={}", request.question, limit);

    let matches: Vec<MatchResponse> = matches.into_iter().map(MatchResponse::from).collect();

    Ok(Json(DetailedAskResponse {
        question: request.question,
        total_matches: matches.len(),
        matches,
    }))
}

/// Re-read the corpus file and publish it
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>, ApiError> {
    let store = Arc::clone(state.bot.store());

    let records = tokio::task::spawn_blocking(move || store.reload())
        .await
        .map_err(|e| ApiError::Internal(format!("Reload task failed: {}", e)))??;

    info!("Corpus reloaded: {} records", records);

    Ok(Json(ReloadResponse {
        success: true,
        records,
    }))
}
