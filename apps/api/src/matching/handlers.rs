//! Axum route handlers for the Match API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::matching::models::{CreateMatchRequest, Match, MatchUpdate};
use crate::state::AppState;

const DEFAULT_TOP_LIMIT: u32 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Filters for `GET /api/v1/matches`. At most one kind of filter applies:
/// candidate and/or job, or min_score, or nothing (all matches).
#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    pub candidate_id: Option<i64>,
    pub job_id: Option<i64>,
    pub min_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub candidate_id: i64,
    pub job_id: i64,
    pub score: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/matches
pub async fn handle_create_match(
    State(state): State<AppState>,
    Json(request): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<Match>), AppError> {
    let created = state.engine.create_match(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/matches?candidate_id=&job_id=&min_score=
pub async fn handle_list_matches(
    State(state): State<AppState>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<Vec<Match>>, AppError> {
    let engine = &state.engine;
    let matches = match (query.candidate_id, query.job_id, query.min_score) {
        (Some(candidate_id), Some(job_id), None) => {
            let found = engine
                .get_match_by_pair(candidate_id, job_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "No match between candidate {candidate_id} and job {job_id}"
                    ))
                })?;
            vec![found]
        }
        (Some(candidate_id), None, None) => engine.get_matches_for_candidate(candidate_id).await?,
        (None, Some(job_id), None) => engine.get_matches_for_job(job_id).await?,
        (None, None, Some(min_score)) => engine.get_high_quality_matches(min_score).await?,
        (None, None, None) => engine.list_matches().await?,
        _ => {
            return Err(AppError::Validation(
                "min_score cannot be combined with candidate_id or job_id".to_string(),
            ))
        }
    };
    Ok(Json(matches))
}

/// GET /api/v1/matches/:id
pub async fn handle_get_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Match>, AppError> {
    Ok(Json(state.engine.get_match(id).await?))
}

/// PATCH /api/v1/matches/:id
///
/// Only score, details, feedback and status can change.
pub async fn handle_update_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<MatchUpdate>,
) -> Result<Json<Match>, AppError> {
    Ok(Json(state.engine.update_match(id, update).await?))
}

/// DELETE /api/v1/matches/:id
pub async fn handle_delete_match(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.engine.delete_match(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/candidates/:id/matches/top?limit=
pub async fn handle_top_for_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<i64>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<Match>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    Ok(Json(
        state
            .engine
            .get_top_matches_for_candidate(candidate_id, limit)
            .await?,
    ))
}

/// GET /api/v1/jobs/:id/matches/top?limit=
pub async fn handle_top_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<Match>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    Ok(Json(
        state.engine.get_top_matches_for_job(job_id, limit).await?,
    ))
}

/// POST /api/v1/score/:candidate_id/:job_id
///
/// Scores without persisting. Adapter failure yields 0.5, not an error.
pub async fn handle_calculate_score(
    State(state): State<AppState>,
    Path((candidate_id, job_id)): Path<(i64, i64)>,
) -> Result<Json<ScoreResponse>, AppError> {
    let score = state
        .engine
        .calculate_match_score(candidate_id, job_id)
        .await?;
    Ok(Json(ScoreResponse {
        candidate_id,
        job_id,
        score,
    }))
}

/// POST /api/v1/details/:candidate_id/:job_id
pub async fn handle_generate_details(
    State(state): State<AppState>,
    Path((candidate_id, job_id)): Path<(i64, i64)>,
) -> Result<Json<Map<String, Value>>, AppError> {
    Ok(Json(
        state
            .engine
            .generate_match_details(candidate_id, job_id)
            .await?,
    ))
}
