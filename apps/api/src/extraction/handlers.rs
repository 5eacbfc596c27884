//! Axum route handlers for the Extraction API.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::extraction::job_enricher::JobListing;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractResumeRequest {
    pub resume_text: String,
}

/// POST /api/v1/extract/resume
///
/// Returns the structured profile for a resume. Adapter failures come back as a
/// degraded profile (`raw_text` + `parsing_error`), never as an error status.
pub async fn handle_extract_resume(
    State(state): State<AppState>,
    Json(request): Json<ExtractResumeRequest>,
) -> Result<Json<Map<String, Value>>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_text cannot be empty".to_string(),
        ));
    }

    Ok(Json(state.resume_extractor.extract(&request.resume_text).await))
}

/// POST /api/v1/extract/job
///
/// Returns structured requirements for a job listing.
pub async fn handle_extract_job(
    State(state): State<AppState>,
    Json(listing): Json<JobListing>,
) -> Result<Json<Map<String, Value>>, AppError> {
    if listing.description.trim().is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }

    Ok(Json(state.job_enricher.enrich(&listing).await))
}
