//! Match Engine — orchestrates match creation, mutation and ranked retrieval.
//!
//! Flow for `create_match`:
//!   validate score → resolve candidate + job → pair check →
//!   score/details via ScoreCalculator (only what the caller omitted) → persist.
//!
//! The engine keeps no mutable state of its own; collaborators are handed in
//! through `MatchEngine::new`.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::directory::{CandidateRecord, CandidateStore, JobRecord, JobStore};
use crate::errors::AppError;
use crate::matching::models::{
    validate_score, CreateMatchRequest, Match, MatchUpdate, NewMatch, DEFAULT_STATUS,
};
use crate::matching::store::MatchStore;
use crate::scoring::ScoreCalculator;

#[derive(Clone)]
pub struct MatchEngine {
    matches: Arc<dyn MatchStore>,
    candidates: Arc<dyn CandidateStore>,
    jobs: Arc<dyn JobStore>,
    scorer: ScoreCalculator,
}

impl MatchEngine {
    pub fn new(
        matches: Arc<dyn MatchStore>,
        candidates: Arc<dyn CandidateStore>,
        jobs: Arc<dyn JobStore>,
        scorer: ScoreCalculator,
    ) -> Self {
        Self {
            matches,
            candidates,
            jobs,
            scorer,
        }
    }

    async fn require_candidate(&self, candidate_id: i64) -> Result<CandidateRecord, AppError> {
        self.candidates
            .get_by_id(candidate_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))
    }

    async fn require_job(&self, job_id: i64) -> Result<JobRecord, AppError> {
        self.jobs
            .get_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
    }

    /// Creates the match for a (candidate, job) pair.
    ///
    /// Errors: `Validation` for a score outside [0, 1], `NotFound` for a missing
    /// candidate or job, `Conflict` when the pair already has a match. Adapter
    /// trouble never fails creation; it yields the neutral 0.5 assessment.
    pub async fn create_match(&self, request: CreateMatchRequest) -> Result<Match, AppError> {
        if let Some(score) = request.score {
            validate_score(score)?;
        }

        let candidate = self.require_candidate(request.candidate_id).await?;
        let job = self.require_job(request.job_id).await?;

        // Fail before spending an adapter call. The insert below is still the
        // authority when two requests race past this check.
        if self
            .matches
            .find_by_pair(candidate.id, job.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Match already exists between candidate {} and job {}",
                candidate.id, job.id
            )));
        }

        let (score, details) = match (request.score, request.details) {
            (Some(score), Some(details)) => (score, details),
            (score, details) => {
                let assessment = self
                    .scorer
                    .assess(&candidate.profile(), &job.requirements())
                    .await;
                if assessment.is_fallback {
                    warn!(
                        "Scoring unavailable for candidate {} / job {}, storing neutral assessment",
                        candidate.id, job.id
                    );
                }
                (
                    score.unwrap_or(assessment.score),
                    details.unwrap_or(assessment.details),
                )
            }
        };

        self.matches
            .create(NewMatch {
                candidate_id: candidate.id,
                job_id: job.id,
                score,
                details,
                feedback: request.feedback,
                status: request
                    .status
                    .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            })
            .await
    }

    /// Applies the supplied mutable fields. An empty update is a no-op read.
    pub async fn update_match(&self, id: i64, update: MatchUpdate) -> Result<Match, AppError> {
        if let Some(score) = update.score {
            validate_score(score)?;
        }
        if update.is_empty() {
            debug!("Empty update for match {id}, returning current record");
            return self.get_match(id).await;
        }

        let updated = self.matches.update(id, &update).await?;
        info!("Updated match {id} (status: {})", updated.status);
        Ok(updated)
    }

    pub async fn delete_match(&self, id: i64) -> Result<(), AppError> {
        self.matches.delete(id).await
    }

    pub async fn get_match(&self, id: i64) -> Result<Match, AppError> {
        self.matches
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))
    }

    pub async fn list_matches(&self) -> Result<Vec<Match>, AppError> {
        self.matches.list_all().await
    }

    pub async fn get_matches_for_candidate(
        &self,
        candidate_id: i64,
    ) -> Result<Vec<Match>, AppError> {
        self.require_candidate(candidate_id).await?;
        self.matches.find_by_candidate(candidate_id).await
    }

    pub async fn get_matches_for_job(&self, job_id: i64) -> Result<Vec<Match>, AppError> {
        self.require_job(job_id).await?;
        self.matches.find_by_job(job_id).await
    }

    /// `Ok(None)` when both records exist but were never matched.
    pub async fn get_match_by_pair(
        &self,
        candidate_id: i64,
        job_id: i64,
    ) -> Result<Option<Match>, AppError> {
        self.require_candidate(candidate_id).await?;
        self.require_job(job_id).await?;
        self.matches.find_by_pair(candidate_id, job_id).await
    }

    /// Every match scoring at least `min_score`, best first.
    pub async fn get_high_quality_matches(&self, min_score: f64) -> Result<Vec<Match>, AppError> {
        if min_score.is_nan() {
            return Err(AppError::Validation("min_score must be a number".to_string()));
        }
        self.matches.find_by_min_score(min_score).await
    }

    pub async fn get_top_matches_for_candidate(
        &self,
        candidate_id: i64,
        limit: u32,
    ) -> Result<Vec<Match>, AppError> {
        self.require_candidate(candidate_id).await?;
        self.matches
            .list_top_for_candidate(candidate_id, limit)
            .await
    }

    pub async fn get_top_matches_for_job(
        &self,
        job_id: i64,
        limit: u32,
    ) -> Result<Vec<Match>, AppError> {
        self.require_job(job_id).await?;
        self.matches.list_top_for_job(job_id, limit).await
    }

    /// Scores a pair without persisting anything. Falls back to 0.5.
    pub async fn calculate_match_score(
        &self,
        candidate_id: i64,
        job_id: i64,
    ) -> Result<f64, AppError> {
        let candidate = self.require_candidate(candidate_id).await?;
        let job = self.require_job(job_id).await?;
        Ok(self
            .scorer
            .compute_score(&candidate.profile(), &job.requirements())
            .await)
    }

    /// Explains a pair without persisting anything. Falls back to the neutral mapping.
    pub async fn generate_match_details(
        &self,
        candidate_id: i64,
        job_id: i64,
    ) -> Result<Map<String, Value>, AppError> {
        let candidate = self.require_candidate(candidate_id).await?;
        let job = self.require_job(job_id).await?;
        Ok(self
            .scorer
            .compute_details(&candidate.profile(), &job.requirements())
            .await)
    }
}
