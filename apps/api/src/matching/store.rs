//! Match persistence.
//!
//! Pair uniqueness lives in the database (`UNIQUE (candidate_id, job_id)`), and
//! `create` relies on it: the insert either wins or reports a Conflict, so two
//! racing requests for the same pair can never both succeed.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::matching::models::{Match, MatchRow, MatchUpdate, NewMatch};

#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Fails with `Conflict` if the pair already has a match.
    async fn create(&self, new_match: NewMatch) -> Result<Match, AppError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Match>, AppError>;
    /// Fails with `NotFound` if no match has this id.
    async fn update(&self, id: i64, update: &MatchUpdate) -> Result<Match, AppError>;
    /// Fails with `NotFound` if no match has this id.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    /// All matches, ascending id.
    async fn list_all(&self) -> Result<Vec<Match>, AppError>;
    async fn find_by_candidate(&self, candidate_id: i64) -> Result<Vec<Match>, AppError>;
    async fn find_by_job(&self, job_id: i64) -> Result<Vec<Match>, AppError>;
    async fn find_by_pair(&self, candidate_id: i64, job_id: i64)
        -> Result<Option<Match>, AppError>;
    /// Matches with `score >= threshold`, ranked.
    async fn find_by_min_score(&self, threshold: f64) -> Result<Vec<Match>, AppError>;
    /// The first `limit` of the candidate's matches, ranked.
    async fn list_top_for_candidate(
        &self,
        candidate_id: i64,
        limit: u32,
    ) -> Result<Vec<Match>, AppError>;
    /// The first `limit` of the job's matches, ranked.
    async fn list_top_for_job(&self, job_id: i64, limit: u32) -> Result<Vec<Match>, AppError>;
}

macro_rules! select_matches {
    ($tail:literal) => {
        concat!(
            "SELECT id, candidate_id, job_id, score, details, feedback, status, created_at, updated_at FROM matches ",
            $tail
        )
    };
}

const RETURNING_MATCH: &str =
    "RETURNING id, candidate_id, job_id, score, details, feedback, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgMatchStore {
    pool: PgPool,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, sql: &str, id: i64) -> Result<Vec<Match>, AppError> {
        let rows = sqlx::query_as::<_, MatchRow>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Match::from).collect())
    }

    async fn fetch_top(&self, sql: &str, id: i64, limit: u32) -> Result<Vec<Match>, AppError> {
        let rows = sqlx::query_as::<_, MatchRow>(sql)
            .bind(id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Match::from).collect())
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn create(&self, new_match: NewMatch) -> Result<Match, AppError> {
        let NewMatch {
            candidate_id,
            job_id,
            score,
            details,
            feedback,
            status,
        } = new_match;

        // ON CONFLICT DO NOTHING returns no row when the pair already exists.
        let sql = format!(
            "INSERT INTO matches (candidate_id, job_id, score, details, feedback, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (candidate_id, job_id) DO NOTHING {RETURNING_MATCH}"
        );
        let row = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(candidate_id)
            .bind(job_id)
            .bind(score)
            .bind(Value::Object(details))
            .bind(feedback)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| {
            AppError::Conflict(format!(
                "Match already exists between candidate {candidate_id} and job {job_id}"
            ))
        })?;

        info!(
            "Created match {} for candidate {candidate_id} / job {job_id}",
            row.id
        );
        Ok(row.into())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Match>, AppError> {
        let row = sqlx::query_as::<_, MatchRow>(select_matches!("WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Match::from))
    }

    async fn update(&self, id: i64, update: &MatchUpdate) -> Result<Match, AppError> {
        // One COALESCE per mutable column: a NULL parameter keeps the stored value.
        let sql = format!(
            "UPDATE matches SET \
                score = COALESCE($2, score), \
                details = COALESCE($3, details), \
                feedback = COALESCE($4, feedback), \
                status = COALESCE($5, status), \
                updated_at = now() \
             WHERE id = $1 {RETURNING_MATCH}"
        );
        let row = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(id)
            .bind(update.score)
            .bind(update.details.clone().map(Value::Object))
            .bind(update.feedback.as_deref())
            .bind(update.status.as_deref())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Match::from)
            .ok_or_else(|| AppError::NotFound(format!("Match {id} not found")))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Match {id} not found")));
        }
        info!("Deleted match {id}");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Match>, AppError> {
        let rows = sqlx::query_as::<_, MatchRow>(select_matches!("ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Match::from).collect())
    }

    async fn find_by_candidate(&self, candidate_id: i64) -> Result<Vec<Match>, AppError> {
        self.fetch_all(
            select_matches!("WHERE candidate_id = $1 ORDER BY id"),
            candidate_id,
        )
        .await
    }

    async fn find_by_job(&self, job_id: i64) -> Result<Vec<Match>, AppError> {
        self.fetch_all(select_matches!("WHERE job_id = $1 ORDER BY id"), job_id)
            .await
    }

    async fn find_by_pair(
        &self,
        candidate_id: i64,
        job_id: i64,
    ) -> Result<Option<Match>, AppError> {
        let row = sqlx::query_as::<_, MatchRow>(select_matches!(
            "WHERE candidate_id = $1 AND job_id = $2"
        ))
        .bind(candidate_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Match::from))
    }

    async fn find_by_min_score(&self, threshold: f64) -> Result<Vec<Match>, AppError> {
        let rows = sqlx::query_as::<_, MatchRow>(select_matches!(
            "WHERE score >= $1 ORDER BY score DESC, id ASC"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Match::from).collect())
    }

    async fn list_top_for_candidate(
        &self,
        candidate_id: i64,
        limit: u32,
    ) -> Result<Vec<Match>, AppError> {
        self.fetch_top(
            select_matches!("WHERE candidate_id = $1 ORDER BY score DESC, id ASC LIMIT $2"),
            candidate_id,
            limit,
        )
        .await
    }

    async fn list_top_for_job(&self, job_id: i64, limit: u32) -> Result<Vec<Match>, AppError> {
        self.fetch_top(
            select_matches!("WHERE job_id = $1 ORDER BY score DESC, id ASC LIMIT $2"),
            job_id,
            limit,
        )
        .await
    }
}
