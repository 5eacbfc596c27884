use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::errors::AppError;

/// Status given to a match when the caller does not supply one.
pub const DEFAULT_STATUS: &str = "NEW";

/// A scored pairing of one candidate with one job.
///
/// `candidate_id` and `job_id` never change after creation. `status` is an
/// advisory label: any string is accepted and no transitions are enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub candidate_id: i64,
    pub job_id: i64,
    /// Always within [0, 1].
    pub score: f64,
    /// matching_skills, missing_skills, experience_match, education_match,
    /// overall_assessment, match_score
    pub details: Map<String, Value>,
    pub feedback: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MatchRow {
    pub id: i64,
    pub candidate_id: i64,
    pub job_id: i64,
    pub score: f64,
    pub details: Value,
    pub feedback: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        let details = match row.details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Match {
            id: row.id,
            candidate_id: row.candidate_id,
            job_id: row.job_id,
            score: row.score,
            details,
            feedback: row.feedback,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Request body for match creation. Omitted score/details are computed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateMatchRequest {
    pub candidate_id: i64,
    pub job_id: i64,
    pub score: Option<f64>,
    pub details: Option<Map<String, Value>>,
    pub feedback: Option<String>,
    pub status: Option<String>,
}

/// A fully resolved match ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub candidate_id: i64,
    pub job_id: i64,
    pub score: f64,
    pub details: Map<String, Value>,
    pub feedback: Option<String>,
    pub status: String,
}

/// Partial update of the mutable fields. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MatchUpdate {
    pub score: Option<f64>,
    pub details: Option<Map<String, Value>>,
    pub feedback: Option<String>,
    pub status: Option<String>,
}

impl MatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.score.is_none()
            && self.details.is_none()
            && self.feedback.is_none()
            && self.status.is_none()
    }

    /// Copies every supplied field onto `target` and bumps `updated_at`.
    /// Identity fields and `created_at` are never touched.
    pub fn merge_into(&self, target: &mut Match, now: DateTime<Utc>) {
        if let Some(score) = self.score {
            target.score = score;
        }
        if let Some(details) = &self.details {
            target.details = details.clone();
        }
        if let Some(feedback) = &self.feedback {
            target.feedback = Some(feedback.clone());
        }
        if let Some(status) = &self.status {
            target.status = status.clone();
        }
        target.updated_at = now;
    }
}

/// Rejects scores outside [0, 1] (NaN included).
pub fn validate_score(score: f64) -> Result<(), AppError> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "score must be between 0.0 and 1.0, got {score}"
        )))
    }
}
